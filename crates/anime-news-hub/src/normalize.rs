//! Mapping of upstream records into the unified item model.
//!
//! All functions here are pure: the caller supplies the clock so results are
//! reproducible.

use crate::api::types::{FuzzyDate, MangaRecord, Media, MediaType};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use shared::{ContentCategory, ContentItem, ContentStatus};

/// Cover used when an upstream record has no image
pub const PLACEHOLDER_COVER: &str =
    "https://via.placeholder.com/200x300/1a1a25/71717a?text=No+Cover";

pub const NO_DESCRIPTION: &str = "No description available.";
pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_DATE: &str = "Unknown";

const SUMMARY_LIMIT: usize = 150;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Strip markup and cut to the card summary length
pub fn format_description(desc: Option<&str>) -> String {
    let desc = match desc {
        Some(d) if !d.is_empty() => d,
        _ => return NO_DESCRIPTION.to_string(),
    };

    let stripped = HTML_TAG.replace_all(desc, "");
    let mut summary: String = stripped.chars().take(SUMMARY_LIMIT).collect();
    if stripped.chars().count() >= SUMMARY_LIMIT {
        summary.push_str("...");
    }
    summary
}

/// AniList status to unified status
pub fn map_anilist_status(status: Option<&str>) -> ContentStatus {
    match status {
        Some("RELEASING") => ContentStatus::Ongoing,
        Some("NOT_YET_RELEASED") => ContentStatus::Upcoming,
        Some("FINISHED") | Some("CANCELLED") => ContentStatus::Finished,
        _ => ContentStatus::Ongoing,
    }
}

/// MangaDex status to unified status
pub fn map_mangadex_status(status: Option<&str>) -> ContentStatus {
    match status {
        Some("completed") => ContentStatus::Finished,
        _ => ContentStatus::Ongoing,
    }
}

/// Category heuristic for AniList media
///
/// Anime is always anime. Printed media is split by format first (novels),
/// then by country of origin.
pub fn classify_anilist(
    media_type: MediaType,
    format: Option<&str>,
    country: Option<&str>,
) -> ContentCategory {
    if media_type == MediaType::Anime {
        return ContentCategory::Anime;
    }
    if format == Some("NOVEL") {
        return ContentCategory::LightNovel;
    }
    match country {
        Some("KR") => ContentCategory::Manhwa,
        Some("CN") | Some("TW") | Some("HK") => ContentCategory::Manhua,
        _ => ContentCategory::Manga,
    }
}

/// Category heuristic for MangaDex, based on the original language
pub fn classify_language(original_language: Option<&str>) -> ContentCategory {
    match original_language {
        Some("ko") => ContentCategory::Manhwa,
        Some("zh") | Some("zh-hk") => ContentCategory::Manhua,
        _ => ContentCategory::Manga,
    }
}

/// `YYYY-M-D` with unpadded parts and `??` for an unknown month or day
pub fn format_release_date(date: Option<&FuzzyDate>) -> String {
    let Some(date) = date else {
        return UNKNOWN_DATE.to_string();
    };
    let Some(year) = date.year else {
        return UNKNOWN_DATE.to_string();
    };

    let part = |value: Option<u32>| {
        value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "??".to_string())
    };
    format!("{}-{}-{}", year, part(date.month), part(date.day))
}

fn first_present<'a>(candidates: &[Option<&'a String>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .flatten()
        .map(String::as_str)
        .find(|s| !s.is_empty())
}

/// Map one AniList media record
///
/// `fallback_type` applies when the record omits its type, which happens for
/// queries already filtered by type.
pub fn from_anilist(media: &Media, fallback_type: MediaType, now: DateTime<Utc>) -> ContentItem {
    let media_type = media.media_type.unwrap_or(fallback_type);
    let title = &media.title;

    let display_title = first_present(&[
        title.english.as_ref(),
        title.romaji.as_ref(),
        title.native.as_ref(),
    ])
    .unwrap_or(UNKNOWN_TITLE)
    .to_string();

    let alternative_titles = [title.romaji.as_ref(), title.native.as_ref()]
        .into_iter()
        .flatten()
        .filter(|t| !t.is_empty())
        .cloned()
        .collect();

    let image_url = first_present(&[
        media.cover_image.large.as_ref(),
        media.cover_image.medium.as_ref(),
    ])
    .unwrap_or(PLACEHOLDER_COVER)
    .to_string();

    let updated_at = media
        .updated_at
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or(now);

    ContentItem {
        id: format!("{}-{}", media_type.as_str().to_lowercase(), media.id),
        title: display_title,
        alternative_titles,
        summary: format_description(media.description.as_deref()),
        category: classify_anilist(
            media_type,
            media.format.as_deref(),
            media.country_of_origin.as_deref(),
        ),
        image_url,
        source_url: media.site_url.clone().unwrap_or_default(),
        source_name: "AniList".to_string(),
        release_date: format_release_date(media.start_date.as_ref()),
        updated_at,
        status: map_anilist_status(media.status.as_deref()),
        popularity: media.popularity,
        score: media.average_score,
        is_trending: media.trending.unwrap_or(0) > 50,
        episodes: media.episodes,
        chapters: media.chapters,
    }
}

/// URL roots used to build MangaDex links
#[derive(Debug, Clone)]
pub struct MangaDexUrls {
    pub uploads_url: String,
    pub site_url: String,
}

/// English entry, else the first non-empty localized string
fn localized(map: &Map<String, Value>) -> Option<&str> {
    map.get("en")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            map.values()
                .filter_map(Value::as_str)
                .find(|s| !s.is_empty())
        })
}

/// Map one MangaDex manga record
pub fn from_mangadex(record: &MangaRecord, urls: &MangaDexUrls, now: DateTime<Utc>) -> ContentItem {
    let attributes = &record.attributes;

    let cover_url = record
        .relationships
        .iter()
        .find(|r| r.kind == "cover_art")
        .and_then(|r| r.attributes.as_ref())
        .and_then(|a| a.file_name.as_deref())
        .map(|file_name| {
            format!(
                "{}/covers/{}/{}",
                urls.uploads_url.trim_end_matches('/'),
                record.id,
                file_name
            )
        })
        .unwrap_or_else(|| PLACEHOLDER_COVER.to_string());

    let title = localized(&attributes.title).unwrap_or(UNKNOWN_TITLE).to_string();

    let description = match &attributes.description {
        Some(Value::Object(map)) => localized(map),
        _ => None,
    };

    let updated_at = attributes
        .updated_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now);

    ContentItem {
        id: format!("mangadex-{}", record.id),
        title,
        alternative_titles: Vec::new(),
        summary: format_description(description),
        category: classify_language(attributes.original_language.as_deref()),
        image_url: cover_url,
        source_url: format!("{}/title/{}", urls.site_url.trim_end_matches('/'), record.id),
        source_name: "MangaDex".to_string(),
        release_date: attributes
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
        updated_at,
        status: map_mangadex_status(attributes.status.as_deref()),
        popularity: attributes.follow_count,
        score: None,
        is_trending: true,
        episodes: None,
        chapters: attributes
            .last_chapter
            .as_deref()
            .and_then(|c| c.trim().parse::<u32>().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn urls() -> MangaDexUrls {
        MangaDexUrls {
            uploads_url: "https://uploads.mangadex.org".to_string(),
            site_url: "https://mangadex.org".to_string(),
        }
    }

    fn media(json: &str) -> Media {
        serde_json::from_str(json).unwrap()
    }

    fn manga(json: &str) -> MangaRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_description_strips_tags() {
        let summary = format_description(Some("A <i>hero</i> rises.<br><br>(Source: AniList)"));
        assert_eq!(summary, "A hero rises.(Source: AniList)");
    }

    #[test]
    fn test_description_missing_or_empty() {
        assert_eq!(format_description(None), NO_DESCRIPTION);
        assert_eq!(format_description(Some("")), NO_DESCRIPTION);
    }

    #[test]
    fn test_description_truncates_at_150_chars() {
        let long = "あ".repeat(200);
        let summary = format_description(Some(&long));
        assert_eq!(summary.chars().count(), 153);
        assert!(summary.ends_with("..."));

        let exact = "b".repeat(150);
        assert_eq!(format_description(Some(&exact)), format!("{}...", exact));

        let short = "c".repeat(149);
        assert_eq!(format_description(Some(&short)), short);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_anilist_status(Some("RELEASING")), ContentStatus::Ongoing);
        assert_eq!(map_anilist_status(Some("NOT_YET_RELEASED")), ContentStatus::Upcoming);
        assert_eq!(map_anilist_status(Some("CANCELLED")), ContentStatus::Finished);
        assert_eq!(map_anilist_status(Some("HIATUS")), ContentStatus::Ongoing);
        assert_eq!(map_anilist_status(None), ContentStatus::Ongoing);

        assert_eq!(map_mangadex_status(Some("completed")), ContentStatus::Finished);
        assert_eq!(map_mangadex_status(Some("hiatus")), ContentStatus::Ongoing);
    }

    #[test]
    fn test_cancelled_mangadex_title_stays_ongoing() {
        assert_eq!(map_mangadex_status(Some("cancelled")), ContentStatus::Ongoing);
        assert_eq!(map_mangadex_status(None), ContentStatus::Ongoing);
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify_anilist(MediaType::Anime, Some("NOVEL"), Some("KR")), ContentCategory::Anime);
        assert_eq!(classify_anilist(MediaType::Manga, Some("NOVEL"), Some("JP")), ContentCategory::LightNovel);
        assert_eq!(classify_anilist(MediaType::Manga, Some("MANGA"), Some("KR")), ContentCategory::Manhwa);
        assert_eq!(classify_anilist(MediaType::Manga, Some("MANGA"), Some("TW")), ContentCategory::Manhua);
        assert_eq!(classify_anilist(MediaType::Manga, None, None), ContentCategory::Manga);

        assert_eq!(classify_language(Some("ko")), ContentCategory::Manhwa);
        assert_eq!(classify_language(Some("zh-hk")), ContentCategory::Manhua);
        assert_eq!(classify_language(Some("ja")), ContentCategory::Manga);
        assert_eq!(classify_language(None), ContentCategory::Manga);
    }

    #[test]
    fn test_release_date_formatting() {
        let full = FuzzyDate { year: Some(2013), month: Some(4), day: Some(7) };
        assert_eq!(format_release_date(Some(&full)), "2013-4-7");

        let late = FuzzyDate { year: Some(2024), month: Some(11), day: Some(5) };
        assert_eq!(format_release_date(Some(&late)), "2024-11-5");

        let no_day = FuzzyDate { year: Some(2024), month: Some(4), day: None };
        assert_eq!(format_release_date(Some(&no_day)), "2024-4-??");

        let partial = FuzzyDate { year: Some(2027), month: None, day: None };
        assert_eq!(format_release_date(Some(&partial)), "2027-??-??");

        let empty = FuzzyDate::default();
        assert_eq!(format_release_date(Some(&empty)), UNKNOWN_DATE);
        assert_eq!(format_release_date(None), UNKNOWN_DATE);
    }

    #[test]
    fn test_from_anilist_full_record() {
        let m = media(
            r#"{
                "id": 16498,
                "type": "ANIME",
                "title": {"romaji": "Shingeki no Kyojin", "english": "Attack on Titan", "native": "進撃の巨人"},
                "description": "Humans fight <b>titans</b>.",
                "coverImage": {"large": null, "medium": "https://img/medium.jpg"},
                "siteUrl": "https://anilist.co/anime/16498",
                "status": "FINISHED",
                "episodes": 25,
                "popularity": 900000,
                "averageScore": 85,
                "trending": 51,
                "updatedAt": 1700000000,
                "startDate": {"year": 2013, "month": 4, "day": 7}
            }"#,
        );

        let item = from_anilist(&m, MediaType::Manga, now());
        assert_eq!(item.id, "anime-16498");
        assert_eq!(item.title, "Attack on Titan");
        assert_eq!(item.alternative_titles, vec!["Shingeki no Kyojin", "進撃の巨人"]);
        assert_eq!(item.summary, "Humans fight titans.");
        assert_eq!(item.category, ContentCategory::Anime);
        assert_eq!(item.image_url, "https://img/medium.jpg");
        assert_eq!(item.source_name, "AniList");
        assert_eq!(item.release_date, "2013-4-7");
        assert_eq!(item.updated_at.timestamp(), 1_700_000_000);
        assert_eq!(item.status, ContentStatus::Finished);
        assert_eq!(item.score, Some(85));
        assert!(item.is_trending);
        assert_eq!(item.episodes, Some(25));
    }

    #[test]
    fn test_from_anilist_sparse_record() {
        let m = media(
            r#"{
                "id": 30002,
                "title": {"romaji": "", "english": null, "native": "ベルセルク"},
                "trending": 50
            }"#,
        );

        let item = from_anilist(&m, MediaType::Manga, now());
        assert_eq!(item.id, "manga-30002");
        assert_eq!(item.title, "ベルセルク");
        assert_eq!(item.alternative_titles, vec!["ベルセルク"]);
        assert_eq!(item.summary, NO_DESCRIPTION);
        assert_eq!(item.image_url, PLACEHOLDER_COVER);
        assert_eq!(item.release_date, UNKNOWN_DATE);
        assert_eq!(item.updated_at, now());
        assert!(!item.is_trending);
    }

    #[test]
    fn test_from_mangadex_record() {
        let record = manga(
            r#"{
                "id": "32d76d19-8a05-4db0-9fc2-e0b0648fe9d0",
                "attributes": {
                    "title": {"en": "Solo Leveling"},
                    "description": {"ko": "설명", "en": "E-rank hunter <b>Jinwoo</b>."},
                    "originalLanguage": "ko",
                    "status": "completed",
                    "year": 2018,
                    "updatedAt": "2024-05-01T10:00:00+00:00",
                    "lastChapter": "200"
                },
                "relationships": [
                    {"id": "author-1", "type": "author"},
                    {"id": "cover-1", "type": "cover_art", "attributes": {"fileName": "cover.jpg"}}
                ]
            }"#,
        );

        let item = from_mangadex(&record, &urls(), now());
        assert_eq!(item.id, "mangadex-32d76d19-8a05-4db0-9fc2-e0b0648fe9d0");
        assert_eq!(item.title, "Solo Leveling");
        assert_eq!(item.summary, "E-rank hunter Jinwoo.");
        assert_eq!(item.category, ContentCategory::Manhwa);
        assert_eq!(
            item.image_url,
            "https://uploads.mangadex.org/covers/32d76d19-8a05-4db0-9fc2-e0b0648fe9d0/cover.jpg"
        );
        assert_eq!(
            item.source_url,
            "https://mangadex.org/title/32d76d19-8a05-4db0-9fc2-e0b0648fe9d0"
        );
        assert_eq!(item.release_date, "2018");
        assert_eq!(item.status, ContentStatus::Finished);
        assert_eq!(item.chapters, Some(200));
        assert!(item.is_trending);
        assert_eq!(item.updated_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_from_mangadex_fallbacks() {
        let record = manga(
            r#"{
                "id": "abc",
                "attributes": {
                    "title": {"ja-ro": "Tensei Shitara", "ja": "転生したら"},
                    "description": [],
                    "originalLanguage": "zh",
                    "status": "ongoing",
                    "lastChapter": "12.5"
                },
                "relationships": [{"id": "cover-1", "type": "cover_art"}]
            }"#,
        );

        let item = from_mangadex(&record, &urls(), now());
        assert_eq!(item.title, "Tensei Shitara");
        assert_eq!(item.summary, NO_DESCRIPTION);
        assert_eq!(item.category, ContentCategory::Manhua);
        assert_eq!(item.image_url, PLACEHOLDER_COVER);
        assert_eq!(item.release_date, UNKNOWN_DATE);
        assert_eq!(item.updated_at, now());
        assert_eq!(item.chapters, None);
    }

    #[test]
    fn test_from_mangadex_without_titles() {
        let record = manga(r#"{"id": "x", "attributes": {"title": {}}}"#);
        let item = from_mangadex(&record, &urls(), now());
        assert_eq!(item.title, UNKNOWN_TITLE);
    }
}

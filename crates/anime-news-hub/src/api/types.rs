//! Upstream response types.
//!
//! AniList answers GraphQL queries; MangaDex answers REST listings. Only the
//! fields the normalizer reads are modelled, everything else is ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ========== AniList ==========

/// GraphQL request body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

/// GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// `data` of a `Page { media }` query
#[derive(Debug, Clone, Deserialize)]
pub struct PageData {
    #[serde(rename = "Page")]
    pub page: MediaPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaPage {
    #[serde(default)]
    pub media: Vec<Media>,
}

/// AniList media record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: u64,
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,
    pub format: Option<String>,
    pub country_of_origin: Option<String>,
    pub title: MediaTitle,
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: CoverImage,
    pub site_url: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub popularity: Option<u32>,
    pub average_score: Option<u32>,
    pub trending: Option<i64>,
    /// Unix seconds
    pub updated_at: Option<i64>,
    pub start_date: Option<FuzzyDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Anime,
    Manga,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Anime => "ANIME",
            MediaType::Manga => "MANGA",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

/// Date with optional month and day
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

// ========== MangaDex ==========

/// `/manga` collection response
#[derive(Debug, Clone, Deserialize)]
pub struct MangaCollection {
    pub result: String,
    #[serde(default)]
    pub data: Vec<MangaRecord>,
}

/// MangaDex manga entity
#[derive(Debug, Clone, Deserialize)]
pub struct MangaRecord {
    pub id: String,
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaAttributes {
    /// Localized strings keyed by language code, in upstream order
    #[serde(default)]
    pub title: Map<String, Value>,
    /// An object of localized strings, or an empty array when none exist
    #[serde(default)]
    pub description: Option<Value>,
    pub original_language: Option<String>,
    pub status: Option<String>,
    pub year: Option<i32>,
    pub updated_at: Option<String>,
    pub last_chapter: Option<String>,
    pub follow_count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<RelationshipAttributes>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipAttributes {
    pub file_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_anilist_page() {
        let json = r#"{
            "data": {
                "Page": {
                    "media": [{
                        "id": 16498,
                        "type": "ANIME",
                        "format": "TV",
                        "countryOfOrigin": "JP",
                        "title": {"romaji": "Shingeki no Kyojin", "english": "Attack on Titan", "native": "進撃の巨人"},
                        "description": "Several hundred years ago...",
                        "coverImage": {"large": "https://img/large.jpg", "medium": null},
                        "siteUrl": "https://anilist.co/anime/16498",
                        "status": "FINISHED",
                        "episodes": 25,
                        "chapters": null,
                        "popularity": 900000,
                        "averageScore": 85,
                        "trending": 12,
                        "updatedAt": 1700000000,
                        "startDate": {"year": 2013, "month": 4, "day": 7}
                    }]
                }
            }
        }"#;

        let response: GraphQlResponse<PageData> = serde_json::from_str(json).unwrap();
        assert!(response.errors.is_empty());
        let media = &response.data.unwrap().page.media[0];
        assert_eq!(media.media_type, Some(MediaType::Anime));
        assert_eq!(media.title.english.as_deref(), Some("Attack on Titan"));
        assert_eq!(media.start_date.as_ref().and_then(|d| d.month), Some(4));
    }

    #[test]
    fn test_parse_graphql_errors() {
        let json = r#"{"data": null, "errors": [{"message": "Too Many Requests.", "status": 429}]}"#;
        let response: GraphQlResponse<PageData> = serde_json::from_str(json).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].message, "Too Many Requests.");
    }

    #[test]
    fn test_mangadex_title_keeps_upstream_order() {
        let json = r#"{
            "id": "a1",
            "attributes": {
                "title": {"ja-ro": "Boku no Hero", "en": "My Hero"},
                "originalLanguage": "ja"
            }
        }"#;
        let record: MangaRecord = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = record.attributes.title.keys().cloned().collect();
        assert_eq!(keys, vec!["ja-ro", "en"]);
        assert!(record.relationships.is_empty());
    }

    #[test]
    fn test_mangadex_empty_description_array() {
        let json = r#"{
            "id": "b2",
            "attributes": {"title": {"en": "Oneshot"}, "description": []}
        }"#;
        let record: MangaRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record.attributes.description, Some(Value::Array(_))));
    }
}

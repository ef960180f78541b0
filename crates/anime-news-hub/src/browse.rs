//! Listing filters and tab layouts.

use crate::aggregator::{CategoriesView, TrendingView};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{ContentItem, FilterOptions, SortBy, StatusFilter};
use std::cmp::Reverse;

/// Items shown in the trending grid
pub const TRENDING_GRID_SIZE: usize = 12;
/// Items shown per section on the categories tab
pub const SECTION_SIZE: usize = 8;

/// Filter and sort a listing
///
/// Filters apply in order (category, status, age of `updated_at`); sorting is
/// stable so ties keep upstream order.
pub fn apply_filters(items: &[ContentItem], options: &FilterOptions, now: DateTime<Utc>) -> Vec<ContentItem> {
    let max_age = options.date_range.max_age();

    let mut filtered: Vec<ContentItem> = items
        .iter()
        .filter(|item| options.category.matches(item.category))
        .filter(|item| match options.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => item.status == status,
        })
        .filter(|item| max_age.map_or(true, |age| now - item.updated_at <= age))
        .cloned()
        .collect();

    match options.sort_by {
        SortBy::Upstream => {}
        SortBy::Latest => filtered.sort_by_key(|item| Reverse(item.updated_at)),
        // None sorts below any Some, so missing popularity lands last
        SortBy::Popular => filtered.sort_by_key(|item| Reverse(item.popularity)),
        SortBy::Trending => filtered.sort_by_key(|item| (Reverse(item.is_trending), Reverse(item.popularity))),
    }

    filtered
}

/// A titled group of cards
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub items: Vec<ContentItem>,
}

/// Sections of the categories tab, empty ones omitted
pub fn category_sections(view: &CategoriesView) -> Vec<Section> {
    [
        ("From MangaDex", &view.mangadex),
        ("Popular Manga", &view.manga),
        ("Popular Anime", &view.anime),
    ]
    .into_iter()
    .filter(|(_, items)| !items.is_empty())
    .map(|(title, items)| Section {
        title,
        items: items.iter().take(SECTION_SIZE).cloned().collect(),
    })
    .collect()
}

/// The "hot right now" grid of the trending tab
pub fn trending_grid(view: &TrendingView) -> &[ContentItem] {
    let end = view.combined.len().min(TRENDING_GRID_SIZE);
    &view.combined[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use shared::{CategoryFilter, ContentCategory, ContentStatus, DateRange};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn item(id: &str, category: ContentCategory, status: ContentStatus, age_hours: i64) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            title: id.to_uppercase(),
            alternative_titles: Vec::new(),
            summary: "summary".to_string(),
            category,
            image_url: "https://img".to_string(),
            source_url: "https://src".to_string(),
            source_name: "AniList".to_string(),
            release_date: "Unknown".to_string(),
            updated_at: now() - Duration::hours(age_hours),
            status,
            popularity: None,
            score: None,
            is_trending: false,
            episodes: None,
            chapters: None,
        }
    }

    fn ids(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn sample() -> Vec<ContentItem> {
        let mut a = item("a", ContentCategory::Anime, ContentStatus::Ongoing, 2);
        a.popularity = Some(500);
        let mut b = item("b", ContentCategory::Manga, ContentStatus::Finished, 30);
        b.popularity = Some(900);
        b.is_trending = true;
        let c = item("c", ContentCategory::Manhwa, ContentStatus::Ongoing, 24 * 10);
        let mut d = item("d", ContentCategory::Anime, ContentStatus::Upcoming, 1);
        d.popularity = Some(500);
        d.is_trending = true;
        vec![a, b, c, d]
    }

    #[test]
    fn test_default_options_keep_everything_in_order() {
        let items = sample();
        let result = apply_filters(&items, &FilterOptions::default(), now());
        assert_eq!(ids(&result), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_category_and_status_filters() {
        let items = sample();
        let options = FilterOptions {
            category: CategoryFilter::Only(ContentCategory::Anime),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&items, &options, now())), vec!["a", "d"]);

        let options = FilterOptions {
            status: StatusFilter::Only(ContentStatus::Ongoing),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&items, &options, now())), vec!["a", "c"]);
    }

    #[test]
    fn test_date_ranges() {
        let items = sample();
        let mut options = FilterOptions {
            date_range: DateRange::Today,
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&items, &options, now())), vec!["a", "d"]);

        options.date_range = DateRange::Week;
        assert_eq!(ids(&apply_filters(&items, &options, now())), vec!["a", "b", "d"]);

        options.date_range = DateRange::Month;
        assert_eq!(apply_filters(&items, &options, now()).len(), 4);
    }

    #[test]
    fn test_sorting_is_stable() {
        let items = sample();

        let latest = FilterOptions {
            sort_by: SortBy::Latest,
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&items, &latest, now())), vec!["d", "a", "b", "c"]);

        let popular = FilterOptions {
            sort_by: SortBy::Popular,
            ..Default::default()
        };
        // a and d tie on popularity; c has none
        assert_eq!(ids(&apply_filters(&items, &popular, now())), vec!["b", "a", "d", "c"]);

        let trending = FilterOptions {
            sort_by: SortBy::Trending,
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&items, &trending, now())), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_category_sections_skip_empty_and_truncate() {
        let many: Vec<_> = (0..10)
            .map(|i| item(&format!("m{}", i), ContentCategory::Manga, ContentStatus::Ongoing, 1))
            .collect();
        let view = CategoriesView {
            mangadex: Vec::new(),
            manga: many,
            anime: vec![item("a", ContentCategory::Anime, ContentStatus::Ongoing, 1)],
        };

        let sections = category_sections(&view);
        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Popular Manga", "Popular Anime"]);
        assert_eq!(sections[0].items.len(), SECTION_SIZE);
    }

    #[test]
    fn test_trending_grid_caps_at_twelve() {
        let combined: Vec<_> = (0..20)
            .map(|i| item(&format!("t{}", i), ContentCategory::Anime, ContentStatus::Ongoing, 1))
            .collect();
        let view = TrendingView {
            anime: combined.clone(),
            manga: Vec::new(),
            combined,
        };
        assert_eq!(trending_grid(&view).len(), TRENDING_GRID_SIZE);
        assert!(trending_grid(&TrendingView::default()).is_empty());
    }
}

//! Data models for the hub.
//!
//! Every upstream record is mapped into [`ContentItem`]. Field names serialize
//! in camelCase so stored JSON keeps the layout of the browser storage it
//! replaces.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Content category shown on filter chips
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ContentCategory {
    Anime,
    Manga,
    Manhwa,
    Manhua,
    LightNovel,
    WebNovel,
}

impl ContentCategory {
    /// All categories in chip order
    pub const ALL: [ContentCategory; 6] = [
        ContentCategory::Anime,
        ContentCategory::Manga,
        ContentCategory::Manhwa,
        ContentCategory::Manhua,
        ContentCategory::LightNovel,
        ContentCategory::WebNovel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Anime => "anime",
            ContentCategory::Manga => "manga",
            ContentCategory::Manhwa => "manhwa",
            ContentCategory::Manhua => "manhua",
            ContentCategory::LightNovel => "light-novel",
            ContentCategory::WebNovel => "web-novel",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ContentCategory::Anime => "Anime",
            ContentCategory::Manga => "Manga",
            ContentCategory::Manhwa => "Manhwa",
            ContentCategory::Manhua => "Manhua",
            ContentCategory::LightNovel => "Light Novel",
            ContentCategory::WebNovel => "Web Novel",
        }
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContentCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "anime" => Ok(ContentCategory::Anime),
            "manga" => Ok(ContentCategory::Manga),
            "manhwa" => Ok(ContentCategory::Manhwa),
            "manhua" => Ok(ContentCategory::Manhua),
            "light-novel" => Ok(ContentCategory::LightNovel),
            "web-novel" => Ok(ContentCategory::WebNovel),
            _ => Err(anyhow::anyhow!("Invalid content category: {}", s)),
        }
    }
}

/// Publication status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Ongoing,
    Upcoming,
    Finished,
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentStatus::Ongoing => write!(f, "ongoing"),
            ContentStatus::Upcoming => write!(f, "upcoming"),
            ContentStatus::Finished => write!(f, "finished"),
        }
    }
}

impl std::str::FromStr for ContentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ongoing" => Ok(ContentStatus::Ongoing),
            "upcoming" => Ok(ContentStatus::Upcoming),
            "finished" => Ok(ContentStatus::Finished),
            _ => Err(anyhow::anyhow!("Invalid content status: {}", s)),
        }
    }
}

/// Unified content item produced by every upstream source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Source-prefixed identifier, e.g. `anime-21` or `mangadex-<uuid>`
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_titles: Vec<String>,
    pub summary: String,
    pub category: ContentCategory,
    pub image_url: String,
    pub source_url: String,
    pub source_name: String,

    /// Free-form: `YYYY-M-D`, `YYYY-??-??`, a bare year, or `Unknown`
    pub release_date: String,
    pub updated_at: DateTime<Utc>,
    pub status: ContentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<u32>,
}

/// A favorited item with the time it was added
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    #[serde(flatten)]
    pub item: ContentItem,
    pub added_at: DateTime<Utc>,
}

impl FavoriteItem {
    pub fn new(item: ContentItem) -> Self {
        Self {
            item,
            added_at: Utc::now(),
        }
    }
}

/// Category chip selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ContentCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: ContentCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// Status filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ContentStatus),
}

impl std::str::FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// Sort order for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Keep upstream order
    #[default]
    Upstream,
    Latest,
    Popular,
    Trending,
}

impl std::str::FromStr for SortBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upstream" | "default" => Ok(SortBy::Upstream),
            "latest" => Ok(SortBy::Latest),
            "popular" => Ok(SortBy::Popular),
            "trending" => Ok(SortBy::Trending),
            _ => Err(anyhow::anyhow!("Invalid sort order: {}", s)),
        }
    }
}

/// Window on `updated_at`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl DateRange {
    /// Maximum age of an item for this range, `None` meaning unbounded
    pub fn max_age(&self) -> Option<Duration> {
        match self {
            DateRange::All => None,
            DateRange::Today => Some(Duration::hours(24)),
            DateRange::Week => Some(Duration::days(7)),
            DateRange::Month => Some(Duration::days(30)),
        }
    }
}

impl std::str::FromStr for DateRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DateRange::All),
            "today" => Ok(DateRange::Today),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            _ => Err(anyhow::anyhow!("Invalid date range: {}", s)),
        }
    }
}

/// Combined listing filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub category: CategoryFilter,
    pub status: StatusFilter,
    pub sort_by: SortBy,
    pub date_range: DateRange,
}

/// Navigation tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Trending,
    Categories,
    Favorites,
}

impl Tab {
    pub fn page_title(&self) -> &'static str {
        match self {
            Tab::Home => "Discover",
            Tab::Trending => "Trending",
            Tab::Categories => "Categories",
            Tab::Favorites => "Favorites",
        }
    }
}

//! Feed identities and the catalog source seam.

use crate::api::SourceError;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use shared::ContentItem;

/// Anime season as AniList names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Season containing the given month (1-12)
    pub fn from_month(month: u32) -> Self {
        match month {
            1..=3 => Season::Winter,
            4..=6 => Season::Spring,
            7..=9 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Spring => "SPRING",
            Season::Summer => "SUMMER",
            Season::Fall => "FALL",
        }
    }
}

impl std::str::FromStr for Season {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WINTER" => Ok(Season::Winter),
            "SPRING" => Ok(Season::Spring),
            "SUMMER" => Ok(Season::Summer),
            "FALL" | "AUTUMN" => Ok(Season::Fall),
            _ => Err(anyhow::anyhow!("Invalid season: {}", s)),
        }
    }
}

/// A query whose results can be fetched and cached as a unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Feed {
    /// Trending anime, trending manga and MangaDex combined
    All,
    TrendingAnime,
    TrendingManga,
    PopularAnime,
    SeasonalAnime { season: Season, year: i32 },
    /// Most followed titles on MangaDex
    MangaDex,
    Search(String),
}

impl Feed {
    /// Seasonal feed for the season containing `now`
    pub fn current_season(now: DateTime<Utc>) -> Self {
        Feed::SeasonalAnime {
            season: Season::from_month(now.month()),
            year: now.year(),
        }
    }

    /// Stable key used by the session cache
    pub fn cache_key(&self) -> String {
        match self {
            Feed::All => "allContent".to_string(),
            Feed::TrendingAnime => "trendingAnime".to_string(),
            Feed::TrendingManga => "trendingManga".to_string(),
            Feed::PopularAnime => "popularAnime".to_string(),
            Feed::SeasonalAnime { season, year } => {
                format!("seasonalAnime:{}:{}", season.as_str(), year)
            }
            Feed::MangaDex => "mangaDexManga".to_string(),
            Feed::Search(query) => format!("search:{}", normalize_query(query)),
        }
    }

    /// Feeds merged to build this one, in merge order
    pub fn components(&self) -> Vec<Feed> {
        match self {
            Feed::All => vec![Feed::TrendingAnime, Feed::TrendingManga, Feed::MangaDex],
            other => vec![other.clone()],
        }
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

/// Collapse whitespace and case so equivalent searches share a cache entry
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// An upstream catalog that can serve some feeds
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Source name for logging and item attribution
    fn name(&self) -> &'static str;

    /// Whether this source can serve the (non-composite) feed
    fn supports(&self, feed: &Feed) -> bool;

    /// Fetch one page of the feed, already normalized
    async fn fetch(&self, feed: &Feed) -> Result<Vec<ContentItem>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_season_boundaries() {
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Winter);
        assert_eq!(Season::from_month(4), Season::Spring);
        assert_eq!(Season::from_month(9), Season::Summer);
        assert_eq!(Season::from_month(10), Season::Fall);
        assert_eq!(Season::from_month(12), Season::Fall);
    }

    #[test]
    fn test_season_parsing() {
        assert_eq!("spring".parse::<Season>().unwrap(), Season::Spring);
        assert_eq!("Autumn".parse::<Season>().unwrap(), Season::Fall);
        assert!("monsoon".parse::<Season>().is_err());
    }

    #[test]
    fn test_current_season_feed() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        assert_eq!(
            Feed::current_season(now),
            Feed::SeasonalAnime {
                season: Season::Fall,
                year: 2026
            }
        );
        assert_eq!(Feed::current_season(now).cache_key(), "seasonalAnime:FALL:2026");
    }

    #[test]
    fn test_search_keys_are_normalized() {
        let a = Feed::Search("  One   Piece ".to_string());
        let b = Feed::Search("one piece".to_string());
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), "search:one piece");
    }

    #[test]
    fn test_all_feed_components_order() {
        assert_eq!(
            Feed::All.components(),
            vec![Feed::TrendingAnime, Feed::TrendingManga, Feed::MangaDex]
        );
        assert_eq!(Feed::PopularAnime.components(), vec![Feed::PopularAnime]);
    }
}

//! Anime News Hub library for browsing anime and manga catalogs.
//!
//! This library fetches trending, popular and searchable content from the
//! AniList GraphQL API and the MangaDex REST API, normalizes it into one item
//! model, and layers a session cache and a favorites store on top.

pub mod aggregator;
pub mod api;
pub mod browse;
pub mod cache;
pub mod favorites;
pub mod normalize;
pub mod render;
pub mod share;
pub mod source;

pub use aggregator::{dedup_by_title, CategoriesView, ContentHub, TrendingView};
pub use api::{AniListClient, MangaDexClient, RateLimiter, SourceError};
pub use browse::apply_filters;
pub use cache::{CacheStats, ContentCache};
pub use favorites::FavoritesStore;
pub use share::{share_links, ShareLinks};
pub use source::{CatalogSource, Feed, Season};

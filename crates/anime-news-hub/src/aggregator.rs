//! Content aggregation across upstream catalogs.
//!
//! Fans requests out to every source that serves a feed, merges the results
//! in a fixed order and drops repeated titles. Successful results are
//! memoized in the session cache.

use crate::api::{AniListClient, MangaDexClient};
use crate::cache::{CacheStats, ContentCache};
use crate::source::{normalize_query, CatalogSource, Feed};
use anyhow::{anyhow, Context, Result};
use futures::future::join_all;
use shared::{Config, ContentItem};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Trending anime and manga side by side
#[derive(Debug, Clone, Default)]
pub struct TrendingView {
    pub anime: Vec<ContentItem>,
    pub manga: Vec<ContentItem>,
    /// Anime followed by manga, truncated to the trending limit
    pub combined: Vec<ContentItem>,
}

/// Sections of the categories tab
#[derive(Debug, Clone, Default)]
pub struct CategoriesView {
    pub mangadex: Vec<ContentItem>,
    pub manga: Vec<ContentItem>,
    pub anime: Vec<ContentItem>,
}

/// Keep the first item for every exact title
pub fn dedup_by_title(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.title.clone()))
        .collect()
}

/// Aggregator over all upstream catalogs
pub struct ContentHub {
    sources: Vec<Arc<dyn CatalogSource>>,
    cache: ContentCache,
    trending_limit: usize,
}

impl ContentHub {
    /// Create a hub over the given sources, in merge order
    pub fn new(sources: Vec<Arc<dyn CatalogSource>>, cache: ContentCache, trending_limit: usize) -> Self {
        Self {
            sources,
            cache,
            trending_limit,
        }
    }

    /// Build the AniList and MangaDex clients and the session cache from config
    pub fn from_config(config: &Config) -> Result<Self> {
        let per_page = config.feed.per_page;

        let anilist = AniListClient::new(&config.anilist, per_page)
            .context("Failed to create AniList client")?;
        let mangadex = MangaDexClient::new(&config.mangadex, per_page)
            .context("Failed to create MangaDex client")?;

        let cache = ContentCache::open(
            config.cache_file(),
            config.cache.enabled,
            chrono::Duration::seconds(config.cache.ttl_seconds as i64),
        );

        Ok(Self::new(
            vec![Arc::new(anilist), Arc::new(mangadex)],
            cache,
            config.feed.trending_limit,
        ))
    }

    /// Fetch a feed, serving it from the cache while fresh
    pub async fn feed(&mut self, feed: &Feed) -> Result<Vec<ContentItem>> {
        if let Feed::Search(query) = feed {
            if query.trim().is_empty() {
                return Ok(Vec::new());
            }
        }

        let key = feed.cache_key();
        match self.cache.get(&key) {
            Ok(Some(items)) => {
                debug!(feed = %key, items = items.len(), "Serving feed from cache");
                return Ok(items);
            }
            Ok(None) => {}
            Err(e) => warn!(feed = %key, error = %e, "Cache lookup failed"),
        }

        let items = match feed {
            Feed::All | Feed::Search(_) => self.fan_out(feed).await?,
            _ => self.fetch_single(feed).await?,
        };

        if let Err(e) = self.cache.set(&key, &items) {
            warn!(feed = %key, error = %e, "Failed to cache feed");
        }

        info!(feed = %key, items = items.len(), "Fetched feed");
        Ok(items)
    }

    /// Like [`feed`](Self::feed), but a failure yields an empty list
    pub async fn feed_or_empty(&mut self, feed: &Feed) -> Vec<ContentItem> {
        match self.feed(feed).await {
            Ok(items) => items,
            Err(e) => {
                warn!(feed = %feed, error = %e, "Feed unavailable");
                Vec::new()
            }
        }
    }

    /// Everything on the home tab
    pub async fn all_content(&mut self) -> Result<Vec<ContentItem>> {
        self.feed(&Feed::All).await
    }

    /// Search every source that supports it
    pub async fn search(&mut self, query: &str) -> Result<Vec<ContentItem>> {
        self.feed(&Feed::Search(normalize_query(query))).await
    }

    /// Trending anime and manga
    pub async fn trending(&mut self) -> TrendingView {
        let anime = self.feed_or_empty(&Feed::TrendingAnime).await;
        let manga = self.feed_or_empty(&Feed::TrendingManga).await;

        let combined = anime
            .iter()
            .chain(manga.iter())
            .take(self.trending_limit)
            .cloned()
            .collect();

        TrendingView {
            anime,
            manga,
            combined,
        }
    }

    /// Sections for the categories tab
    pub async fn categories(&mut self) -> CategoriesView {
        CategoriesView {
            mangadex: self.feed_or_empty(&Feed::MangaDex).await,
            manga: self.feed_or_empty(&Feed::TrendingManga).await,
            anime: self.feed_or_empty(&Feed::TrendingAnime).await,
        }
    }

    /// Look an item up by id across the browsable feeds
    pub async fn find_item(&mut self, id: &str) -> Result<Option<ContentItem>> {
        for feed in [
            Feed::All,
            Feed::TrendingAnime,
            Feed::TrendingManga,
            Feed::MangaDex,
            Feed::PopularAnime,
        ] {
            let items = self.feed_or_empty(&feed).await;
            if let Some(item) = items.into_iter().find(|i| i.id == id) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Drop every cached feed
    pub fn clear_cache(&mut self) -> Result<()> {
        self.cache.clear()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn fetch_single(&self, feed: &Feed) -> Result<Vec<ContentItem>> {
        let source = self
            .sources
            .iter()
            .find(|s| s.supports(feed))
            .ok_or_else(|| anyhow!("No source serves feed {}", feed))?;

        source
            .fetch(feed)
            .await
            .with_context(|| format!("Failed to fetch {} from {}", feed, source.name()))
    }

    /// Query every (component feed, source) pair concurrently and merge
    ///
    /// A failing source contributes nothing; the fan-out only fails when
    /// every request failed.
    async fn fan_out(&self, feed: &Feed) -> Result<Vec<ContentItem>> {
        let requests: Vec<(Feed, Arc<dyn CatalogSource>)> = feed
            .components()
            .into_iter()
            .flat_map(|component| {
                self.sources
                    .iter()
                    .filter(|s| s.supports(&component))
                    .map(|s| (component.clone(), Arc::clone(s)))
                    .collect::<Vec<_>>()
            })
            .collect();

        if requests.is_empty() {
            return Err(anyhow!("No source serves feed {}", feed));
        }

        let results = join_all(requests.iter().map(|(component, source)| async move {
            (component, source.name(), source.fetch(component).await)
        }))
        .await;

        let mut merged = Vec::new();
        let mut failures = Vec::new();

        for (component, source_name, result) in results {
            match result {
                Ok(items) => {
                    debug!(feed = %component, source = source_name, items = items.len(), "Source responded");
                    merged.extend(items);
                }
                Err(e) => {
                    warn!(feed = %component, source = source_name, error = %e, "Source failed, skipping");
                    failures.push(format!("{} ({}): {}", source_name, component, e));
                }
            }
        }

        if failures.len() == requests.len() {
            return Err(anyhow!("Every source failed for {}: {}", feed, failures.join("; ")));
        }

        let total = merged.len();
        let unique = dedup_by_title(merged);
        debug!(feed = %feed, total = total, unique = unique.len(), "Merged feed");

        Ok(unique)
    }
}

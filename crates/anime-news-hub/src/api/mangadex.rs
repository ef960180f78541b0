//! MangaDex REST client.

use super::error::SourceError;
use super::transport::{RetryPolicy, Transport};
use super::types::MangaCollection;
use crate::normalize::{self, MangaDexUrls};
use crate::source::{CatalogSource, Feed};
use async_trait::async_trait;
use chrono::Utc;
use shared::config::MangaDexConfig;
use shared::ContentItem;
use tracing::{info, warn};

const SOURCE_NAME: &str = "MangaDex";

/// MangaDex REST client
pub struct MangaDexClient {
    transport: Transport,
    base_url: String,
    urls: MangaDexUrls,
    content_ratings: Vec<String>,
    per_page: u32,
}

impl MangaDexClient {
    /// Create a new MangaDex client
    pub fn new(config: &MangaDexConfig, per_page: u32) -> Result<Self, SourceError> {
        let transport = Transport::new(
            SOURCE_NAME,
            &config.rate_limit,
            RetryPolicy {
                max_retries: config.max_retries,
                retry_delay_ms: config.retry_delay_ms,
            },
        )?;

        Ok(Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            urls: MangaDexUrls {
                uploads_url: config.uploads_url.clone(),
                site_url: config.site_url.clone(),
            },
            content_ratings: config.content_ratings.clone(),
            per_page,
        })
    }

    /// Query parameters shared by every listing
    fn listing_params(&self, order: (&str, &str)) -> Vec<(String, String)> {
        let mut params = vec![
            ("limit".to_string(), self.per_page.to_string()),
            (format!("order[{}]", order.0), order.1.to_string()),
            ("includes[]".to_string(), "cover_art".to_string()),
        ];
        params.extend(
            self.content_ratings
                .iter()
                .map(|rating| ("contentRating[]".to_string(), rating.clone())),
        );
        params
    }

    async fn list(&self, params: Vec<(String, String)>) -> Result<Vec<ContentItem>, SourceError> {
        let url = format!("{}/manga", self.base_url);
        let collection: MangaCollection = self
            .transport
            .send_json(|client| client.get(&url).query(&params))
            .await?;

        if collection.result != "ok" {
            warn!(result = %collection.result, "MangaDex listing reported a non-ok result");
        }

        let now = Utc::now();
        Ok(collection
            .data
            .iter()
            .map(|record| normalize::from_mangadex(record, &self.urls, now))
            .collect())
    }

    /// Fetch the most followed manga
    pub async fn popular_manga(&self) -> Result<Vec<ContentItem>, SourceError> {
        info!("Fetching popular manga from MangaDex");
        self.list(self.listing_params(("followedCount", "desc"))).await
    }

    /// Search manga by title
    pub async fn search(&self, query: &str) -> Result<Vec<ContentItem>, SourceError> {
        info!(query = query, "Searching MangaDex");
        let mut params = self.listing_params(("relevance", "desc"));
        params.push(("title".to_string(), query.to_string()));
        self.list(params).await
    }
}

#[async_trait]
impl CatalogSource for MangaDexClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn supports(&self, feed: &Feed) -> bool {
        matches!(feed, Feed::MangaDex | Feed::Search(_))
    }

    async fn fetch(&self, feed: &Feed) -> Result<Vec<ContentItem>, SourceError> {
        match feed {
            Feed::MangaDex => self.popular_manga().await,
            Feed::Search(query) => self.search(query).await,
            _ => Err(SourceError::Unsupported {
                source_name: SOURCE_NAME,
                feed: feed.to_string(),
            }),
        }
    }
}

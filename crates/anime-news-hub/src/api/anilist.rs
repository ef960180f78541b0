//! AniList GraphQL client.

use super::error::SourceError;
use super::transport::{RetryPolicy, Transport};
use super::types::{GraphQlRequest, GraphQlResponse, Media, MediaType, PageData};
use crate::normalize;
use crate::source::{CatalogSource, Feed, Season};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use shared::config::AniListConfig;
use shared::ContentItem;
use tracing::info;

const SOURCE_NAME: &str = "AniList";

const MEDIA_FIELDS: &str = r#"
        id
        type
        format
        countryOfOrigin
        title {
          romaji
          english
          native
        }
        description
        coverImage {
          large
          medium
        }
        siteUrl
        status
        episodes
        chapters
        popularity
        averageScore
        trending
        updatedAt
        startDate {
          year
          month
          day
        }
"#;

/// Build a `Page { media(...) }` query with the shared field selection
fn page_query(params: &str, media_args: &str) -> String {
    format!(
        "query({params}) {{\n  Page(page: 1, perPage: $perPage) {{\n    media({media_args}) {{{MEDIA_FIELDS}    }}\n  }}\n}}"
    )
}

/// Unwrap a page response; any reported error fails the request, even alongside data
fn into_media(response: GraphQlResponse<PageData>) -> Result<Vec<Media>, SourceError> {
    if !response.errors.is_empty() {
        let message = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SourceError::GraphQl {
            source_name: SOURCE_NAME,
            message,
        });
    }

    Ok(response.data.map(|d| d.page.media).unwrap_or_default())
}

/// AniList GraphQL client
pub struct AniListClient {
    transport: Transport,
    endpoint: String,
    per_page: u32,
}

impl AniListClient {
    /// Create a new AniList client
    pub fn new(config: &AniListConfig, per_page: u32) -> Result<Self, SourceError> {
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
            endpoint: config.endpoint.clone(),
            per_page,
        })
    }

    /// Run a page query and normalize the media it returns
    async fn query_page(
        &self,
        query: &str,
        mut variables: Value,
        fallback_type: MediaType,
    ) -> Result<Vec<ContentItem>, SourceError> {
        if let Value::Object(map) = &mut variables {
            map.insert("perPage".to_string(), json!(self.per_page));
        }

        let body = GraphQlRequest { query, variables };
        let response: GraphQlResponse<PageData> = self
            .transport
            .send_json(|client| client.post(&self.endpoint).json(&body))
            .await?;

        let media = into_media(response)?;
        let now = Utc::now();

        Ok(media
            .iter()
            .map(|m| normalize::from_anilist(m, fallback_type, now))
            .collect())
    }

    /// Fetch trending anime
    pub async fn trending_anime(&self) -> Result<Vec<ContentItem>, SourceError> {
        info!("Fetching trending anime");
        let query = page_query("$perPage: Int", "type: ANIME, sort: TRENDING_DESC");
        self.query_page(&query, json!({}), MediaType::Anime).await
    }

    /// Fetch trending manga
    pub async fn trending_manga(&self) -> Result<Vec<ContentItem>, SourceError> {
        info!("Fetching trending manga");
        let query = page_query("$perPage: Int", "type: MANGA, sort: TRENDING_DESC");
        self.query_page(&query, json!({}), MediaType::Manga).await
    }

    /// Fetch the most popular anime of all time
    pub async fn popular_anime(&self) -> Result<Vec<ContentItem>, SourceError> {
        info!("Fetching popular anime");
        let query = page_query("$perPage: Int", "type: ANIME, sort: POPULARITY_DESC");
        self.query_page(&query, json!({}), MediaType::Anime).await
    }

    /// Fetch the most popular anime of one season
    pub async fn seasonal_anime(
        &self,
        season: Season,
        year: i32,
    ) -> Result<Vec<ContentItem>, SourceError> {
        info!(season = season.as_str(), year = year, "Fetching seasonal anime");
        let query = page_query(
            "$perPage: Int, $season: MediaSeason, $seasonYear: Int",
            "type: ANIME, season: $season, seasonYear: $seasonYear, sort: POPULARITY_DESC",
        );
        self.query_page(
            &query,
            json!({ "season": season.as_str(), "seasonYear": year }),
            MediaType::Anime,
        )
        .await
    }

    /// Search anime and manga by title
    pub async fn search(&self, search: &str) -> Result<Vec<ContentItem>, SourceError> {
        info!(query = search, "Searching AniList");
        let query = page_query("$perPage: Int, $search: String", "search: $search, sort: POPULARITY_DESC");
        // Search spans both types; every record carries its own type
        self.query_page(&query, json!({ "search": search }), MediaType::Manga)
            .await
    }
}

#[async_trait]
impl CatalogSource for AniListClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn supports(&self, feed: &Feed) -> bool {
        matches!(
            feed,
            Feed::TrendingAnime
                | Feed::TrendingManga
                | Feed::PopularAnime
                | Feed::SeasonalAnime { .. }
                | Feed::Search(_)
        )
    }

    async fn fetch(&self, feed: &Feed) -> Result<Vec<ContentItem>, SourceError> {
        match feed {
            Feed::TrendingAnime => self.trending_anime().await,
            Feed::TrendingManga => self.trending_manga().await,
            Feed::PopularAnime => self.popular_anime().await,
            Feed::SeasonalAnime { season, year } => self.seasonal_anime(*season, *year).await,
            Feed::Search(query) => self.search(query).await,
            Feed::All | Feed::MangaDex => Err(SourceError::Unsupported {
                source_name: SOURCE_NAME,
                feed: feed.to_string(),
            }),
        }
    }
}

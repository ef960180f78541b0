//! Configuration management for the hub.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// AniList GraphQL settings
    pub anilist: AniListConfig,

    /// MangaDex REST settings
    pub mangadex: MangaDexConfig,

    /// Session cache settings
    pub cache: CacheConfig,

    /// Favorites store settings
    pub favorites: FavoritesConfig,

    /// Feed sizing and refresh settings
    pub feed: FeedConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output (stderr)
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// AniList configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AniListConfig {
    /// GraphQL endpoint
    pub endpoint: String,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,

    /// Maximum retries for failed requests
    pub max_retries: u32,

    /// Retry delay in milliseconds
    pub retry_delay_ms: u64,
}

/// MangaDex configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaDexConfig {
    /// REST API base URL
    pub base_url: String,

    /// Cover image host
    pub uploads_url: String,

    /// Public site used for item links
    pub site_url: String,

    /// Content ratings included in listings
    pub content_ratings: Vec<String>,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,

    /// Maximum retries for failed requests
    pub max_retries: u32,

    /// Retry delay in milliseconds
    pub retry_delay_ms: u64,
}

/// Rate limiting configuration
///
/// Omitted keys fall back to a conservative one request per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: f64,

    /// Maximum requests per minute
    pub requests_per_minute: u32,
}

/// Session cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable caching
    pub enabled: bool,

    /// Session store file (relative to data directory)
    pub session_file: String,

    /// Entry lifetime in seconds
    pub ttl_seconds: u64,
}

/// Favorites configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FavoritesConfig {
    /// Favorites file (relative to data directory)
    pub path: String,
}

/// Feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Items requested per upstream page
    pub per_page: u32,

    /// Maximum items in the combined trending list
    pub trending_limit: usize,

    /// Interval for `watch` mode in minutes
    pub refresh_interval_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_file: "session/content-cache.json".to_string(),
            ttl_seconds: 5 * 60,
        }
    }
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            path: "favorites.json".to_string(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            per_page: 20,
            trending_limit: 20,
            refresh_interval_minutes: 30,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 1.0,
            requests_per_minute: 30,
        }
    }
}

impl Default for AniListConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://graphql.anilist.co".to_string(),
            rate_limit: RateLimitConfig {
                requests_per_second: 1.0,
                requests_per_minute: 30,
            },
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for MangaDexConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mangadex.org".to_string(),
            uploads_url: "https://uploads.mangadex.org".to_string(),
            site_url: "https://mangadex.org".to_string(),
            content_ratings: vec!["safe".to_string(), "suggestive".to_string()],
            rate_limit: RateLimitConfig {
                requests_per_second: 5.0,
                requests_per_minute: 240,
            },
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            logging: LoggingConfig::default(),
            anilist: AniListConfig::default(),
            mangadex: MangaDexConfig::default(),
            cache: CacheConfig::default(),
            favorites: FavoritesConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Get the path of the session cache file
    pub fn cache_file(&self) -> PathBuf {
        self.resolve(&self.cache.session_file)
    }

    /// Get the path of the favorites file
    pub fn favorites_file(&self) -> PathBuf {
        self.resolve(&self.favorites.path)
    }

    /// Parse the configured log level, falling back to INFO
    pub fn log_level(&self) -> tracing::Level {
        self.logging
            .default_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}

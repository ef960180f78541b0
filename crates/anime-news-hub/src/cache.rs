//! Session cache for fetched feeds.
//!
//! Entries expire after a fixed time-to-live. The whole cache is stored as a
//! single JSON document so one session file holds every feed.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use shared::ContentItem;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One cached feed
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    items: Vec<ContentItem>,
    /// Milliseconds since the Unix epoch
    timestamp: i64,
}

impl CacheEntry {
    fn stored_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.stored_at() > ttl
    }
}

/// TTL cache keyed by feed identity
pub struct ContentCache {
    /// Session store file
    path: PathBuf,
    /// Whether caching is enabled
    enabled: bool,
    ttl: Duration,
    entries: BTreeMap<String, CacheEntry>,
}

impl ContentCache {
    /// Open the cache, loading whatever the session file holds
    ///
    /// A missing or unreadable store starts the cache empty.
    pub fn open(path: impl AsRef<Path>, enabled: bool, ttl: Duration) -> Self {
        let path = path.as_ref().to_path_buf();

        let entries = if enabled {
            match Self::load(&path) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load cache, starting empty");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!(
            path = %path.display(),
            enabled = enabled,
            entries = entries.len(),
            "Cache opened"
        );

        Self {
            path,
            enabled,
            ttl,
            entries,
        }
    }

    fn load(path: &Path) -> Result<BTreeMap<String, CacheEntry>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cache file: {}", path.display()))
    }

    /// Get a cached feed if present and fresh
    pub fn get(&mut self, key: &str) -> Result<Option<Vec<ContentItem>>> {
        self.get_at(key, Utc::now())
    }

    /// Same as [`get`](Self::get) with an explicit clock
    pub fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Result<Option<Vec<ContentItem>>> {
        if !self.enabled {
            return Ok(None);
        }

        let Some(entry) = self.entries.get(key) else {
            debug!(key = key, "Cache miss");
            return Ok(None);
        };

        if entry.is_expired(self.ttl, now) {
            debug!(key = key, "Cache entry expired");
            self.entries.remove(key);
            self.persist()?;
            return Ok(None);
        }

        debug!(key = key, items = entry.items.len(), "Cache hit");
        Ok(Some(entry.items.clone()))
    }

    /// Store a feed, dropping every expired entry
    pub fn set(&mut self, key: &str, items: &[ContentItem]) -> Result<()> {
        self.set_at(key, items, Utc::now())
    }

    /// Same as [`set`](Self::set) with an explicit clock
    pub fn set_at(&mut self, key: &str, items: &[ContentItem], now: DateTime<Utc>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(ttl, now));
        let pruned = before - self.entries.len();
        if pruned > 0 {
            debug!(pruned = pruned, "Pruned expired cache entries");
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                items: items.to_vec(),
                timestamp: now.timestamp_millis(),
            },
        );
        self.persist()?;

        debug!(key = key, items = items.len(), "Cache stored");
        Ok(())
    }

    /// Drop every entry and delete the session file
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();

        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove cache file: {}", self.path.display()))?;
        }

        info!("Cache cleared");
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> CacheStats {
        let stored_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        CacheStats {
            enabled: self.enabled,
            entries: self.entries.len(),
            expired_entries: self
                .entries
                .values()
                .filter(|e| e.is_expired(self.ttl, now))
                .count(),
            stored_bytes,
            ttl_seconds: self.ttl.num_seconds(),
        }
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string(&self.entries).context("Failed to serialize cache data")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))?;

        Ok(())
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub entries: usize,
    pub expired_entries: usize,
    pub stored_bytes: u64,
    pub ttl_seconds: i64,
}

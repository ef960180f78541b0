//! Durable favorites store.
//!
//! Favorites are kept in insertion order and written back to disk after every
//! change. The store is independent of the session cache.

use anyhow::{Context, Result};
use shared::{ContentItem, FavoriteItem};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// User-curated favorites persisted as a JSON list
pub struct FavoritesStore {
    path: PathBuf,
    favorites: Vec<FavoriteItem>,
}

impl FavoritesStore {
    /// Load favorites from `path`
    ///
    /// A missing file is an empty store. An unparsable file is logged and
    /// treated as empty; it is only overwritten on the next change.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let favorites = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read favorites file: {}", path.display()))?;

            match serde_json::from_str::<Vec<FavoriteItem>>(&content) {
                Ok(favorites) => favorites,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse favorites, starting empty");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        debug!(path = %path.display(), count = favorites.len(), "Favorites loaded");

        Ok(Self { path, favorites })
    }

    /// All favorites in the order they were added
    pub fn list(&self) -> &[FavoriteItem] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f.item.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&FavoriteItem> {
        self.favorites.iter().find(|f| f.item.id == id)
    }

    /// Add an item; returns false if it was already a favorite
    pub fn add(&mut self, item: &ContentItem) -> Result<bool> {
        if self.is_favorite(&item.id) {
            debug!(id = %item.id, "Already a favorite");
            return Ok(false);
        }

        self.favorites.push(FavoriteItem::new(item.clone()));
        self.save()?;

        info!(id = %item.id, title = %item.title, "Added favorite");
        Ok(true)
    }

    /// Remove an item by id; returns false if nothing matched
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.item.id != id);

        if self.favorites.len() == before {
            return Ok(false);
        }

        self.save()?;
        info!(id = id, "Removed favorite");
        Ok(true)
    }

    /// Flip the favorite state of an item; returns the new state
    pub fn toggle(&mut self, item: &ContentItem) -> Result<bool> {
        if self.is_favorite(&item.id) {
            self.remove(&item.id)?;
            Ok(false)
        } else {
            self.add(item)?;
            Ok(true)
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create favorites directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&self.favorites)
            .context("Failed to serialize favorites")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write favorites file: {}", self.path.display()))?;

        Ok(())
    }
}

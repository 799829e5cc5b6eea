//! Favorites repository
//!
//! Durable encoding of the favorites collection under one fixed key.
//! Reads fail soft; writes report errors to the caller.

use crate::config::storage::FAVORITES_KEY;
use crate::data::kv::KeyValueStore;
use crate::data::types::{FavoriteRecord, FavoritesCollection};
use crate::error::Result;
use tracing::{debug, warn};

/// Loads and saves the whole favorites collection
pub struct FavoritesRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> FavoritesRepository<S> {
    /// Create a repository using the standard favorites key
    pub fn new(store: S) -> Self {
        Self::with_key(store, FAVORITES_KEY)
    }

    /// Create a repository using a custom key
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Key the collection is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored collection
    ///
    /// Missing data, unreadable storage and malformed JSON all yield an
    /// empty collection.
    pub fn load(&self) -> FavoritesCollection {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no stored favorites");
                return FavoritesCollection::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read favorites, starting empty");
                return FavoritesCollection::new();
            }
        };

        let records: Vec<FavoriteRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored favorites are malformed, starting empty");
                return FavoritesCollection::new();
            }
        };

        let stored = records.len();
        let collection = FavoritesCollection::from_records(records);
        if collection.len() != stored {
            warn!(
                key = %self.key,
                dropped = stored - collection.len(),
                "dropped duplicate favorite ids"
            );
        }
        debug!(key = %self.key, count = collection.len(), "loaded favorites");
        collection
    }

    /// Overwrite the stored collection
    pub fn save(&self, collection: &FavoritesCollection) -> Result<()> {
        let raw = serde_json::to_string_pretty(collection)?;
        self.store.set(&self.key, &raw)?;
        debug!(key = %self.key, count = collection.len(), "saved favorites");
        Ok(())
    }

    /// Remove the stored collection
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}

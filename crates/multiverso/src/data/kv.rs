//! Key-value stores
//!
//! Raw string values under string keys. `FileStore` keeps one file per key
//! on disk; `MemoryStore` is a shared in-process map used for tests and
//! ephemeral sessions.

use crate::config::storage::FILE_EXTENSION;
use crate::data::storage;
use crate::error::{FavoritesError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A durable home for string values
///
/// Implementations are moved onto the persistence worker thread, hence `Send`.
pub trait KeyValueStore: Send {
    /// Read the value under `key`, `None` if nothing was ever stored
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value under `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store in the default data directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(storage::data_dir()?))
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        storage::read_text(&self.path_for(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        storage::write_text(&self.path_for(key)?, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        storage::delete_at(&self.path_for(key)?)
    }
}

/// Keys become file names, so they must not escape the store directory
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\'])
        && !key.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(FavoritesError::Config(format!("Invalid storage key: {key:?}")))
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store with a shared backing map
///
/// Clones share the same map, so a test can keep one handle while the
/// favorites store owns another. `set_unavailable(true)` makes every
/// operation fail, simulating storage that cannot be reached.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated unavailability
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Read a value directly, bypassing the unavailable switch
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(FavoritesError::Storage("Storage unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.peek(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

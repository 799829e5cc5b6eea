//! Data persistence
//!
//! Favorite records, key-value stores, and the repository that encodes the
//! favorites collection.

pub mod kv;
pub mod repository;
pub mod storage;
pub mod types;

// Re-export common types
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use repository::FavoritesRepository;
pub use storage::data_dir;
pub use types::{CharacterId, FavoriteRecord, FavoritesCollection};

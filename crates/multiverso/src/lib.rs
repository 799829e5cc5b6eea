//! Multiverso — Favorites Store
//!
//! Favorite characters kept in memory, persisted as one JSON value under a
//! fixed key, and published to presentation code through subscriber channels.
//!
//! ## Quick start
//!
//! ```no_run
//! use multiverso::data::{FavoriteRecord, FileStore};
//! use multiverso::favorites::FavoritesStore;
//! use std::time::Duration;
//!
//! let mut store = FavoritesStore::open(FileStore::open_default().unwrap());
//! store.wait_ready(Duration::from_secs(5));
//! store.toggle(FavoriteRecord::new(1).with_name("Rick Sanchez")).unwrap();
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod favorites;

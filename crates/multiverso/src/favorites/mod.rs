//! Favorites state
//!
//! Reducer-driven container over the favorites repository, with a
//! background persistence worker.

pub mod action;
pub mod store;
mod worker;

pub use action::{reduce, FavoriteAction, Outcome};
pub use store::{default_flush_timeout, FavoritesStore, Lifecycle, StoreEvent, Toggled};

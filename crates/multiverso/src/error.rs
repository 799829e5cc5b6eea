//! Error types for Multiverso
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for the favorites core
#[derive(Error, Debug)]
pub enum FavoritesError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Favorites are still loading")]
    NotReady,

    #[error("Persistence worker is not running")]
    WorkerUnavailable,
}

/// Result type alias for Multiverso
pub type Result<T> = std::result::Result<T, FavoritesError>;

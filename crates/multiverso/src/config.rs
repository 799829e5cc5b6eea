//! Configuration constants for the favorites core

/// Application metadata
pub mod app {
    /// Application name (used for the data directory)
    pub const NAME: &str = "multiverso";

    /// Environment variable that overrides the data directory
    pub const DATA_DIR_ENV: &str = "MULTIVERSO_DATA_DIR";
}

/// Persistence-related configuration
pub mod storage {
    /// Key holding the serialized favorites collection
    pub const FAVORITES_KEY: &str = "favorites.characters.v1";

    /// File extension used by the file-backed key-value store
    pub const FILE_EXTENSION: &str = "json";
}

/// Container-related configuration
pub mod store {
    /// Default time `flush` waits for the worker to drain (milliseconds)
    pub const FLUSH_TIMEOUT_MS: u64 = 2_000;
}

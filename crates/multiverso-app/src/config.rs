//! Configuration constants for multiverso app services

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("Multiverso/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds
    pub const READ_TIMEOUT_SECS: u64 = 30;
}

/// Provider-related configuration
pub mod providers {
    /// Default Rick and Morty API server
    pub const RICK_AND_MORTY_DEFAULT_SERVER: &str = "https://rickandmortyapi.com/api";
}

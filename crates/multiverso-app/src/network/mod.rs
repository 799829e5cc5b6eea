//! Network operations
//!
//! HTTP client.

pub mod client;

// Re-export commonly used types
pub use client::HttpClient;

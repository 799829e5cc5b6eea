//! Multiverso App Services
//!
//! Character providers and networking utilities.
//! Depends on the `multiverso` favorites crate.

pub mod config;
pub mod error;
pub mod network;
pub mod providers;

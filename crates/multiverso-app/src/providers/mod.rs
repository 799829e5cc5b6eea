//! Character providers
//!
//! Remote sources of characters (the Rick and Morty API).

pub mod rick_and_morty;
pub mod traits;
pub mod types;

// Re-exports
pub use rick_and_morty::RickAndMortyProvider;
pub use traits::CharacterProvider;
pub use types::{Character, CharacterFilter, CharacterPage, CharacterStatus};

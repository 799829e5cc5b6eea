//! Character provider trait
//!
//! Defines the interface a remote character source must implement.

use multiverso::data::CharacterId;

use crate::error::Result;

use super::types::{Character, CharacterFilter, CharacterPage};

/// A source of character listings and details
pub trait CharacterProvider: Send + Sync {
    /// List one page of characters matching `filter` (pages start at 1)
    fn list_characters(&self, page: u32, filter: &CharacterFilter) -> Result<CharacterPage>;

    /// Look up a single character, `None` if it doesn't exist
    fn get_character(&self, id: CharacterId) -> Result<Option<Character>>;
}

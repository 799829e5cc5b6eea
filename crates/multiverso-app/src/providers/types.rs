//! Shared provider types
//!
//! Characters, result pages and list filters used across providers.

use multiverso::data::{CharacterId, FavoriteRecord};
use serde::Deserialize;
use std::fmt;

// =============================================================================
// Character
// =============================================================================

/// Life status reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CharacterStatus {
    Alive,
    Dead,
    #[default]
    #[serde(rename = "unknown")]
    #[serde(other)]
    Unknown,
}

impl CharacterStatus {
    /// Parse a user-supplied status, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "alive" => Some(Self::Alive),
            "dead" => Some(Self::Dead),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Value the API accepts in its `status` query parameter
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "unknown",
        };
        f.pad(s)
    }
}

/// A character with its full detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    /// Subspecies or variant, when the API reports one
    pub kind: Option<String>,
    pub gender: String,
    /// Origin location name
    pub origin: String,
    /// Last known location name
    pub location: String,
    /// Portrait URL
    pub image: String,
    /// Episode URLs in air order
    pub episodes: Vec<String>,
}

impl Character {
    /// Build the favorite record for this character
    pub fn snapshot(&self) -> FavoriteRecord {
        let mut record = FavoriteRecord::new(self.id).with_name(&self.name);
        if !self.species.is_empty() {
            record = record.with_species(&self.species);
        }
        if !self.image.is_empty() {
            record = record.with_image(&self.image);
        }
        record
    }

    /// Episode numbers, taken from the last path segment of each URL
    pub fn episode_numbers(&self) -> Vec<u32> {
        self.episodes
            .iter()
            .filter_map(|url| url.trim_end_matches('/').rsplit('/').next())
            .filter_map(|segment| segment.parse().ok())
            .collect()
    }
}

// =============================================================================
// CharacterPage
// =============================================================================

/// One page of a character listing
#[derive(Debug, Clone)]
pub struct CharacterPage {
    /// Characters in API order
    pub characters: Vec<Character>,
    /// Total number of characters (if the provider reports it)
    pub total: Option<usize>,
    /// Total number of pages (if the provider reports it)
    pub pages: Option<u32>,
    /// Whether more pages follow this one
    pub has_more: bool,
}

impl CharacterPage {
    /// Create an empty page
    pub fn empty() -> Self {
        Self {
            characters: Vec::new(),
            total: Some(0),
            pages: Some(0),
            has_more: false,
        }
    }
}

// =============================================================================
// CharacterFilter
// =============================================================================

/// Client-side filter for character lists
#[derive(Debug, Clone, Default)]
pub struct CharacterFilter {
    /// Search in name
    pub search: Option<String>,
    /// Exact species (case-insensitive)
    pub species: Option<String>,
    /// Life status
    pub status: Option<CharacterStatus>,
}

impl CharacterFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn status(mut self, status: CharacterStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether no criteria are set
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.species.is_none() && self.status.is_none()
    }

    /// Check if a character matches every set criterion
    pub fn matches(&self, character: &Character) -> bool {
        if let Some(ref search) = self.search {
            if !character.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }

        if let Some(ref species) = self.species {
            if !character.species.eq_ignore_ascii_case(species) {
                return false;
            }
        }

        if let Some(status) = self.status {
            if character.status != status {
                return false;
            }
        }

        true
    }

    /// Keep matching characters, preserving order
    pub fn apply<'a>(&self, characters: &'a [Character]) -> Vec<&'a Character> {
        characters.iter().filter(|c| self.matches(c)).collect()
    }
}

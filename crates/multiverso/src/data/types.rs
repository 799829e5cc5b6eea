//! Common data types for persistence
//!
//! Favorite records and the ordered collection that holds them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Remote character identifier
pub type CharacterId = u32;

// =============================================================================
// FavoriteRecord - A favorited character with its display snapshot
// =============================================================================

/// A favorited character
///
/// `id` is the remote character id and the dedup key. The remaining fields are
/// a snapshot cached at the time the favorite was added, so the favorites list
/// renders without fetching anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteRecord {
    /// Remote character id
    pub id: CharacterId,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Species (e.g., "Human", "Alien")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    /// Portrait URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl FavoriteRecord {
    /// Create a record carrying only the id
    pub fn new(id: CharacterId) -> Self {
        Self {
            id,
            name: None,
            species: None,
            image: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the species
    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    /// Set the portrait URL
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Name to show in lists, falling back to the id
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Character #{}", self.id),
        }
    }
}

// =============================================================================
// FavoritesCollection - Ordered, id-unique sequence of records
// =============================================================================

/// Ordered favorites, newest first, unique by id
///
/// Serializes as a plain JSON array. Deserializing drops any record whose id
/// was already seen, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FavoriteRecord>", into = "Vec<FavoriteRecord>")]
pub struct FavoritesCollection {
    records: Vec<FavoriteRecord>,
}

impl FavoritesCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from records, keeping the first record per id
    pub fn from_records(records: impl IntoIterator<Item = FavoriteRecord>) -> Self {
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .filter(|record| seen.insert(record.id))
            .collect();
        Self { records }
    }

    /// Check membership by id
    pub fn contains(&self, id: CharacterId) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Get a record by id
    pub fn get(&self, id: CharacterId) -> Option<&FavoriteRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Iterate records in display order
    pub fn iter(&self) -> std::slice::Iter<'_, FavoriteRecord> {
        self.records.iter()
    }

    /// Ids in display order
    pub fn ids(&self) -> Vec<CharacterId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Get number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert at the front unless the id is already present.
    /// Returns true if inserted.
    pub(crate) fn insert_front(&mut self, record: FavoriteRecord) -> bool {
        if self.contains(record.id) {
            return false;
        }
        self.records.insert(0, record);
        true
    }

    /// Remove by id, returning the removed record
    pub(crate) fn remove(&mut self, id: CharacterId) -> Option<FavoriteRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }
}

impl From<Vec<FavoriteRecord>> for FavoritesCollection {
    fn from(records: Vec<FavoriteRecord>) -> Self {
        Self::from_records(records)
    }
}

impl From<FavoritesCollection> for Vec<FavoriteRecord> {
    fn from(collection: FavoritesCollection) -> Self {
        collection.records
    }
}

impl<'a> IntoIterator for &'a FavoritesCollection {
    type Item = &'a FavoriteRecord;
    type IntoIter = std::slice::Iter<'a, FavoriteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

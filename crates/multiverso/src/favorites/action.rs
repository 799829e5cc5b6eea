//! Favorites actions and reducer
//!
//! `FavoriteAction` is the closed set of mutations the container accepts.
//! `reduce` applies one action to a collection and reports what changed.

use crate::data::types::{CharacterId, FavoriteRecord, FavoritesCollection};

/// A mutation of the favorites collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteAction {
    /// Replace everything (initial load)
    SetAll(FavoritesCollection),
    /// Remove if present, otherwise insert
    Toggle(FavoriteRecord),
    /// Insert unless already present
    Add(FavoriteRecord),
    /// Remove if present
    Remove(CharacterId),
}

/// What a reduced action did to the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Collection replaced wholesale
    Replaced,
    /// Record inserted
    Added(CharacterId),
    /// Record removed (returned to the caller)
    Removed(FavoriteRecord),
    /// Nothing changed
    Unchanged,
}

impl Outcome {
    /// Whether the collection differs from before the action
    pub fn changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }
}

/// Apply `action` to `state`
pub fn reduce(state: &mut FavoritesCollection, action: FavoriteAction) -> Outcome {
    match action {
        FavoriteAction::SetAll(collection) => {
            *state = collection;
            Outcome::Replaced
        }
        FavoriteAction::Toggle(record) => match state.remove(record.id) {
            Some(removed) => Outcome::Removed(removed),
            None => {
                let id = record.id;
                state.insert_front(record);
                Outcome::Added(id)
            }
        },
        FavoriteAction::Add(record) => {
            let id = record.id;
            if state.insert_front(record) {
                Outcome::Added(id)
            } else {
                Outcome::Unchanged
            }
        }
        FavoriteAction::Remove(id) => match state.remove(id) {
            Some(removed) => Outcome::Removed(removed),
            None => Outcome::Unchanged,
        },
    }
}

//! Rick and Morty API provider
//!
//! Implementation of `CharacterProvider` for the public Rick and Morty API
//! (<https://rickandmortyapi.com/>).

use crate::config::providers::RICK_AND_MORTY_DEFAULT_SERVER;
use crate::error::{AppError, Result};
use crate::network::HttpClient;

use super::traits::CharacterProvider;
use super::types::{Character, CharacterFilter, CharacterPage, CharacterStatus};

use multiverso::data::CharacterId;
use serde::Deserialize;
use tracing::debug;

// =============================================================================
// Internal API response types (serde)
// =============================================================================

#[derive(Debug, Deserialize)]
struct RmLocation {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RmCharacter {
    id: CharacterId,
    name: String,
    #[serde(default)]
    status: CharacterStatus,
    #[serde(default)]
    species: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    gender: String,
    origin: Option<RmLocation>,
    location: Option<RmLocation>,
    #[serde(default)]
    image: String,
    #[serde(default)]
    episode: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RmInfo {
    count: Option<usize>,
    pages: Option<u32>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RmPage {
    info: RmInfo,
    #[serde(default)]
    results: Vec<RmCharacter>,
}

// =============================================================================
// RmCharacter -> Character conversion
// =============================================================================

/// Convert an empty string to None
fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn location_name(location: Option<RmLocation>) -> String {
    location
        .and_then(|l| non_empty(&l.name))
        .unwrap_or_else(|| "unknown".to_string())
}

impl From<RmCharacter> for Character {
    fn from(rm: RmCharacter) -> Self {
        Character {
            id: rm.id,
            kind: non_empty(&rm.kind),
            name: rm.name,
            status: rm.status,
            species: rm.species,
            gender: rm.gender,
            origin: location_name(rm.origin),
            location: location_name(rm.location),
            image: rm.image,
            episodes: rm.episode,
        }
    }
}

impl From<RmPage> for CharacterPage {
    fn from(page: RmPage) -> Self {
        CharacterPage {
            has_more: page.info.next.is_some(),
            total: page.info.count,
            pages: page.info.pages,
            characters: page.results.into_iter().map(Character::from).collect(),
        }
    }
}

// =============================================================================
// RickAndMortyProvider
// =============================================================================

/// Rick and Morty API provider
pub struct RickAndMortyProvider {
    client: HttpClient,
    base_url: String,
}

impl RickAndMortyProvider {
    /// Create a provider using the default server
    pub fn new() -> Result<Self> {
        Self::with_base_url(RICK_AND_MORTY_DEFAULT_SERVER)
    }

    /// Create a provider with a custom base URL (for testing or mirrors)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a full API URL from an endpoint path
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Query parameters for a filtered listing page
fn character_query(page: u32, filter: &CharacterFilter) -> Vec<(&'static str, String)> {
    let mut query = vec![("page", page.to_string())];
    if let Some(search) = filter.search.as_deref().and_then(non_empty) {
        query.push(("name", search));
    }
    if let Some(species) = filter.species.as_deref().and_then(non_empty) {
        query.push(("species", species));
    }
    if let Some(status) = filter.status {
        query.push(("status", status.api_name().to_string()));
    }
    query
}

impl CharacterProvider for RickAndMortyProvider {
    fn list_characters(&self, page: u32, filter: &CharacterFilter) -> Result<CharacterPage> {
        if page == 0 {
            return Err(AppError::Api("pages start at 1".to_string()));
        }
        // The API answers 404 for pages past the end and for filters with no match
        let url = self.url("/character");
        let query = character_query(page, filter);
        match self.client.get_json_opt::<RmPage>(&url, &query)? {
            Some(rm_page) => {
                let page = CharacterPage::from(rm_page);
                debug!(count = page.characters.len(), has_more = page.has_more, "listed characters");
                Ok(page)
            }
            None => Ok(CharacterPage::empty()),
        }
    }

    fn get_character(&self, id: CharacterId) -> Result<Option<Character>> {
        let url = self.url(&format!("/character/{}", id));
        let rm_character: Option<RmCharacter> = self.client.get_json_opt(&url, &[])?;
        Ok(rm_character.map(Character::from))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RICK_JSON: &str = r#"{
        "id": 1,
        "name": "Rick Sanchez",
        "status": "Alive",
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": { "name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1" },
        "location": { "name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3" },
        "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
        "episode": [
            "https://rickandmortyapi.com/api/episode/1",
            "https://rickandmortyapi.com/api/episode/2"
        ],
        "url": "https://rickandmortyapi.com/api/character/1",
        "created": "2017-11-04T18:48:46.250Z"
    }"#;

    fn parse_character(json: &str) -> Character {
        let rm: RmCharacter = serde_json::from_str(json).unwrap();
        rm.into()
    }

    #[test]
    fn test_character_conversion_basic() {
        let character = parse_character(RICK_JSON);
        assert_eq!(character.id, 1);
        assert_eq!(character.name, "Rick Sanchez");
        assert_eq!(character.status, CharacterStatus::Alive);
        assert_eq!(character.species, "Human");
        assert_eq!(character.gender, "Male");
    }

    #[test]
    fn test_character_empty_type_is_none() {
        assert_eq!(parse_character(RICK_JSON).kind, None);
    }

    #[test]
    fn test_character_type_present() {
        let character = parse_character(
            r#"{"id": 47, "name": "Birdperson", "status": "Dead", "species": "Alien", "type": "Bird-Person"}"#,
        );
        assert_eq!(character.kind.as_deref(), Some("Bird-Person"));
        assert_eq!(character.status, CharacterStatus::Dead);
    }

    #[test]
    fn test_character_locations() {
        let character = parse_character(RICK_JSON);
        assert_eq!(character.origin, "Earth (C-137)");
        assert_eq!(character.location, "Citadel of Ricks");
    }

    #[test]
    fn test_character_missing_locations_are_unknown() {
        let character = parse_character(r#"{"id": 9, "name": "Agency Director"}"#);
        assert_eq!(character.origin, "unknown");
        assert_eq!(character.location, "unknown");
        assert_eq!(character.status, CharacterStatus::Unknown);
        assert!(character.episodes.is_empty());
    }

    #[test]
    fn test_character_episodes_in_order() {
        let character = parse_character(RICK_JSON);
        assert_eq!(character.episode_numbers(), vec![1, 2]);
    }

    #[test]
    fn test_page_conversion() {
        let json = format!(
            r#"{{"info": {{"count": 826, "pages": 42, "next": "https://rickandmortyapi.com/api/character?page=2", "prev": null}}, "results": [{}]}}"#,
            RICK_JSON
        );
        let rm: RmPage = serde_json::from_str(&json).unwrap();
        let page = CharacterPage::from(rm);
        assert_eq!(page.total, Some(826));
        assert_eq!(page.pages, Some(42));
        assert!(page.has_more);
        assert_eq!(page.characters.len(), 1);
    }

    #[test]
    fn test_last_page_has_no_more() {
        let json = r#"{"info": {"count": 826, "pages": 42, "next": null, "prev": "x"}, "results": []}"#;
        let rm: RmPage = serde_json::from_str(json).unwrap();
        assert!(!CharacterPage::from(rm).has_more);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("Human"), Some("Human".to_string()));
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("   "), None);
    }

    #[test]
    fn test_provider_creation() {
        let provider = RickAndMortyProvider::new().unwrap();
        assert_eq!(provider.base_url, RICK_AND_MORTY_DEFAULT_SERVER);
    }

    #[test]
    fn test_provider_with_custom_base_url() {
        let provider = RickAndMortyProvider::with_base_url("http://localhost:8080/api/").unwrap();
        assert_eq!(provider.url("/character/1"), "http://localhost:8080/api/character/1");
    }

    #[test]
    fn test_query_page_only_without_filter() {
        let query = character_query(2, &CharacterFilter::new());
        assert_eq!(query, vec![("page", "2".to_string())]);
    }

    #[test]
    fn test_query_carries_filter() {
        let filter = CharacterFilter::new()
            .search("Morty")
            .species("Human")
            .status(CharacterStatus::Alive);
        let query = character_query(1, &filter);
        assert_eq!(
            query,
            vec![
                ("page", "1".to_string()),
                ("name", "Morty".to_string()),
                ("species", "Human".to_string()),
                ("status", "alive".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_skips_blank_search() {
        let query = character_query(1, &CharacterFilter::new().search("  "));
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_page_zero_rejected() {
        let provider = RickAndMortyProvider::new().unwrap();
        assert!(provider.list_characters(0, &CharacterFilter::new()).is_err());
    }
}

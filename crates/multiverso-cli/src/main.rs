//! Multiverso CLI — browse characters and keep favorites

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use multiverso::data::{CharacterId, FavoriteRecord, FileStore};
use multiverso::favorites::{default_flush_timeout, FavoritesStore, Toggled};
use multiverso_app::error::AppError;
use multiverso_app::providers::{
    Character, CharacterFilter, CharacterProvider, CharacterStatus, RickAndMortyProvider,
};

/// How long to wait for stored favorites before giving up
const READY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "multiverso", about = "Browse Rick and Morty characters and keep favorites", version)]
struct Cli {
    /// Directory holding favorites (defaults to the platform config dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List characters, marking favorites
    Characters {
        /// Page number (starts at 1)
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Only names containing this text
        #[arg(long)]
        search: Option<String>,
        /// Only this species
        #[arg(long)]
        species: Option<String>,
        /// Only this status (alive, dead, unknown)
        #[arg(long, value_parser = parse_status)]
        status: Option<CharacterStatus>,
    },
    /// Show a character's detail
    Show { id: CharacterId },
    /// Toggle a character's favorite status
    Toggle { id: CharacterId },
    /// Mark a character as favorite
    Add { id: CharacterId },
    /// Unmark a favorite
    Remove { id: CharacterId },
    /// List favorites (works offline)
    Favorites,
}

fn parse_status(s: &str) -> Result<CharacterStatus, String> {
    CharacterStatus::parse(s).ok_or_else(|| format!("unknown status '{s}' (expected alive, dead or unknown)"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut favorites = open_favorites(cli.data_dir.clone())?;

    match cli.command {
        Command::Characters {
            page,
            search,
            species,
            status,
        } => {
            let provider = provider(cli.api_url.as_deref())?;

            let mut filter = CharacterFilter::new();
            filter.search = search;
            filter.species = species;
            filter.status = status;

            // The server matches species loosely; keep only exact matches
            let listing = provider.list_characters(page, &filter)?;
            let shown = filter.apply(&listing.characters);
            if shown.is_empty() {
                if filter.is_empty() {
                    println!("No characters on page {page}.");
                } else {
                    println!("No matching characters on page {page}.");
                }
            }
            for character in shown {
                print_summary(character, favorites.is_favorite(character.id));
            }
            if let (Some(pages), Some(total), true) = (listing.pages, listing.total, listing.has_more) {
                println!("-- page {page} of {pages} ({total} characters), next: --page {}", page + 1);
            }
        }
        Command::Show { id } => {
            let provider = provider(cli.api_url.as_deref())?;
            let character = fetch(provider.as_ref(), id)?;
            print_detail(&character, favorites.is_favorite(id));
        }
        Command::Toggle { id } => {
            // Removing needs no snapshot, so only fetch when adding
            let record = if favorites.is_favorite(id) {
                FavoriteRecord::new(id)
            } else {
                let provider = provider(cli.api_url.as_deref())?;
                fetch(provider.as_ref(), id)?.snapshot()
            };
            let label = favorites
                .get(id)
                .map(FavoriteRecord::display_name)
                .unwrap_or_else(|| record.display_name());

            match favorites.toggle(record)? {
                Toggled::Added => println!("★ Added {label} (#{id})"),
                Toggled::Removed => println!("☆ Removed {label} (#{id})"),
            }
        }
        Command::Add { id } => {
            if favorites.is_favorite(id) {
                println!("#{id} is already a favorite");
            } else {
                let provider = provider(cli.api_url.as_deref())?;
                let record = fetch(provider.as_ref(), id)?.snapshot();
                let label = record.display_name();
                favorites.add(record)?;
                println!("★ Added {label} (#{id})");
            }
        }
        Command::Remove { id } => match favorites.remove(id)? {
            Some(record) => println!("☆ Removed {} (#{id})", record.display_name()),
            None => println!("#{id} is not a favorite"),
        },
        Command::Favorites => {
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for record in favorites.list() {
                println!(
                    "★ {:>4}  {:<32} {}",
                    record.id,
                    record.display_name(),
                    record.species.as_deref().unwrap_or("-")
                );
            }
        }
    }

    if !favorites.flush(default_flush_timeout()) {
        eprintln!("Warning: favorites may not have been saved");
    }
    Ok(())
}

fn open_favorites(data_dir: Option<PathBuf>) -> Result<FavoritesStore, Box<dyn std::error::Error>> {
    let store = match data_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::open_default()?,
    };
    tracing::debug!(dir = ?store.dir(), "opening favorites");
    let mut favorites = FavoritesStore::open(store);
    if !favorites.wait_ready(READY_TIMEOUT) {
        return Err("timed out loading favorites".into());
    }
    Ok(favorites)
}

fn provider(api_url: Option<&str>) -> Result<Box<dyn CharacterProvider>, AppError> {
    let provider = match api_url {
        Some(url) => RickAndMortyProvider::with_base_url(url)?,
        None => RickAndMortyProvider::new()?,
    };
    Ok(Box::new(provider))
}

fn fetch(provider: &dyn CharacterProvider, id: CharacterId) -> Result<Character, AppError> {
    provider
        .get_character(id)?
        .ok_or_else(|| AppError::NotFound(format!("character #{id}")))
}

fn print_summary(character: &Character, favorite: bool) {
    let marker = if favorite { "★" } else { " " };
    println!(
        "{marker} {:>4}  {:<32} {:<12} {}",
        character.id, character.name, character.species, character.status
    );
}

fn print_detail(character: &Character, favorite: bool) {
    let marker = if favorite { " ★" } else { "" };
    println!("{}{marker}", character.name);
    println!("  Species:   {}", character.species);
    if let Some(kind) = &character.kind {
        println!("  Type:      {kind}");
    }
    println!("  Status:    {}", character.status);
    println!("  Gender:    {}", character.gender);
    println!("  Origin:    {}", character.origin);
    println!("  Location:  {}", character.location);
    println!("  Image:     {}", character.image);

    let episodes: Vec<String> = character
        .episode_numbers()
        .iter()
        .map(|n| n.to_string())
        .collect();
    println!("  Episodes ({}): {}", episodes.len(), episodes.join(", "));
}

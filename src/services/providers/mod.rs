/// External service provider abstractions
///
/// Two collaborators live behind traits here: the game storefront (owned
/// games, metadata, vanity resolution, search, news) and the text-generation
/// service used for recommendations. Handlers and services depend on the
/// traits only, so tests can substitute doubles without touching the network.
use crate::{
    error::AppResult,
    models::{GameDetails, NewsItem, ObservedGame, SearchHit},
};

pub mod gemini;
pub mod steam;

/// Trait for the game storefront
///
/// Every operation is degrade-friendly by contract: a non-200 response or a
/// malformed payload must surface as a recoverable error (or a placeholder
/// value), never a panic, so batch callers can fall back per item.
#[async_trait::async_trait]
pub trait StorefrontProvider: Send + Sync {
    /// Fetch the owned-game list for an external profile id
    ///
    /// Returns (app id, name, cumulative playtime minutes) per game. An empty
    /// list is a valid response (private or empty library).
    async fn fetch_owned_games(&self, steam_id: &str) -> AppResult<Vec<ObservedGame>>;

    /// Fetch descriptive metadata (genres, cover, store link, description)
    /// for a single app id
    ///
    /// Fields missing from the payload come back as placeholders; only a
    /// transport-level failure is an error.
    async fn fetch_game_details(&self, app_id: &str, fallback_name: &str)
        -> AppResult<GameDetails>;

    /// Resolve a human-readable vanity alias to a canonical profile id
    ///
    /// Absence of a mapping is a `NotFound`, which callers surface as a
    /// user-visible, recoverable error.
    async fn resolve_vanity(&self, alias: &str) -> AppResult<String>;

    /// Search the storefront catalog by name
    async fn search_games(&self, term: &str) -> AppResult<Vec<SearchHit>>;

    /// Fetch recent news articles for an app id
    async fn fetch_game_news(&self, app_id: &str, count: u32) -> AppResult<Vec<NewsItem>>;
}

/// Trait for the text-generation service
///
/// A black box by design: prompt in, free-form text out. No schema is
/// enforced by the provider, which is why the recommendation parser exists.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a completion for the given prompt
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

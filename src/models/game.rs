use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback cover image used when the storefront lookup fails or the
/// payload carries no header image.
pub const PLACEHOLDER_COVER_URL: &str = "https://via.placeholder.com/150";

/// Genre tag for games whose metadata lookup failed.
pub const UNKNOWN_GENRES: &str = "Unknown";

/// A mirrored row of an account's owned-game list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct OwnedGame {
    pub id: i64,
    pub steam_app_id: String,
    pub user_id: i64,
    pub steam_id: Option<String>,
    pub name: String,
    pub playtime_minutes: i64,
    pub genres: String,
    pub cover_url: Option<String>,
    pub store_url: Option<String>,
    pub last_synced_at: DateTime<Utc>,
}

/// One game as reported by the storefront's owned-games endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedGame {
    pub app_id: String,
    pub name: String,
    pub playtime_minutes: i64,
}

/// Descriptive metadata for a single game from the storefront
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameDetails {
    pub name: String,
    pub genres: String,
    pub cover_url: String,
    pub store_url: String,
    pub description: String,
}

impl GameDetails {
    /// Placeholder metadata for a game whose lookup failed
    ///
    /// Syncs must not abort because one lookup failed; the affected game
    /// is stored with these defaults instead.
    pub fn placeholder(app_id: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            genres: UNKNOWN_GENRES.to_string(),
            cover_url: PLACEHOLDER_COVER_URL.to_string(),
            store_url: format!("https://store.steampowered.com/app/{}", app_id),
            description: "No description available.".to_string(),
        }
    }
}

/// A storefront search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub app_id: String,
    pub name: String,
    pub cover_url: Option<String>,
}

/// A news article for a game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub contents: String,
}

// ============================================================================
// Steam Web API wire types
// ============================================================================

/// Envelope of GET /IPlayerService/GetOwnedGames/v1/
#[derive(Debug, Deserialize)]
pub struct ApiOwnedGamesEnvelope {
    pub response: ApiOwnedGamesResponse,
}

#[derive(Debug, Deserialize)]
pub struct ApiOwnedGamesResponse {
    #[serde(default)]
    pub games: Vec<ApiOwnedGame>,
}

#[derive(Debug, Deserialize)]
pub struct ApiOwnedGame {
    pub appid: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub playtime_forever: i64,
}

impl From<ApiOwnedGame> for ObservedGame {
    fn from(game: ApiOwnedGame) -> Self {
        let app_id = game.appid.to_string();
        let name = game.name.unwrap_or_else(|| format!("App {}", app_id));
        ObservedGame {
            app_id,
            name,
            playtime_minutes: game.playtime_forever,
        }
    }
}

/// Envelope of GET /ISteamUser/ResolveVanityURL/v1/
#[derive(Debug, Deserialize)]
pub struct ApiVanityEnvelope {
    pub response: ApiVanityResponse,
}

#[derive(Debug, Deserialize)]
pub struct ApiVanityResponse {
    pub success: i32,
    #[serde(default)]
    pub steamid: Option<String>,
}

/// Envelope of GET /ISteamNews/GetNewsForApp/v2/
#[derive(Debug, Deserialize)]
pub struct ApiNewsEnvelope {
    pub appnews: ApiNewsResponse,
}

#[derive(Debug, Deserialize)]
pub struct ApiNewsResponse {
    #[serde(default)]
    pub newsitems: Vec<ApiNewsItem>,
}

#[derive(Debug, Deserialize)]
pub struct ApiNewsItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub contents: String,
}

impl From<ApiNewsItem> for NewsItem {
    fn from(item: ApiNewsItem) -> Self {
        NewsItem {
            title: item.title,
            url: item.url,
            contents: item.contents,
        }
    }
}

/// One item of GET /api/storesearch/ from the storefront
#[derive(Debug, Deserialize)]
pub struct ApiStoreSearchItem {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub tiny_image: Option<String>,
}

impl From<ApiStoreSearchItem> for SearchHit {
    fn from(item: ApiStoreSearchItem) -> Self {
        SearchHit {
            app_id: item.id.to_string(),
            name: item.name,
            cover_url: item.tiny_image,
        }
    }
}

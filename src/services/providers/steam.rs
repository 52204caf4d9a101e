/// Steam storefront provider
///
/// Talks to two hosts: the Steam Web API (owned games, vanity resolution,
/// news) and the storefront API (app details, store search). The Web API
/// needs a key; the storefront endpoints are unauthenticated.
///
/// Metadata and vanity lookups are cached in Redis -- already-seen games
/// incur no storefront call on subsequent syncs.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        game::{
            ApiNewsEnvelope, ApiOwnedGamesEnvelope, ApiStoreSearchItem, ApiVanityEnvelope,
            PLACEHOLDER_COVER_URL, UNKNOWN_GENRES,
        },
        GameDetails, NewsItem, ObservedGame, SearchHit,
    },
    services::providers::StorefrontProvider,
};

const DETAILS_CACHE_TTL: u64 = 86400; // 1 day
const VANITY_CACHE_TTL: u64 = 604800; // 1 week

#[derive(Clone)]
pub struct SteamProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    store_url: String,
    cache: Cache,
}

impl SteamProvider {
    /// Creates a new Steam provider
    ///
    /// The HTTP client carries an explicit request timeout; an expired call
    /// surfaces as a recoverable error that batch callers turn into
    /// placeholder data.
    pub fn new(
        cache: Cache,
        api_key: String,
        api_url: String,
        store_url: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            store_url,
            cache,
        })
    }

    /// Fetches app details from the storefront, uncached
    async fn fetch_details_from_store(
        &self,
        app_id: &str,
        fallback_name: &str,
    ) -> AppResult<GameDetails> {
        let url = format!("{}/api/appdetails", self.store_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("appids", app_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Storefront returned status {} for app {}",
                status, app_id
            )));
        }

        // The payload is keyed by the app id itself:
        // { "<appid>": { "success": bool, "data": { ... } } }
        let payload: serde_json::Value = response.json().await?;
        let store_url = format!("https://store.steampowered.com/app/{}", app_id);
        let data = &payload[app_id]["data"];

        if !payload[app_id]["success"].as_bool().unwrap_or(false) || data.is_null() {
            // Known app id with no retrievable details; report what we know.
            return Ok(GameDetails::placeholder(app_id, fallback_name));
        }

        let genres = data["genres"]
            .as_array()
            .map(|genres| {
                genres
                    .iter()
                    .filter_map(|g| g["description"].as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|joined| !joined.is_empty())
            .unwrap_or_else(|| UNKNOWN_GENRES.to_string());

        Ok(GameDetails {
            name: data["name"]
                .as_str()
                .unwrap_or(fallback_name)
                .to_string(),
            genres,
            cover_url: data["header_image"]
                .as_str()
                .unwrap_or(PLACEHOLDER_COVER_URL)
                .to_string(),
            store_url,
            description: data["short_description"]
                .as_str()
                .unwrap_or("No description available.")
                .to_string(),
        })
    }
}

#[async_trait::async_trait]
impl StorefrontProvider for SteamProvider {
    async fn fetch_owned_games(&self, steam_id: &str) -> AppResult<Vec<ObservedGame>> {
        let url = format!("{}/IPlayerService/GetOwnedGames/v1/", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", steam_id),
                ("include_appinfo", "true"),
                ("include_played_free_games", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Steam API returned status {} fetching owned games",
                status
            )));
        }

        let envelope: ApiOwnedGamesEnvelope = response.json().await?;
        let games: Vec<ObservedGame> = envelope
            .response
            .games
            .into_iter()
            .map(ObservedGame::from)
            .collect();

        tracing::info!(
            steam_id = %steam_id,
            count = games.len(),
            "Fetched owned games from Steam"
        );

        Ok(games)
    }

    async fn fetch_game_details(
        &self,
        app_id: &str,
        fallback_name: &str,
    ) -> AppResult<GameDetails> {
        cached!(
            self.cache,
            CacheKey::GameDetails(app_id.to_string()),
            DETAILS_CACHE_TTL,
            async move {
                let details = self.fetch_details_from_store(app_id, fallback_name).await?;

                tracing::debug!(app_id = %app_id, genres = %details.genres, "Fetched app details");

                Ok::<_, AppError>(details)
            }
        )
    }

    async fn resolve_vanity(&self, alias: &str) -> AppResult<String> {
        if alias.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Vanity alias cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::VanityAlias(alias.to_string()),
            VANITY_CACHE_TTL,
            async move {
                let url = format!("{}/ISteamUser/ResolveVanityURL/v1/", self.api_url);

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[("key", self.api_key.as_str()), ("vanityurl", alias)])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    return Err(AppError::ExternalApi(format!(
                        "Steam API returned status {} resolving vanity alias",
                        status
                    )));
                }

                let envelope: ApiVanityEnvelope = response.json().await?;

                // success == 1 means the alias mapped to a profile id;
                // anything else is "no such alias", a recoverable miss.
                match (envelope.response.success, envelope.response.steamid) {
                    (1, Some(steamid)) => Ok(steamid),
                    _ => Err(AppError::NotFound(format!(
                        "No profile found for vanity alias '{}'",
                        alias
                    ))),
                }
            }
        )
    }

    async fn search_games(&self, term: &str) -> AppResult<Vec<SearchHit>> {
        if term.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search term cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/api/storesearch/", self.store_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("term", term), ("cc", "us"), ("l", "en")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Storefront search returned status {}",
                status
            )));
        }

        let payload: serde_json::Value = response.json().await?;
        let items = payload["items"].as_array().cloned().unwrap_or_default();

        let hits: Vec<SearchHit> = items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value::<ApiStoreSearchItem>(item)
                    .map(SearchHit::from)
                    .ok()
            })
            .collect();

        tracing::info!(term = %term, results = hits.len(), "Store search completed");

        Ok(hits)
    }

    async fn fetch_game_news(&self, app_id: &str, count: u32) -> AppResult<Vec<NewsItem>> {
        let url = format!("{}/ISteamNews/GetNewsForApp/v2/", self.api_url);
        let count = count.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("appid", app_id),
                ("count", count.as_str()),
                ("maxlength", "300"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Steam news returned status {} for app {}",
                status, app_id
            )));
        }

        let envelope: ApiNewsEnvelope = response.json().await?;
        let items = envelope
            .appnews
            .newsitems
            .into_iter()
            .map(NewsItem::from)
            .collect();

        Ok(items)
    }
}

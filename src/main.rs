use std::sync::Arc;
use std::time::Duration;

use backlog_api::{
    config::Config,
    db,
    services::providers::{gemini::GeminiProvider, steam::SteamProvider},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backlog_api=info,tower_http=debug".into()),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let timeout = Duration::from_secs(config.http_timeout_secs);

    // Database
    let pool = db::create_pool(&config.database_url).await?;
    db::init_schema(&pool).await?;
    tracing::info!(database_url = %config.database_url, "Database ready");

    // Cache
    let (cache, _cache_writer) = db::Cache::connect(&config.redis_url)?;

    // External providers
    let storefront = SteamProvider::new(
        cache.clone(),
        config.steam_api_key.clone(),
        config.steam_api_url.clone(),
        config.steam_store_url.clone(),
        timeout,
    )?;
    let generator = GeminiProvider::new(
        config.genai_api_key.clone(),
        config.genai_api_url.clone(),
        config.genai_model.clone(),
        timeout,
    )?;

    // Application state and router
    let state = AppState::new(pool, cache, Arc::new(storefront), Arc::new(generator));
    let app = backlog_api::create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");

    axum::serve(listener, app).await?;

    Ok(())
}

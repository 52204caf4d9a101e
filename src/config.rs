use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Steam Web API key
    pub steam_api_key: String,

    /// Steam Web API base URL
    #[serde(default = "default_steam_api_url")]
    pub steam_api_url: String,

    /// Steam storefront base URL (app details, store search)
    #[serde(default = "default_steam_store_url")]
    pub steam_store_url: String,

    /// Generative Language API key
    pub genai_api_key: String,

    /// Generative Language API base URL
    #[serde(default = "default_genai_api_url")]
    pub genai_api_url: String,

    /// Model used for recommendation generation
    #[serde(default = "default_genai_model")]
    pub genai_model: String,

    /// Timeout applied to every outbound HTTP request, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_url() -> String {
    "sqlite://backlog.db".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_steam_api_url() -> String {
    "https://api.steampowered.com".to_string()
}

fn default_steam_store_url() -> String {
    "https://store.steampowered.com".to_string()
}

fn default_genai_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_genai_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

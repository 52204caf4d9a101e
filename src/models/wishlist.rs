use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A wishlist row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct WishlistEntry {
    pub id: i64,
    pub user_id: i64,
    pub steam_app_id: String,
    pub game_name: String,
    pub cover_url: Option<String>,
    pub store_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

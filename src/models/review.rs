use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored review row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Review {
    pub review_id: i64,
    pub user_id: i64,
    pub game_id: i64,
    pub review_text: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

/// A review joined with its game's display name, as listed to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ReviewWithGame {
    pub review_id: i64,
    pub game_name: String,
    pub review_text: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

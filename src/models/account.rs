use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account
///
/// The password hash and salt never leave the persistence layer; this struct
/// is what the rest of the application sees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub user_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Association of an external storefront identity with an account
///
/// One account may link several storefront profiles; each may carry a
/// user-chosen display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct LinkedProfile {
    pub id: i64,
    pub user_id: i64,
    pub steam_id: String,
    pub label: Option<String>,
}

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::Cache;
use crate::models::Account;
use crate::services::providers::{StorefrontProvider, TextGenerator};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub cache: Cache,
    pub storefront: Arc<dyn StorefrontProvider>,
    pub generator: Arc<dyn TextGenerator>,
    sessions: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
}

/// The logged-in account behind a request
///
/// Created on login, destroyed on logout, resolved per-request by the
/// session middleware. Nothing about the session lives in process globals.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: Uuid,
    pub user_id: i64,
    pub username: String,
}

impl AppState {
    /// Creates the application state around its collaborators
    pub fn new(
        pool: SqlitePool,
        cache: Cache,
        storefront: Arc<dyn StorefrontProvider>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            pool,
            cache,
            storefront,
            generator,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Mints a session token for an authenticated account
    pub async fn create_session(&self, account: &Account) -> Uuid {
        let token = Uuid::new_v4();
        let context = SessionContext {
            token,
            user_id: account.user_id,
            username: account.username.clone(),
        };

        self.sessions.write().await.insert(token, context);
        token
    }

    /// Looks a session token up
    pub async fn resolve_session(&self, token: Uuid) -> Option<SessionContext> {
        self.sessions.read().await.get(&token).cloned()
    }

    /// Tears a session down; returns false when the token was unknown
    pub async fn destroy_session(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }
}

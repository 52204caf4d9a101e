use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::Account,
    services::accounts,
    state::{AppState, SessionContext},
};

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user_id: i64,
    pub username: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.user_id,
            username: account.username.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub user_id: i64,
    pub username: String,
}

// Handlers

/// Creates a new account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    let account = accounts::register(&state.pool, &request.username, &request.password).await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

/// Authenticates a login attempt and opens a session
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let account = accounts::authenticate(&state.pool, &request.username, &request.password).await?;
    let token = state.create_session(&account).await;

    tracing::info!(username = %account.username, "Session opened");

    Ok(Json(LoginResponse {
        token,
        user_id: account.user_id,
        username: account.username,
    }))
}

/// Tears the current session down
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> StatusCode {
    state.destroy_session(session.token).await;
    tracing::info!(username = %session.username, "Session closed");

    StatusCode::NO_CONTENT
}

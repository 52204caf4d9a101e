use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::WishlistEntry,
    services::wishlist::{self, WishlistOutcome},
    state::{AppState, SessionContext},
};

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct AddWishlistRequest {
    pub app_id: String,
    pub game_name: String,
    pub cover_url: Option<String>,
    pub store_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddWishlistResponse {
    pub outcome: WishlistOutcome,
}

// Handlers

/// Adds a game to the wishlist; re-adding reports `already_present`
pub async fn add(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<AddWishlistRequest>,
) -> AppResult<(StatusCode, Json<AddWishlistResponse>)> {
    let outcome = wishlist::add_to_wishlist(
        &state.pool,
        session.user_id,
        &request.app_id,
        &request.game_name,
        request.cover_url.as_deref(),
        request.store_url.as_deref(),
    )
    .await?;

    let status = match outcome {
        WishlistOutcome::Added => StatusCode::CREATED,
        WishlistOutcome::AlreadyPresent => StatusCode::OK,
    };

    Ok((status, Json(AddWishlistResponse { outcome })))
}

/// Lists the account's wishlist
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> AppResult<Json<Vec<WishlistEntry>>> {
    let entries = wishlist::list_wishlist(&state.pool, session.user_id).await?;
    Ok(Json(entries))
}

/// Removes a game from the wishlist; removing an absent entry is a no-op
pub async fn remove(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(app_id): Path<String>,
) -> AppResult<StatusCode> {
    wishlist::remove_from_wishlist(&state.pool, session.user_id, &app_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

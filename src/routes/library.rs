use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{LinkedProfile, OwnedGame},
    services::library::{self, SyncOutcome},
    state::{AppState, SessionContext},
};

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    /// Profile URL, bare numeric id, or vanity alias
    pub profile: String,
    /// Optional display label stored with the linked profile
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub steam_id: String,
    pub fetched: usize,
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

#[derive(Debug, Deserialize)]
pub struct GamesQuery {
    pub steam_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    pub steam_id: String,
    pub label: String,
}

// Handlers

/// Fetches the owned games of a storefront profile and mirrors them
///
/// The profile field accepts whatever the user pasted; vanity aliases are
/// resolved first. The storefront being down is a 502; a single game's
/// failed metadata lookup only degrades that game.
pub async fn sync(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<SyncRequest>,
) -> AppResult<Json<SyncResponse>> {
    let steam_id =
        library::resolve_profile_input(state.storefront.as_ref(), &request.profile).await?;

    let observed = state.storefront.fetch_owned_games(&steam_id).await?;
    let fetched = observed.len();

    library::link_profile(&state.pool, session.user_id, &steam_id).await?;
    if let Some(label) = &request.label {
        library::label_profile(&state.pool, session.user_id, &steam_id, label).await?;
    }

    let outcome = library::sync_owned_games(
        &state.pool,
        state.storefront.as_ref(),
        session.user_id,
        &steam_id,
        observed,
    )
    .await?;

    Ok(Json(SyncResponse {
        steam_id,
        fetched,
        outcome,
    }))
}

/// Lists the mirrored games of one linked profile
pub async fn games(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<GamesQuery>,
) -> AppResult<Json<Vec<OwnedGame>>> {
    let games = library::list_games(&state.pool, session.user_id, &query.steam_id).await?;
    Ok(Json(games))
}

/// Lists the storefront profiles linked to the account
pub async fn profiles(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> AppResult<Json<Vec<LinkedProfile>>> {
    let profiles = library::list_profiles(&state.pool, session.user_id).await?;
    Ok(Json(profiles))
}

/// Sets the display label of a linked profile
pub async fn label(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<LabelRequest>,
) -> AppResult<StatusCode> {
    library::label_profile(&state.pool, session.user_id, &request.steam_id, &request.label)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

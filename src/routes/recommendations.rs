use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::Recommendation,
    services::recommendations,
    state::{AppState, SessionContext},
};

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub limit: Option<usize>,
}

/// Returns the account's recommendations, generating them on first read
///
/// Served from the per-account cache entry when one exists; the response
/// always contains at least one record (possibly a sentinel).
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<RecommendationsQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let records = recommendations::cached_recommendations(
        &state.pool,
        state.generator.as_ref(),
        &state.cache,
        session.user_id,
        query.limit.unwrap_or(DEFAULT_LIMIT),
    )
    .await?;

    Ok(Json(records))
}

/// Invalidates the cached entry and regenerates
pub async fn refresh(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<RecommendationsQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    recommendations::invalidate_cached(&state.cache, session.user_id).await;

    let records = recommendations::cached_recommendations(
        &state.pool,
        state.generator.as_ref(),
        &state.cache,
        session.user_id,
        query.limit.unwrap_or(DEFAULT_LIMIT),
    )
    .await?;

    Ok(Json(records))
}

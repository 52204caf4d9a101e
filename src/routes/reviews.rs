use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{Review, ReviewWithGame},
    services::reviews,
    state::{AppState, SessionContext},
};

// Request types

#[derive(Debug, Deserialize)]
pub struct UpsertReviewRequest {
    pub app_id: String,
    pub game_name: String,
    pub review_text: String,
    pub rating: i64,
}

// Handlers

/// Creates or overwrites the account's review for a game
pub async fn upsert(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<UpsertReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = reviews::upsert_review(
        &state.pool,
        session.user_id,
        &request.app_id,
        &request.game_name,
        &request.review_text,
        request.rating,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// Lists the account's reviews, most recent first
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> AppResult<Json<Vec<ReviewWithGame>>> {
    let rows = reviews::list_reviews(&state.pool, session.user_id).await?;
    Ok(Json(rows))
}

/// Deletes a review by id
pub async fn remove(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
) -> AppResult<StatusCode> {
    reviews::delete_review(&state.pool, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

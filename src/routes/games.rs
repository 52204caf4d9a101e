use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{NewsItem, SearchHit},
    state::AppState,
};

const DEFAULT_NEWS_COUNT: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    count: Option<u32>,
}

/// Handler for storefront catalog search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<SearchHit>>> {
    let hits = state.storefront.search_games(&params.q).await?;
    Ok(Json(hits))
}

/// Handler for recent news of a game
///
/// A failed news fetch degrades to an empty list; news is decoration, not
/// data the caller depends on.
pub async fn news(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
    Query(params): Query<NewsQuery>,
) -> AppResult<Json<Vec<NewsItem>>> {
    let count = params.count.unwrap_or(DEFAULT_NEWS_COUNT);

    let items = match state.storefront.fetch_game_news(&app_id, count).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(app_id = %app_id, error = %e, "News fetch failed");
            Vec::new()
        }
    };

    Ok(Json(items))
}

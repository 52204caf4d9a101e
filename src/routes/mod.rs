use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod games;
pub mod library;
pub mod recommendations;
pub mod reviews;
pub mod wishlist;

use crate::middleware::require_session;
use crate::state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/games/search", get(games::search))
        .route("/games/:app_id/news", get(games::news));

    // Everything below requires a live session.
    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/library/sync", post(library::sync))
        .route("/library/games", get(library::games))
        .route("/library/profiles", get(library::profiles))
        .route("/library/profiles/label", put(library::label))
        .route("/reviews", get(reviews::list).post(reviews::upsert))
        .route("/reviews/:review_id", delete(reviews::remove))
        .route("/wishlist", get(wishlist::list).post(wishlist::add))
        .route("/wishlist/:app_id", delete(wishlist::remove))
        .route("/recommendations", get(recommendations::list))
        .route("/recommendations/refresh", post(recommendations::refresh))
        .route_layer(from_fn_with_state(state, require_session));

    public.merge(protected)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

/// Middleware gating routes on a live session
///
/// Reads `Authorization: Bearer <token>`, resolves it against the session
/// store, and stores the resulting `SessionContext` in the request
/// extensions for handlers to extract. Requests without a resolvable
/// session are rejected with 401 before reaching the handler.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .and_then(|s| Uuid::parse_str(s.trim()).ok());

    let context = match token {
        Some(token) => state.resolve_session(token).await,
        None => None,
    };

    match context {
        Some(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        None => {
            let body = Json(json!({ "error": "Please log in first" }));
            (StatusCode::UNAUTHORIZED, body).into_response()
        }
    }
}

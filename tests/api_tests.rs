use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::json;

use backlog_api::{
    db,
    error::{AppError, AppResult},
    models::{GameDetails, NewsItem, ObservedGame, SearchHit},
    services::providers::{StorefrontProvider, TextGenerator},
    AppState,
};

/// Storefront double returning a fixed two-game library
struct StubStorefront;

#[async_trait::async_trait]
impl StorefrontProvider for StubStorefront {
    async fn fetch_owned_games(&self, _steam_id: &str) -> AppResult<Vec<ObservedGame>> {
        Ok(vec![
            ObservedGame {
                app_id: "570".to_string(),
                name: "Dota 2".to_string(),
                playtime_minutes: 1200,
            },
            ObservedGame {
                app_id: "730".to_string(),
                name: "Counter-Strike 2".to_string(),
                playtime_minutes: 300,
            },
        ])
    }

    async fn fetch_game_details(
        &self,
        app_id: &str,
        fallback_name: &str,
    ) -> AppResult<GameDetails> {
        Ok(GameDetails {
            name: fallback_name.to_string(),
            genres: "Action".to_string(),
            cover_url: format!("https://cdn.example/{}.jpg", app_id),
            store_url: format!("https://store.steampowered.com/app/{}", app_id),
            description: "A game.".to_string(),
        })
    }

    async fn resolve_vanity(&self, alias: &str) -> AppResult<String> {
        match alias {
            "gaben" => Ok("76561198000000000".to_string()),
            _ => Err(AppError::NotFound(format!(
                "No profile found for vanity alias '{}'",
                alias
            ))),
        }
    }

    async fn search_games(&self, _term: &str) -> AppResult<Vec<SearchHit>> {
        Ok(vec![SearchHit {
            app_id: "1145360".to_string(),
            name: "Hades".to_string(),
            cover_url: None,
        }])
    }

    async fn fetch_game_news(&self, _app_id: &str, _count: u32) -> AppResult<Vec<NewsItem>> {
        Ok(vec![])
    }
}

/// Generator double emitting two well-formed records, counting calls
struct StubGenerator {
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _prompt: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(
            "Hades\nA roguelike dungeon crawler.\nGenres: Action\n\n\
             Celeste\nA precision platformer.\nGenres: Platformer"
                .to_string(),
        )
    }
}

async fn create_test_server() -> (TestServer, Arc<AtomicUsize>) {
    let pool = db::sqlite::create_memory_pool().await.unwrap();
    db::init_schema(&pool).await.unwrap();

    // Nothing listens here; cache reads degrade to misses, which is the
    // behavior under test as much as anything else.
    let (cache, _writer) = db::Cache::connect("redis://127.0.0.1:16379").unwrap();

    let generation_calls = Arc::new(AtomicUsize::new(0));
    let generator = StubGenerator {
        calls: generation_calls.clone(),
    };

    let state = AppState::new(pool, cache, Arc::new(StubStorefront), Arc::new(generator));
    let server = TestServer::new(backlog_api::create_router(state)).unwrap();

    (server, generation_calls)
}

/// Registers and logs `alice` in, returning her bearer token
async fn login(server: &TestServer) -> String {
    server
        .post("/api/v1/auth/register")
        .json(&json!({ "username": "alice", "password": "hunter2" }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "alice", "password": "hunter2" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let (server, _) = create_test_server().await;

    server
        .post("/api/v1/auth/register")
        .json(&json!({ "username": "alice", "password": "hunter2" }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({ "username": "alice", "password": "other" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let (server, _) = create_test_server().await;

    server
        .post("/api/v1/auth/register")
        .json(&json!({ "username": "alice", "password": "hunter2" }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let (server, _) = create_test_server().await;

    let response = server.get("/api/v1/reviews").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let response = server.get("/api/v1/wishlist").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_tears_the_session_down() {
    let (server, _) = create_test_server().await;
    let token = login(&server).await;
    let (name, value) = bearer(&token);

    server
        .post("/api/v1/auth/logout")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = server
        .get("/api/v1/reviews")
        .add_header(name, value)
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_library_sync_mirrors_games_and_is_idempotent() {
    let (server, _) = create_test_server().await;
    let token = login(&server).await;
    let (name, value) = bearer(&token);

    let response = server
        .post("/api/v1/library/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "profile": "https://steamcommunity.com/profiles/76561198882302331",
            "label": "Main"
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["steam_id"], "76561198882302331");
    assert_eq!(body["fetched"], 2);
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["updated"], 0);

    // Same observations again: nothing to insert, nothing to update.
    let response = server
        .post("/api/v1/library/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "profile": "76561198882302331" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["inserted"], 0);
    assert_eq!(body["updated"], 0);

    let response = server
        .get("/api/v1/library/games")
        .add_query_param("steam_id", "76561198882302331")
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();
    let games: Vec<serde_json::Value> = response.json();
    assert_eq!(games.len(), 2);
    // Ordered by playtime, Dota 2 first
    assert_eq!(games[0]["name"], "Dota 2");

    let response = server
        .get("/api/v1/library/profiles")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let profiles: Vec<serde_json::Value> = response.json();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["label"], "Main");
}

#[tokio::test]
async fn test_library_sync_resolves_vanity_aliases() {
    let (server, _) = create_test_server().await;
    let token = login(&server).await;
    let (name, value) = bearer(&token);

    let response = server
        .post("/api/v1/library/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "profile": "https://steamcommunity.com/id/gaben" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["steam_id"], "76561198000000000");

    // Unknown alias is a user-visible 404, not a crash
    let response = server
        .post("/api/v1/library/sync")
        .add_header(name, value)
        .json(&json!({ "profile": "nobody-here" }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_upsert_and_invalid_rating() {
    let (server, _) = create_test_server().await;
    let token = login(&server).await;
    let (name, value) = bearer(&token);

    let response = server
        .post("/api/v1/reviews")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "app_id": "570",
            "game_name": "Dota 2",
            "review_text": "Endless.",
            "rating": 4
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    // Overwrite in place
    server
        .post("/api/v1/reviews")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "app_id": "570",
            "game_name": "Dota 2",
            "review_text": "Actually mid.",
            "rating": 2
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .get("/api/v1/reviews")
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();
    let reviews: Vec<serde_json::Value> = response.json();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["review_text"], "Actually mid.");
    assert_eq!(reviews[0]["rating"], 2);

    // Out-of-range rating is rejected before persistence
    let response = server
        .post("/api/v1/reviews")
        .add_header(name, value)
        .json(&json!({
            "app_id": "570",
            "game_name": "Dota 2",
            "review_text": "x",
            "rating": 6
        }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_review_delete() {
    let (server, _) = create_test_server().await;
    let token = login(&server).await;
    let (name, value) = bearer(&token);

    let response = server
        .post("/api/v1/reviews")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "app_id": "570",
            "game_name": "Dota 2",
            "review_text": "Endless.",
            "rating": 4
        }))
        .await;
    let review: serde_json::Value = response.json();
    let review_id = review["review_id"].as_i64().unwrap();

    server
        .delete(&format!("/api/v1/reviews/{}", review_id))
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = server
        .delete(&format!("/api/v1/reviews/{}", review_id))
        .add_header(name, value)
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wishlist_duplicate_add_reports_already_present() {
    let (server, _) = create_test_server().await;
    let token = login(&server).await;
    let (name, value) = bearer(&token);

    let entry = json!({
        "app_id": "1145360",
        "game_name": "Hades",
        "cover_url": "https://cdn.example/hades.jpg",
        "store_url": "https://store.steampowered.com/app/1145360"
    });

    let response = server
        .post("/api/v1/wishlist")
        .add_header(name.clone(), value.clone())
        .json(&entry)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "added");

    let response = server
        .post("/api/v1/wishlist")
        .add_header(name.clone(), value.clone())
        .json(&entry)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "already_present");

    let response = server
        .get("/api/v1/wishlist")
        .add_header(name.clone(), value.clone())
        .await;
    let entries: Vec<serde_json::Value> = response.json();
    assert_eq!(entries.len(), 1);

    server
        .delete("/api/v1/wishlist/1145360")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = server
        .get("/api/v1/wishlist")
        .add_header(name, value)
        .await;
    let entries: Vec<serde_json::Value> = response.json();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_recommendations_without_reviews_skip_generation() {
    let (server, generation_calls) = create_test_server().await;
    let token = login(&server).await;
    let (name, value) = bearer(&token);

    let response = server
        .get("/api/v1/recommendations")
        .add_header(name, value)
        .await;
    response.assert_status_ok();

    let records: Vec<serde_json::Value> = response.json();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "No Reviews Found");
    assert_eq!(generation_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_recommendations_parse_generated_text() {
    let (server, generation_calls) = create_test_server().await;
    let token = login(&server).await;
    let (name, value) = bearer(&token);

    server
        .post("/api/v1/reviews")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "app_id": "570",
            "game_name": "Dota 2",
            "review_text": "Endless.",
            "rating": 4
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .get("/api/v1/recommendations")
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();

    let records: Vec<serde_json::Value> = response.json();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Hades");
    assert_eq!(records[0]["genres"], "Action");
    assert_eq!(records[1]["name"], "Celeste");
    assert_eq!(generation_calls.load(Ordering::SeqCst), 1);

    // Refresh regenerates: one more call
    let response = server
        .post("/api/v1/recommendations/refresh")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    assert_eq!(generation_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_store_search_is_public() {
    let (server, _) = create_test_server().await;

    let response = server
        .get("/api/v1/games/search")
        .add_query_param("q", "hades")
        .await;
    response.assert_status_ok();

    let hits: Vec<serde_json::Value> = response.json();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Hades");
}

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{error::AppResult, models::WishlistEntry};

/// What an add attempt did
///
/// Re-adding a wishlisted game is an informational no-op, not an error, so
/// callers can tell the user "already there" instead of failing.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WishlistOutcome {
    Added,
    AlreadyPresent,
}

/// Adds a game to the account's wishlist
///
/// A single conflict-aware insert: the uniqueness of (account, app id) is
/// enforced by the store, so two near-simultaneous submissions cannot
/// produce a duplicate row.
pub async fn add_to_wishlist(
    pool: &SqlitePool,
    user_id: i64,
    steam_app_id: &str,
    game_name: &str,
    cover_url: Option<&str>,
    store_url: Option<&str>,
) -> AppResult<WishlistOutcome> {
    let result = sqlx::query(
        r#"
        INSERT INTO wishlist (user_id, steam_app_id, game_name, cover_url, store_url, added_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, steam_app_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(steam_app_id)
    .bind(game_name)
    .bind(cover_url)
    .bind(store_url)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::debug!(user_id, steam_app_id = %steam_app_id, "Wishlist entry already present");
        return Ok(WishlistOutcome::AlreadyPresent);
    }

    tracing::info!(user_id, steam_app_id = %steam_app_id, "Added to wishlist");
    Ok(WishlistOutcome::Added)
}

/// Removes a game from the wishlist; removing an absent entry is a no-op
pub async fn remove_from_wishlist(
    pool: &SqlitePool,
    user_id: i64,
    steam_app_id: &str,
) -> AppResult<()> {
    sqlx::query("DELETE FROM wishlist WHERE user_id = ? AND steam_app_id = ?")
        .bind(user_id)
        .bind(steam_app_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Lists the account's wishlist, newest first
pub async fn list_wishlist(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<WishlistEntry>> {
    let entries = sqlx::query_as::<_, WishlistEntry>(
        r#"
        SELECT id, user_id, steam_app_id, game_name, cover_url, store_url, added_at
        FROM wishlist
        WHERE user_id = ?
        ORDER BY added_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

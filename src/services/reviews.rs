use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    models::{Review, ReviewWithGame},
};

/// Creates or overwrites the review for (account, game)
///
/// The rating is validated before the store is touched. The game row is
/// created on the fly when the game was never synced (reviewed straight
/// from search), and the review write itself is a conflict-aware upsert, so
/// two concurrent submissions for the same game leave exactly one row. The
/// whole sequence runs in one transaction.
pub async fn upsert_review(
    pool: &SqlitePool,
    user_id: i64,
    steam_app_id: &str,
    game_name: &str,
    review_text: &str,
    rating: i64,
) -> AppResult<Review> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::InvalidRating(rating));
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    // Any mirrored row for this (app, account) will do, whichever profile
    // it came from.
    let game_id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM games WHERE steam_app_id = ? AND user_id = ? LIMIT 1")
            .bind(steam_app_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

    let game_id = match game_id {
        Some(id) => id,
        None => {
            sqlx::query(
                r#"
                INSERT INTO games (steam_app_id, user_id, name, last_synced_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(steam_app_id)
            .bind(user_id)
            .bind(game_name)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query_scalar(
                "SELECT id FROM games WHERE steam_app_id = ? AND user_id = ? LIMIT 1",
            )
            .bind(steam_app_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    sqlx::query(
        r#"
        INSERT INTO reviews (user_id, game_id, review_text, rating, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id, game_id) DO UPDATE SET
            review_text = excluded.review_text,
            rating = excluded.rating,
            created_at = excluded.created_at
        "#,
    )
    .bind(user_id)
    .bind(game_id)
    .bind(review_text)
    .bind(rating)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let review = sqlx::query_as::<_, Review>(
        r#"
        SELECT review_id, user_id, game_id, review_text, rating, created_at
        FROM reviews
        WHERE user_id = ? AND game_id = ?
        "#,
    )
    .bind(user_id)
    .bind(game_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(user_id, steam_app_id = %steam_app_id, rating, "Review saved");

    Ok(review)
}

/// Deletes a review by id
///
/// No ownership check beyond the id the caller supplies; the id comes from
/// the caller's own review listing.
pub async fn delete_review(pool: &SqlitePool, review_id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM reviews WHERE review_id = ?")
        .bind(review_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Review {} not found", review_id)));
    }

    Ok(())
}

/// Lists an account's reviews joined with game names, most recent first
pub async fn list_reviews(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<ReviewWithGame>> {
    let reviews = sqlx::query_as::<_, ReviewWithGame>(
        r#"
        SELECT r.review_id, g.name AS game_name, r.review_text, r.rating, r.created_at
        FROM reviews r
        JOIN games g ON r.game_id = g.id
        WHERE r.user_id = ?
        ORDER BY r.created_at DESC, r.review_id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}

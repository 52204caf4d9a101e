use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use url::Url;

use crate::{
    error::{AppError, AppResult},
    models::{GameDetails, LinkedProfile, ObservedGame, OwnedGame},
    services::providers::StorefrontProvider,
};

/// Counts reported back to the caller after a library sync
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct SyncOutcome {
    /// Newly-seen games inserted
    pub inserted: usize,
    /// Existing games whose playtime advanced
    pub updated: usize,
    /// Inserted games whose metadata lookup failed and fell back to
    /// placeholder values
    pub degraded: usize,
}

/// Mirrors an observed owned-game list into the store
///
/// Already-seen games (scoped to account + profile + app id) are updated
/// only when the observed playtime is strictly greater than the stored
/// value; stale or partial storefront responses can never regress playtime.
/// Newly-seen games incur one metadata lookup each; a failed lookup degrades
/// that game to placeholder metadata instead of aborting the batch.
pub async fn sync_owned_games(
    pool: &SqlitePool,
    provider: &dyn StorefrontProvider,
    user_id: i64,
    steam_id: &str,
    observed: Vec<ObservedGame>,
) -> AppResult<SyncOutcome> {
    let mut outcome = SyncOutcome::default();

    for game in observed {
        let existing: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT id, playtime_minutes FROM games
            WHERE steam_app_id = ? AND user_id = ? AND steam_id = ?
            "#,
        )
        .bind(&game.app_id)
        .bind(user_id)
        .bind(steam_id)
        .fetch_optional(pool)
        .await?;

        match existing {
            Some((row_id, stored_playtime)) => {
                if game.playtime_minutes > stored_playtime {
                    // Guard repeated in SQL so a concurrent sync cannot
                    // write a lower value between the read and the update.
                    let result = sqlx::query(
                        r#"
                        UPDATE games
                        SET playtime_minutes = ?, last_synced_at = ?
                        WHERE id = ? AND playtime_minutes < ?
                        "#,
                    )
                    .bind(game.playtime_minutes)
                    .bind(Utc::now())
                    .bind(row_id)
                    .bind(game.playtime_minutes)
                    .execute(pool)
                    .await?;

                    if result.rows_affected() > 0 {
                        outcome.updated += 1;
                    }
                }
            }
            None => {
                let details = match provider.fetch_game_details(&game.app_id, &game.name).await {
                    Ok(details) => details,
                    Err(e) => {
                        tracing::warn!(
                            app_id = %game.app_id,
                            error = %e,
                            "Metadata lookup failed, storing placeholder"
                        );
                        outcome.degraded += 1;
                        GameDetails::placeholder(&game.app_id, &game.name)
                    }
                };

                sqlx::query(
                    r#"
                    INSERT INTO games
                        (steam_app_id, user_id, steam_id, name, playtime_minutes,
                         genres, cover_url, store_url, last_synced_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(&game.app_id)
                .bind(user_id)
                .bind(steam_id)
                .bind(&details.name)
                .bind(game.playtime_minutes)
                .bind(&details.genres)
                .bind(&details.cover_url)
                .bind(&details.store_url)
                .bind(Utc::now())
                .execute(pool)
                .await?;

                outcome.inserted += 1;
            }
        }
    }

    tracing::info!(
        user_id,
        steam_id = %steam_id,
        inserted = outcome.inserted,
        updated = outcome.updated,
        degraded = outcome.degraded,
        "Library sync completed"
    );

    Ok(outcome)
}

/// Records the association of a storefront profile with an account.
/// Re-linking an already-linked profile is a no-op.
pub async fn link_profile(pool: &SqlitePool, user_id: i64, steam_id: &str) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO linked_profiles (user_id, steam_id)
        VALUES (?, ?)
        ON CONFLICT(steam_id, user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(steam_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Sets or replaces the display label of a linked profile
pub async fn label_profile(
    pool: &SqlitePool,
    user_id: i64,
    steam_id: &str,
    label: &str,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO linked_profiles (user_id, steam_id, label)
        VALUES (?, ?, ?)
        ON CONFLICT(steam_id, user_id) DO UPDATE SET label = excluded.label
        "#,
    )
    .bind(user_id)
    .bind(steam_id)
    .bind(label)
    .execute(pool)
    .await?;

    Ok(())
}

/// Lists the storefront profiles linked to an account
pub async fn list_profiles(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<LinkedProfile>> {
    let profiles = sqlx::query_as::<_, LinkedProfile>(
        "SELECT id, user_id, steam_id, label FROM linked_profiles WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(profiles)
}

/// Lists the mirrored games of one linked profile
pub async fn list_games(
    pool: &SqlitePool,
    user_id: i64,
    steam_id: &str,
) -> AppResult<Vec<OwnedGame>> {
    let games = sqlx::query_as::<_, OwnedGame>(
        r#"
        SELECT id, steam_app_id, user_id, steam_id, name, playtime_minutes,
               genres, cover_url, store_url, last_synced_at
        FROM games
        WHERE user_id = ? AND steam_id = ?
        ORDER BY playtime_minutes DESC
        "#,
    )
    .bind(user_id)
    .bind(steam_id)
    .fetch_all(pool)
    .await?;

    Ok(games)
}

/// Turns user-supplied profile input into a canonical profile id
///
/// Accepts a bare numeric id, a bare vanity alias, or a full profile URL
/// (`…/profiles/<id>` or `…/id/<alias>`). Aliases go through the vanity
/// resolution endpoint; an unmapped alias is a recoverable `NotFound`.
pub async fn resolve_profile_input(
    provider: &dyn StorefrontProvider,
    input: &str,
) -> AppResult<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::InvalidInput(
            "Profile URL or id is required".to_string(),
        ));
    }

    let candidate = if input.starts_with("http://") || input.starts_with("https://") {
        let parsed = Url::parse(input)
            .map_err(|e| AppError::InvalidInput(format!("Invalid profile URL: {}", e)))?;

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            ["profiles", rest @ ..] | ["id", rest @ ..] if !rest.is_empty() => {
                rest.last().copied().unwrap_or_default().to_string()
            }
            _ => {
                return Err(AppError::InvalidInput(
                    "Profile URL must contain /profiles/ or /id/".to_string(),
                ))
            }
        }
    } else {
        input.to_string()
    };

    if candidate.chars().all(|c| c.is_ascii_digit()) {
        Ok(candidate)
    } else {
        provider.resolve_vanity(&candidate).await
    }
}

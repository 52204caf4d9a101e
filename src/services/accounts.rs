use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::{
    error::{on_unique_violation, AppError, AppResult},
    models::Account,
};

/// Registers a new account
///
/// Stores a one-way salted hash of the password, never the plaintext. A
/// taken username surfaces as `DuplicateUsername`, mapped from the store's
/// unique constraint rather than a racy pre-check.
pub async fn register(pool: &SqlitePool, username: &str, password: &str) -> AppResult<Account> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password are required".to_string(),
        ));
    }

    let salt = generate_salt();
    let hash = hash_password(&salt, password);
    let created_at = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, password_salt, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .bind(created_at)
    .execute(pool)
    .await
    .map_err(|e| on_unique_violation(e, AppError::DuplicateUsername(username.to_string())))?;

    tracing::info!(username = %username, "Account registered");

    Ok(Account {
        user_id: result.last_insert_rowid(),
        username: username.to_string(),
        created_at,
    })
}

/// Authenticates a login attempt
///
/// Hashes the supplied password with the stored salt and compares. Both an
/// unknown username and a wrong password come back as `InvalidCredentials`;
/// no rate limiting, no lockout.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> AppResult<Account> {
    let row: Option<(i64, String, String, chrono::DateTime<Utc>)> = sqlx::query_as(
        r#"
        SELECT user_id, password_hash, password_salt, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    let Some((user_id, stored_hash, salt, created_at)) = row else {
        return Err(AppError::InvalidCredentials);
    };

    if hash_password(&salt, password) != stored_hash {
        return Err(AppError::InvalidCredentials);
    }

    Ok(Account {
        user_id,
        username: username.to_string(),
        created_at,
    })
}

fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

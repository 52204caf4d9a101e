use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

/// Creates a SQLite connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The database file is created on first connection if it does not exist.
pub async fn create_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates an ephemeral in-memory pool
///
/// Capped at a single connection: every new SQLite in-memory connection
/// opens its own empty database, so a wider pool would scatter the schema.
pub async fn create_memory_pool() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Initializes the schema. Safe to run on every startup: tables are created
/// with IF NOT EXISTS and column additions are guarded by a catalog lookup,
/// so re-running against an existing database is a no-op.
pub async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS linked_profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            steam_id TEXT NOT NULL,
            label TEXT,
            FOREIGN KEY(user_id) REFERENCES users(user_id),
            UNIQUE(steam_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            steam_app_id TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            steam_id TEXT,
            name TEXT NOT NULL,
            playtime_minutes INTEGER NOT NULL DEFAULT 0,
            genres TEXT NOT NULL DEFAULT 'Unknown',
            cover_url TEXT,
            store_url TEXT,
            last_synced_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Scoped per linked profile; reviews made from search land with a NULL
    // steam_id, so the index must treat NULL as a distinct value does in
    // SQLite -- COALESCE keeps one row per (app, user, profile).
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_games_identity
        ON games (steam_app_id, user_id, COALESCE(steam_id, ''))
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            review_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            game_id INTEGER NOT NULL,
            review_text TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK(rating >= 1 AND rating <= 5),
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(user_id),
            FOREIGN KEY(game_id) REFERENCES games(id),
            UNIQUE(user_id, game_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wishlist (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            steam_app_id TEXT NOT NULL,
            game_name TEXT NOT NULL,
            added_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(user_id),
            UNIQUE(user_id, steam_app_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Later additions to the wishlist table. ALTER TABLE ADD COLUMN is not
    // idempotent in SQLite, hence the guard.
    ensure_column(pool, "wishlist", "cover_url", "TEXT").await?;
    ensure_column(pool, "wishlist", "store_url", "TEXT").await?;

    Ok(())
}

/// Adds a column to a table unless it already exists.
async fn ensure_column(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    column_type: &str,
) -> anyhow::Result<()> {
    let exists: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM pragma_table_info(?) WHERE name = ?",
    )
    .bind(table)
    .bind(column)
    .fetch_optional(pool)
    .await?;

    if exists.is_none() {
        let statement = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_type);
        sqlx::query(&statement).execute(pool).await?;
        tracing::info!(table = %table, column = %column, "Added missing column");
    }

    Ok(())
}

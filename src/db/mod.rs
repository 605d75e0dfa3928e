mod models;

pub use models::*;

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments.
/// Comment lines are dropped before the statement split so punctuation
/// inside a comment never produces a phantom statement.
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    let cleaned: String = sql
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    for statement in cleaned.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("motorlot.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    info!("Initializing database at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;
    execute_sql(pool, include_str!("../../migrations/002_accounts.sql")).await?;
    execute_sql(pool, include_str!("../../migrations/003_sessions.sql")).await?;
    execute_sql(pool, include_str!("../../migrations/004_favorites.sql")).await?;

    Ok(())
}

/// Map sqlite uniqueness violations so handlers can render a specific
/// notice instead of a generic failure.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

/// In-memory database with the full schema, for unit tests.
#[cfg(test)]
pub async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn bare_pool() -> DbPool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite")
    }

    #[tokio::test]
    async fn comment_punctuation_does_not_break_the_split() {
        let pool = bare_pool().await;
        execute_sql(
            &pool,
            r#"
            -- a comment; with a semicolon in it
            CREATE TABLE widgets (id INTEGER PRIMARY KEY);

            -- trailing commentary
            INSERT INTO widgets (id) VALUES (1);
            "#,
        )
        .await
        .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM widgets")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn shipped_migrations_apply_cleanly() {
        let pool = bare_pool().await;
        run_migrations(&pool).await.unwrap();
        // Rows land in every table the migrations define
        for table in ["classifications", "accounts", "sessions", "favorites"] {
            let query = format!("SELECT COUNT(*) FROM {}", table);
            let _: i64 = sqlx::query_scalar(&query).fetch_one(&pool).await.unwrap();
        }
    }
}

//! Database pool initialization and schema creation
//!
//! Tables are created in dependency order (subject → session → probe →
//! probe_insertion) so foreign keys resolve as each table appears. The
//! skull_reference lookup table is seeded with its fixed contents here.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::path::Path;

/// Open (creating if missing) the workflow database and initialize schema.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // foreign_keys is a per-connection pragma, so it goes through connect
    // options rather than a URL query string.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    tracing::debug!("Connecting to database: {}", db_path.display());
    let pool = SqlitePool::connect_with(options).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create workflow tables if they don't exist
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subject (
            subject TEXT PRIMARY KEY,
            sex TEXT,
            subject_birth_date TEXT,
            subject_description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS session (
            subject TEXT NOT NULL REFERENCES subject(subject),
            session_datetime TEXT NOT NULL,
            PRIMARY KEY (subject, session_datetime)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS session_directory (
            subject TEXT NOT NULL,
            session_datetime TEXT NOT NULL,
            session_dir TEXT NOT NULL,
            PRIMARY KEY (subject, session_datetime),
            FOREIGN KEY (subject, session_datetime)
                REFERENCES session(subject, session_datetime)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS probe (
            probe TEXT PRIMARY KEY,
            probe_type TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS probe_insertion (
            subject TEXT NOT NULL,
            session_datetime TEXT NOT NULL,
            insertion_number INTEGER NOT NULL,
            probe TEXT NOT NULL REFERENCES probe(probe),
            PRIMARY KEY (subject, session_datetime, insertion_number),
            FOREIGN KEY (subject, session_datetime)
                REFERENCES session(subject, session_datetime)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skull_reference (
            skull_reference TEXT PRIMARY KEY
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Lookup contents
    sqlx::query("INSERT OR IGNORE INTO skull_reference (skull_reference) VALUES ('Bregma'), ('Lambda')")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_tables_and_lookup() {
        let temp = TempDir::new().unwrap();
        let pool = init_database_pool(&temp.path().join("ephys.db")).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM skull_reference")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);

        for table in ["subject", "session", "session_directory", "probe", "probe_insertion"] {
            let (count,): (i64,) =
                sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
                    .fetch_one(&pool)
                    .await
                    .unwrap();
            assert_eq!(count, 0, "table {} should exist and be empty", table);
        }
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("ephys.db");

        let pool = init_database_pool(&db_path).await.unwrap();
        drop(pool);
        let pool = init_database_pool(&db_path).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM skull_reference")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let temp = TempDir::new().unwrap();
        let pool = init_database_pool(&temp.path().join("ephys.db")).await.unwrap();

        // Session for a subject that was never inserted must be rejected
        let result = sqlx::query("INSERT INTO session (subject, session_datetime) VALUES ('ghost', '2021-01-01 00:00:00')")
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}

//! Session and session-directory table operations

use super::{store_error, DATETIME_FORMAT};
use crate::discover::SessionKey;
use crate::error::{IngestError, IngestResult};
use sqlx::SqlitePool;

/// Existence check on the session key (subject, session_datetime)
pub async fn session_exists(pool: &SqlitePool, key: &SessionKey) -> IngestResult<bool> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM session WHERE subject = ? AND session_datetime = ?",
    )
    .bind(&key.subject)
    .bind(key.session_datetime.format(DATETIME_FORMAT).to_string())
    .fetch_one(pool)
    .await
    .map_err(store_error)?;
    Ok(count > 0)
}

/// Insert sessions; returns the number inserted
pub async fn insert_sessions(pool: &SqlitePool, keys: &[SessionKey]) -> IngestResult<u64> {
    let mut inserted = 0u64;
    for key in keys {
        let result = sqlx::query("INSERT INTO session (subject, session_datetime) VALUES (?, ?)")
            .bind(&key.subject)
            .bind(key.session_datetime.format(DATETIME_FORMAT).to_string())
            .execute(pool)
            .await
            .map_err(store_error)?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

/// Insert session-directory records (root-relative POSIX paths)
pub async fn insert_session_directories(
    pool: &SqlitePool,
    dirs: &[(SessionKey, String)],
) -> IngestResult<u64> {
    let mut inserted = 0u64;
    for (key, session_dir) in dirs {
        let result = sqlx::query(
            "INSERT INTO session_directory (subject, session_datetime, session_dir) VALUES (?, ?, ?)",
        )
        .bind(&key.subject)
        .bind(key.session_datetime.format(DATETIME_FORMAT).to_string())
        .bind(session_dir)
        .execute(pool)
        .await
        .map_err(store_error)?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

/// Root-relative directory recorded for a session
pub async fn session_directory(pool: &SqlitePool, key: &SessionKey) -> IngestResult<String> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT session_dir FROM session_directory WHERE subject = ? AND session_datetime = ?",
    )
    .bind(&key.subject)
    .bind(key.session_datetime.format(DATETIME_FORMAT).to_string())
    .fetch_optional(pool)
    .await
    .map_err(store_error)?;

    row.map(|(dir,)| dir).ok_or_else(|| {
        IngestError::Common(ephys_common::Error::NotFound(format!(
            "No session data directory defined for {} @ {}",
            key.subject, key.session_datetime
        )))
    })
}

/// Total sessions in the store
pub async fn count_sessions(pool: &SqlitePool) -> IngestResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM session")
        .fetch_one(pool)
        .await
        .map_err(store_error)?;
    Ok(count)
}

//! Subject table operations

use super::store_error;
use crate::error::IngestResult;
use crate::manifest::SubjectRow;
use sqlx::SqlitePool;

/// Insert subjects, silently skipping rows whose subject id already exists.
/// Returns the number of rows actually inserted.
pub async fn insert_subjects(pool: &SqlitePool, rows: &[SubjectRow]) -> IngestResult<u64> {
    let mut inserted = 0u64;
    for row in rows {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO subject (subject, sex, subject_birth_date, subject_description)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&row.subject)
        .bind(&row.sex)
        .bind(&row.subject_birth_date)
        .bind(&row.subject_description)
        .execute(pool)
        .await
        .map_err(store_error)?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

/// Total subjects in the store
pub async fn count_subjects(pool: &SqlitePool) -> IngestResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subject")
        .fetch_one(pool)
        .await
        .map_err(store_error)?;
    Ok(count)
}

//! Probe and probe-insertion table operations

use super::{store_error, DATETIME_FORMAT};
use crate::discover::SessionKey;
use crate::error::IngestResult;
use sqlx::SqlitePool;

/// Candidate probe record (serial number + informational model)
#[derive(Debug, Clone)]
pub struct ProbeRecord {
    pub probe: String,
    pub probe_type: String,
}

/// Candidate probe-insertion record
#[derive(Debug, Clone)]
pub struct ProbeInsertionRecord {
    pub session: SessionKey,
    pub insertion_number: i64,
    pub probe: String,
}

/// Existence check on the probe serial number
pub async fn probe_exists(pool: &SqlitePool, probe: &str) -> IngestResult<bool> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM probe WHERE probe = ?")
        .bind(probe)
        .fetch_one(pool)
        .await
        .map_err(store_error)?;
    Ok(count > 0)
}

/// Insert probes; returns the number inserted
pub async fn insert_probes(pool: &SqlitePool, probes: &[ProbeRecord]) -> IngestResult<u64> {
    let mut inserted = 0u64;
    for record in probes {
        let result = sqlx::query("INSERT INTO probe (probe, probe_type) VALUES (?, ?)")
            .bind(&record.probe)
            .bind(&record.probe_type)
            .execute(pool)
            .await
            .map_err(store_error)?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

/// Insert probe insertions; returns the number inserted.
///
/// Requires that the referenced sessions and probes were inserted first —
/// foreign keys make out-of-order inserts fail.
pub async fn insert_probe_insertions(
    pool: &SqlitePool,
    insertions: &[ProbeInsertionRecord],
) -> IngestResult<u64> {
    let mut inserted = 0u64;
    for record in insertions {
        let result = sqlx::query(
            r#"
            INSERT INTO probe_insertion (subject, session_datetime, insertion_number, probe)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&record.session.subject)
        .bind(record.session.session_datetime.format(DATETIME_FORMAT).to_string())
        .bind(record.insertion_number)
        .bind(&record.probe)
        .execute(pool)
        .await
        .map_err(store_error)?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

/// Total probes in the store
pub async fn count_probes(pool: &SqlitePool) -> IngestResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM probe")
        .fetch_one(pool)
        .await
        .map_err(store_error)?;
    Ok(count)
}

/// Total probe insertions in the store
pub async fn count_probe_insertions(pool: &SqlitePool) -> IngestResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM probe_insertion")
        .fetch_one(pool)
        .await
        .map_err(store_error)?;
    Ok(count)
}

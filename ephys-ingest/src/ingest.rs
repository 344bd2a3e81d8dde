//! Dedup & insert orchestration
//!
//! Two independent entry points: subject manifest ingest and session
//! manifest ingest. Both run as one sequential pass. The in-memory dedup
//! keeps a single manifest run from re-queuing entities it has already
//! seen; the store's uniqueness constraints remain the final authority.
//!
//! Any discovery error aborts the whole `ingest_sessions` invocation before
//! anything is written, so a failing manifest row never leaves a
//! partially-described session behind. Reruns after a mid-insert crash are
//! safe: existence checks skip whatever already landed.

use crate::db;
use crate::db::probes::{ProbeInsertionRecord, ProbeRecord};
use crate::discover::{discover_session, SessionKey};
use crate::error::IngestResult;
use crate::manifest;
use ephys_common::config::EphysConfig;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Counts of rows actually inserted by one `ingest_sessions` run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub sessions: u64,
    pub session_directories: u64,
    pub probes: u64,
    pub probe_insertions: u64,
}

/// Insert all manifest subjects not already present in the store.
/// Duplicates are skipped silently; returns the number inserted.
pub async fn ingest_subjects(pool: &SqlitePool, subject_csv_path: &Path) -> IngestResult<u64> {
    let rows = manifest::read_subjects(subject_csv_path)?;
    let inserted = db::subjects::insert_subjects(pool, &rows).await?;
    info!("Inserted {} entry(s) into subject", inserted);
    Ok(inserted)
}

/// Discover every manifest session and insert whatever the store does not
/// already hold, in foreign-key order: sessions, session directories,
/// probes, probe insertions.
pub async fn ingest_sessions(
    config: &EphysConfig,
    pool: &SqlitePool,
    session_csv_path: &Path,
) -> IngestResult<IngestReport> {
    let rows = manifest::read_sessions(session_csv_path)?;

    let mut session_list: Vec<SessionKey> = Vec::new();
    let mut session_dir_list: Vec<(SessionKey, String)> = Vec::new();
    let mut probe_list: Vec<ProbeRecord> = Vec::new();
    let mut probe_insertion_list: Vec<ProbeInsertionRecord> = Vec::new();

    // Serial numbers already queued (or known present) this run. A probe
    // recorded in several manifest sessions is queued once, on first sight.
    let mut seen_probes: HashSet<String> = HashSet::new();

    for row in &rows {
        let discovered = discover_session(config, row)?;

        for insertion in &discovered.insertions {
            if seen_probes.insert(insertion.probe.clone())
                && !db::probes::probe_exists(pool, &insertion.probe).await?
            {
                probe_list.push(ProbeRecord {
                    probe: insertion.probe.clone(),
                    probe_type: insertion.probe_type.clone(),
                });
            }
        }

        // A session key already in the store means this session (directory
        // record and insertions included) was ingested earlier.
        if db::sessions::session_exists(pool, &discovered.session_key).await? {
            info!(
                subject = %discovered.session_key.subject,
                session_datetime = %discovered.session_key.session_datetime,
                "Session already in store, skipping"
            );
            continue;
        }

        probe_insertion_list.extend(discovered.insertions.iter().map(|insertion| {
            ProbeInsertionRecord {
                session: discovered.session_key.clone(),
                insertion_number: insertion.insertion_number,
                probe: insertion.probe.clone(),
            }
        }));
        session_dir_list.push((discovered.session_key.clone(), discovered.session_dir.clone()));
        session_list.push(discovered.session_key);
    }

    // Insert order matters: probe insertions reference sessions and probes
    let sessions = db::sessions::insert_sessions(pool, &session_list).await?;
    let session_directories =
        db::sessions::insert_session_directories(pool, &session_dir_list).await?;
    let probes = db::probes::insert_probes(pool, &probe_list).await?;
    let probe_insertions =
        db::probes::insert_probe_insertions(pool, &probe_insertion_list).await?;

    info!("Inserted {} entry(s) into session", sessions);
    info!("Inserted {} entry(s) into probe", probes);
    info!("Inserted {} entry(s) into probe_insertion", probe_insertions);

    Ok(IngestReport {
        sessions,
        session_directories,
        probes,
        probe_insertions,
    })
}

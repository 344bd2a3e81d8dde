//! CSV manifest reading
//!
//! Two manifests drive the workflow: a subject manifest whose column names
//! match the subject table's attributes, and a session manifest naming each
//! session's recording directory (absolute or root-relative). Unknown
//! columns are ignored.

use crate::error::{IngestError, IngestResult};
use serde::Deserialize;
use std::path::Path;

/// One row of the subject manifest
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectRow {
    pub subject: String,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub subject_birth_date: Option<String>,
    #[serde(default)]
    pub subject_description: Option<String>,
}

/// One row of the session manifest
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRow {
    pub subject: String,
    pub session_dir: String,
}

/// Read the subject manifest
pub fn read_subjects(csv_path: &Path) -> IngestResult<Vec<SubjectRow>> {
    subjects_from_reader(csv::Reader::from_path(csv_path)?)
}

/// Read the session manifest
pub fn read_sessions(csv_path: &Path) -> IngestResult<Vec<SessionRow>> {
    sessions_from_reader(csv::Reader::from_path(csv_path)?)
}

fn subjects_from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> IngestResult<Vec<SubjectRow>> {
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: SubjectRow = record?;
        if row.subject.trim().is_empty() {
            return Err(IngestError::MissingColumn("subject"));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn sessions_from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> IngestResult<Vec<SessionRow>> {
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: SessionRow = record?;
        if row.subject.trim().is_empty() {
            return Err(IngestError::MissingColumn("subject"));
        }
        if row.session_dir.trim().is_empty() {
            return Err(IngestError::MissingColumn("session_dir"));
        }
        rows.push(row);
    }
    Ok(rows)
}

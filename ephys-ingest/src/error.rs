//! Error types for ephys-ingest

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingest operations
pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Ingest error type
#[derive(Debug, Error)]
pub enum IngestError {
    /// Neither SpikeGLX nor OpenEphys signature files found in a session tree
    #[error("Ephys recording data not found! Neither SpikeGLX nor OpenEphys recording files found in: {0}")]
    AcquisitionFormatNotFound(PathBuf),

    /// Probe insertion number cannot be derived from directory naming
    #[error("Cannot parse probe insertion number from directory name: {0}")]
    ProbeNumberParse(String),

    /// A detected signature has no implemented reader (defensive; with only
    /// two supported formats and first-match selection this should not occur)
    #[error("Unknown acquisition software: {0}")]
    UnsupportedAcquisitionFormat(String),

    /// Foreign-key violation from the store, indicating broken insert ordering
    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// Metadata reader failure
    #[error("Metadata reader error: {0}")]
    Reader(#[from] crate::readers::ReaderError),

    /// CSV manifest read/parse failure
    #[error("Manifest error: {0}")]
    Manifest(#[from] csv::Error),

    /// Manifest row missing a required column value
    #[error("Manifest row missing required column: {0}")]
    MissingColumn(&'static str),

    /// Shared workflow error (config, path, database, not-found)
    #[error("{0}")]
    Common(#[from] ephys_common::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

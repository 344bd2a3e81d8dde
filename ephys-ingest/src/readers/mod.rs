//! Acquisition-format metadata readers
//!
//! One reader per supported acquisition software, each turning raw recording
//! files into the structured probe facts (model, serial number, timestamp)
//! the discovery step consumes. Parsing stops at the handful of keys the
//! workflow needs; the vendor formats carry far more than is read here.

pub mod openephys;
pub mod spikeglx;

pub use openephys::{OpenEphysProbe, OpenEphysSession};
pub use spikeglx::SpikeGlxMeta;

use std::path::PathBuf;
use thiserror::Error;

/// Supported acquisition software families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcqSoftware {
    SpikeGlx,
    OpenEphys,
}

impl AcqSoftware {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcqSoftware::SpikeGlx => "SpikeGLX",
            AcqSoftware::OpenEphys => "OpenEphys",
        }
    }
}

impl std::fmt::Display for AcqSoftware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata reader errors
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Cannot read a metadata file
    #[error("Failed to read {0}: {1}")]
    ReadError(PathBuf, String),

    /// A required metadata key is absent
    #[error("Missing metadata key '{key}' in {path}")]
    MissingKey { path: PathBuf, key: &'static str },

    /// A metadata value does not parse
    #[error("Invalid value for '{key}' in {path}: {value}")]
    InvalidValue {
        path: PathBuf,
        key: &'static str,
        value: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

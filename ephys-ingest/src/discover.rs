//! Session and probe discovery
//!
//! Walks a candidate session directory, picks the acquisition software from
//! file signatures, and assembles a normalized description of the session
//! (earliest recording timestamp) and its probe insertions. Pure with
//! respect to the store: only filesystem reads happen here, and output is
//! deterministic for a fixed directory snapshot.

use crate::error::{IngestError, IngestResult};
use crate::manifest::SessionRow;
use crate::readers::{AcqSoftware, OpenEphysSession, SpikeGlxMeta};
use chrono::NaiveDateTime;
use ephys_common::config::EphysConfig;
use ephys_common::paths;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Signature suffixes searched in priority order. SpikeGLX wins when a
/// directory carries both formats; the ordering is a fixed tie-break.
const SIGNATURES: &[(&str, AcqSoftware)] = &[
    (".ap.meta", AcqSoftware::SpikeGlx),
    (".oebin", AcqSoftware::OpenEphys),
];

/// SpikeGLX probe directories end in a numeric, optionally imec-prefixed,
/// suffix (imec0, imec1, ... or a bare digit)
static PROBE_DIR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(imec)?(\d+)$").unwrap());

/// Primary key of a session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub subject: String,
    pub session_datetime: NaiveDateTime,
}

/// One probe insertion discovered in a session directory
#[derive(Debug, Clone)]
pub struct DiscoveredInsertion {
    /// Probe serial number
    pub probe: String,
    /// Probe model (informational; serial number alone identifies a probe)
    pub probe_type: String,
    pub insertion_number: i64,
}

/// Normalized description of one discovered session
#[derive(Debug, Clone)]
pub struct DiscoveredSession {
    pub session_key: SessionKey,
    /// Root-relative session directory, POSIX separators
    pub session_dir: String,
    pub insertions: Vec<DiscoveredInsertion>,
}

/// Discover the session described by one manifest row.
pub fn discover_session(config: &EphysConfig, row: &SessionRow) -> IngestResult<DiscoveredSession> {
    let session_dir = paths::resolve_full_path(config.root_data_dir(), Path::new(&row.session_dir))?;

    let (acq_software, meta_filepaths) = detect_acq_software(&session_dir)?;
    debug!(
        subject = %row.subject,
        session_dir = %session_dir.display(),
        %acq_software,
        meta_files = meta_filepaths.len(),
        "Acquisition software detected"
    );

    let mut session_datetimes: Vec<NaiveDateTime> = Vec::new();
    let mut insertions: Vec<DiscoveredInsertion> = Vec::new();

    match acq_software {
        AcqSoftware::SpikeGlx => {
            for meta_filepath in &meta_filepaths {
                let meta = SpikeGlxMeta::from_file(meta_filepath)?;
                let insertion_number = probe_number_from_path(meta_filepath)?;

                insertions.push(DiscoveredInsertion {
                    probe: meta.probe_sn,
                    probe_type: meta.probe_model,
                    insertion_number,
                });
                session_datetimes.push(meta.recording_time);
            }
        }
        AcqSoftware::OpenEphys => {
            let loaded = OpenEphysSession::load(&session_dir, &meta_filepaths)?;
            session_datetimes.push(loaded.experiment_time);
            for (probe_idx, oe_probe) in loaded.probes.iter().enumerate() {
                insertions.push(DiscoveredInsertion {
                    probe: oe_probe.probe_sn.clone(),
                    probe_type: oe_probe.probe_model.clone(),
                    insertion_number: probe_idx as i64,
                });
            }
        }
    }

    // Detection guarantees at least one metadata file, but a directory that
    // yields no usable timestamp is as undescribable as one with no files.
    let session_datetime = session_datetimes
        .iter()
        .min()
        .copied()
        .ok_or_else(|| IngestError::AcquisitionFormatNotFound(session_dir.clone()))?;

    let root = config.require_root()?;
    let session_dir_rel = paths::to_posix(&paths::relative_path(root, &session_dir)?);

    Ok(DiscoveredSession {
        session_key: SessionKey {
            subject: row.subject.clone(),
            session_datetime,
        },
        session_dir: session_dir_rel,
        insertions,
    })
}

/// Search the session tree for format signature files, first matching
/// format wins. Matches are sorted because directory-walk order is
/// platform-dependent.
pub fn detect_acq_software(session_dir: &Path) -> IngestResult<(AcqSoftware, Vec<PathBuf>)> {
    for (suffix, software) in SIGNATURES {
        let mut matches: Vec<PathBuf> = WalkDir::new(session_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(entry.into_path()),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    None
                }
            })
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.ends_with(suffix))
                    .unwrap_or(false)
            })
            .collect();

        if !matches.is_empty() {
            matches.sort();
            return Ok((*software, matches));
        }
    }

    Err(IngestError::AcquisitionFormatNotFound(
        session_dir.to_path_buf(),
    ))
}

/// Insertion number from the immediate parent directory of a metadata file
fn probe_number_from_path(meta_filepath: &Path) -> IngestResult<i64> {
    let probe_dir_name = meta_filepath
        .parent()
        .and_then(|dir| dir.file_name())
        .and_then(|name| name.to_str())
        .ok_or_else(|| IngestError::ProbeNumberParse(meta_filepath.display().to_string()))?;
    parse_probe_number(probe_dir_name)
}

fn parse_probe_number(probe_dir_name: &str) -> IngestResult<i64> {
    let captures = PROBE_DIR_RE
        .captures(probe_dir_name)
        .ok_or_else(|| IngestError::ProbeNumberParse(probe_dir_name.to_string()))?;
    captures[2]
        .parse::<i64>()
        .map_err(|_| IngestError::ProbeNumberParse(probe_dir_name.to_string()))
}

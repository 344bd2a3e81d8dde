//! Open Ephys recording reader
//!
//! Open Ephys lays a session out as `Record Node <id>/experiment<n>/
//! recording<n>/` with a `structure.oebin` JSON describing the recorded
//! continuous streams and a `settings.xml` at the record-node level carrying
//! the acquisition start date. Probes are enumerated from the oebin
//! continuous entries; the AP and LFP streams of one probe share a serial
//! number, so entries are deduplicated by serial preserving first-seen
//! order. That order is what positional insertion numbering is derived from.

use super::ReaderError;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SETTINGS_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S";

static SETTINGS_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<DATE>([^<]+)</DATE>").unwrap());

/// One probe recorded in an Open Ephys session
#[derive(Debug, Clone)]
pub struct OpenEphysProbe {
    pub probe_model: String,
    pub probe_sn: String,
}

/// Experiment-level facts for an Open Ephys session
#[derive(Debug, Clone)]
pub struct OpenEphysSession {
    pub experiment_time: NaiveDateTime,
    pub probes: Vec<OpenEphysProbe>,
}

#[derive(Debug, Deserialize)]
struct Oebin {
    #[serde(default)]
    continuous: Vec<ContinuousEntry>,
}

#[derive(Debug, Deserialize)]
struct ContinuousEntry {
    #[serde(default)]
    probe_serial_number: Option<serde_json::Value>,
    #[serde(default)]
    probe_part_number: Option<String>,
}

impl OpenEphysSession {
    /// Load an Open Ephys session from its directory and the `.oebin` files
    /// already located under it (pre-sorted for stable enumeration).
    pub fn load(session_dir: &Path, oebin_files: &[PathBuf]) -> Result<Self, ReaderError> {
        let experiment_time = read_experiment_time(session_dir)?;

        let mut probes: Vec<OpenEphysProbe> = Vec::new();
        for oebin_path in oebin_files {
            let contents = fs::read_to_string(oebin_path)
                .map_err(|e| ReaderError::ReadError(oebin_path.to_path_buf(), e.to_string()))?;
            let oebin: Oebin = serde_json::from_str(&contents)
                .map_err(|e| ReaderError::ReadError(oebin_path.to_path_buf(), e.to_string()))?;

            for entry in probes_from_oebin(&oebin) {
                if !probes.iter().any(|p| p.probe_sn == entry.probe_sn) {
                    probes.push(entry);
                }
            }
        }

        Ok(Self {
            experiment_time,
            probes,
        })
    }
}

/// Probe entries of one oebin, in file order; streams without a serial
/// number (NIDAQ, ADC) are skipped.
fn probes_from_oebin(oebin: &Oebin) -> Vec<OpenEphysProbe> {
    oebin
        .continuous
        .iter()
        .filter_map(|entry| {
            let probe_sn = serial_to_string(entry.probe_serial_number.as_ref()?)?;
            Some(OpenEphysProbe {
                probe_model: probe_model_name(entry.probe_part_number.as_deref()),
                probe_sn,
            })
        })
        .collect()
}

/// Serial numbers appear as JSON numbers or strings depending on GUI version
fn serial_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Map an Open Ephys probe part number to a probe model name
fn probe_model_name(part_number: Option<&str>) -> String {
    match part_number {
        Some("PRB_1_4_0480_1") | Some("PRB_1_4_0480_1_C") => "neuropixels 1.0 - 3A".to_string(),
        Some("NP1010") | Some("NP1011") => "neuropixels 1.0 - NHP".to_string(),
        Some("NP2000") => "neuropixels 2.0 - SS".to_string(),
        Some("NP2010") => "neuropixels 2.0 - MS".to_string(),
        Some(other) => format!("neuropixels ({})", other),
        None => "neuropixels 1.0 - 3B".to_string(),
    }
}

/// Acquisition start time from the first `settings.xml` under the session
/// directory (record nodes of one session share the start time).
fn read_experiment_time(session_dir: &Path) -> Result<NaiveDateTime, ReaderError> {
    let mut settings_files: Vec<PathBuf> = WalkDir::new(session_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "settings.xml")
        .map(|e| e.into_path())
        .collect();
    settings_files.sort();

    let settings_path = settings_files.first().ok_or(ReaderError::MissingKey {
        path: session_dir.to_path_buf(),
        key: "settings.xml",
    })?;

    let contents = fs::read_to_string(settings_path)
        .map_err(|e| ReaderError::ReadError(settings_path.clone(), e.to_string()))?;
    parse_settings_date(settings_path, &contents)
}

fn parse_settings_date(path: &Path, contents: &str) -> Result<NaiveDateTime, ReaderError> {
    let captures = SETTINGS_DATE_RE
        .captures(contents)
        .ok_or(ReaderError::MissingKey {
            path: path.to_path_buf(),
            key: "DATE",
        })?;
    let date = captures[1].trim();
    NaiveDateTime::parse_from_str(date, SETTINGS_DATE_FORMAT).map_err(|_| {
        ReaderError::InvalidValue {
            path: path.to_path_buf(),
            key: "DATE",
            value: date.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE_OEBIN: &str = r#"{
        "GUI version": "0.6.4",
        "continuous": [
            {"folder_name": "Neuropix-PXI-100.ProbeA-AP/",
             "probe_serial_number": 17131307431, "probe_part_number": "NP1010"},
            {"folder_name": "Neuropix-PXI-100.ProbeA-LFP/",
             "probe_serial_number": 17131307431, "probe_part_number": "NP1010"},
            {"folder_name": "NI-DAQmx-103.PXIe-6341/"}
        ]
    }"#;

    #[test]
    fn test_probes_from_oebin_skips_non_probe_streams() {
        let oebin: Oebin = serde_json::from_str(SAMPLE_OEBIN).unwrap();
        let probes = probes_from_oebin(&oebin);
        // AP and LFP streams both present; dedup happens at load time
        assert_eq!(probes.len(), 2);
        assert_eq!(probes[0].probe_sn, "17131307431");
        assert_eq!(probes[0].probe_model, "neuropixels 1.0 - NHP");
    }

    #[test]
    fn test_serial_accepts_number_or_string() {
        assert_eq!(
            serial_to_string(&serde_json::json!(17131307431u64)).as_deref(),
            Some("17131307431")
        );
        assert_eq!(
            serial_to_string(&serde_json::json!("641251")).as_deref(),
            Some("641251")
        );
        assert_eq!(serial_to_string(&serde_json::json!("")), None);
    }

    #[test]
    fn test_parse_settings_date() {
        let contents = "<SETTINGS>\n  <INFO>\n    <DATE>26 Jan 2021 15:34:27</DATE>\n  </INFO>\n</SETTINGS>";
        let parsed = parse_settings_date(Path::new("settings.xml"), contents).unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2021, 1, 26).unwrap().and_hms_opt(15, 34, 27).unwrap()
        );
    }

    #[test]
    fn test_settings_without_date_is_error() {
        let result = parse_settings_date(Path::new("settings.xml"), "<SETTINGS/>");
        assert!(matches!(result, Err(ReaderError::MissingKey { key: "DATE", .. })));
    }

    #[test]
    fn test_unknown_part_number_keeps_vendor_string() {
        assert_eq!(probe_model_name(Some("NP9999")), "neuropixels (NP9999)");
        assert_eq!(probe_model_name(None), "neuropixels 1.0 - 3B");
    }
}

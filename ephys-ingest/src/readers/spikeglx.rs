//! SpikeGLX `.ap.meta` reader
//!
//! SpikeGLX writes one `<run>.imecN.ap.meta` text file per probe: flat
//! `key=value` lines, some keys carrying a leading `~`. Consumed keys:
//! `fileCreateTime` (recording start), `imDatPrb_sn` / `imProbeSN` (serial
//! number; the latter is the 3A-era spelling), and `imDatPrb_type` (numeric
//! probe generation, absent on 3A probes).

use super::ReaderError;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const CREATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Facts extracted from one `.ap.meta` file
#[derive(Debug, Clone)]
pub struct SpikeGlxMeta {
    pub probe_model: String,
    pub probe_sn: String,
    pub recording_time: NaiveDateTime,
}

impl SpikeGlxMeta {
    /// Read and parse a `.ap.meta` file
    pub fn from_file(meta_filepath: &Path) -> Result<Self, ReaderError> {
        let contents = fs::read_to_string(meta_filepath)
            .map_err(|e| ReaderError::ReadError(meta_filepath.to_path_buf(), e.to_string()))?;
        Self::from_contents(meta_filepath, &contents)
    }

    fn from_contents(path: &Path, contents: &str) -> Result<Self, ReaderError> {
        let entries = parse_meta(contents);

        let create_time = entries.get("fileCreateTime").ok_or(ReaderError::MissingKey {
            path: path.to_path_buf(),
            key: "fileCreateTime",
        })?;
        let recording_time = NaiveDateTime::parse_from_str(create_time, CREATE_TIME_FORMAT)
            .map_err(|_| ReaderError::InvalidValue {
                path: path.to_path_buf(),
                key: "fileCreateTime",
                value: create_time.to_string(),
            })?;

        // 3A-era metadata spells the serial imProbeSN and carries no probe type
        let (probe_sn, probe_model) = if let Some(sn) = entries.get("imDatPrb_sn") {
            let prb_type = entries.get("imDatPrb_type").copied().unwrap_or("0");
            (sn.to_string(), probe_model_name(prb_type))
        } else if let Some(sn) = entries.get("imProbeSN") {
            (sn.to_string(), "neuropixels 1.0 - 3A".to_string())
        } else {
            return Err(ReaderError::MissingKey {
                path: path.to_path_buf(),
                key: "imDatPrb_sn",
            });
        };

        Ok(Self {
            probe_model,
            probe_sn,
            recording_time,
        })
    }
}

fn parse_meta(contents: &str) -> HashMap<&str, &str> {
    contents
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.trim().trim_start_matches('~'), value.trim()))
        })
        .collect()
}

/// Map the numeric `imDatPrb_type` to a probe model name
fn probe_model_name(prb_type: &str) -> String {
    match prb_type {
        "0" => "neuropixels 1.0 - 3B".to_string(),
        "1030" => "neuropixels 1.0 - NHP".to_string(),
        "21" => "neuropixels 2.0 - SS".to_string(),
        "24" => "neuropixels 2.0 - MS".to_string(),
        other => format!("neuropixels (type {})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
fileCreateTime=2021-01-01T12:00:00\n\
fileSizeBytes=4096\n\
imDatPrb_sn=18194814141\n\
imDatPrb_type=0\n\
~imroTbl=(0,384)\n";

    #[test]
    fn test_parse_sample_meta() {
        let meta = SpikeGlxMeta::from_contents(Path::new("t.ap.meta"), SAMPLE).unwrap();
        assert_eq!(meta.probe_sn, "18194814141");
        assert_eq!(meta.probe_model, "neuropixels 1.0 - 3B");
        assert_eq!(
            meta.recording_time,
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_3a_serial_fallback() {
        let contents = "fileCreateTime=2019-06-01T08:30:00\nimProbeSN=641251\n";
        let meta = SpikeGlxMeta::from_contents(Path::new("t.ap.meta"), contents).unwrap();
        assert_eq!(meta.probe_sn, "641251");
        assert_eq!(meta.probe_model, "neuropixels 1.0 - 3A");
    }

    #[test]
    fn test_missing_serial_is_error() {
        let contents = "fileCreateTime=2021-01-01T12:00:00\n";
        let result = SpikeGlxMeta::from_contents(Path::new("t.ap.meta"), contents);
        assert!(matches!(result, Err(ReaderError::MissingKey { key: "imDatPrb_sn", .. })));
    }

    #[test]
    fn test_bad_timestamp_is_error() {
        let contents = "fileCreateTime=yesterday\nimDatPrb_sn=1\n";
        let result = SpikeGlxMeta::from_contents(Path::new("t.ap.meta"), contents);
        assert!(matches!(result, Err(ReaderError::InvalidValue { key: "fileCreateTime", .. })));
    }

    #[test]
    fn test_probe_model_mapping() {
        assert_eq!(probe_model_name("21"), "neuropixels 2.0 - SS");
        assert_eq!(probe_model_name("24"), "neuropixels 2.0 - MS");
        assert_eq!(probe_model_name("9999"), "neuropixels (type 9999)");
    }

    #[test]
    fn test_tilde_keys_are_normalized() {
        let entries = parse_meta("~imroTbl=(0,384)\nplain=value\n");
        assert_eq!(entries.get("imroTbl"), Some(&"(0,384)"));
        assert_eq!(entries.get("plain"), Some(&"value"));
    }
}

//! Session discovery tests
//!
//! Exercise acquisition-format detection, probe/insertion normalization,
//! and root-relative path computation against on-disk fixture trees.

mod helpers;

use chrono::NaiveDate;
use ephys_common::config::EphysConfig;
use ephys_ingest::discover::{detect_acq_software, discover_session};
use ephys_ingest::manifest::SessionRow;
use ephys_ingest::readers::AcqSoftware;
use ephys_ingest::IngestError;
use helpers::{write_openephys_session, write_spikeglx_probe};
use tempfile::TempDir;

fn config_for(root: &std::path::Path) -> EphysConfig {
    EphysConfig::new(Some(root.to_path_buf()), None, None)
}

fn session_row(subject: &str, session_dir: &str) -> SessionRow {
    SessionRow {
        subject: subject.to_string(),
        session_dir: session_dir.to_string(),
    }
}

#[test]
fn spikeglx_two_probes_min_timestamp_and_insertion_numbers() {
    let temp = TempDir::new().unwrap();
    let session_dir = temp.path().join("M1/2021-01-01");
    write_spikeglx_probe(&session_dir.join("imec0"), "2021-01-01T12:00:00", "101", "0");
    write_spikeglx_probe(&session_dir.join("imec1"), "2021-01-01T13:00:00", "102", "0");

    let discovered =
        discover_session(&config_for(temp.path()), &session_row("M1", "M1/2021-01-01")).unwrap();

    // Session timestamp is the minimum across probes
    assert_eq!(
        discovered.session_key.session_datetime,
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
    );
    assert_eq!(discovered.session_dir, "M1/2021-01-01");

    let mut numbers: Vec<i64> = discovered.insertions.iter().map(|i| i.insertion_number).collect();
    numbers.sort();
    assert_eq!(numbers, vec![0, 1]);

    let serials: Vec<&str> = discovered.insertions.iter().map(|i| i.probe.as_str()).collect();
    assert!(serials.contains(&"101"));
    assert!(serials.contains(&"102"));
}

#[test]
fn spikeglx_wins_when_both_formats_present() {
    let temp = TempDir::new().unwrap();
    let session_dir = temp.path().join("M1/mixed");
    write_spikeglx_probe(&session_dir.join("imec0"), "2021-01-01T12:00:00", "101", "0");
    write_openephys_session(&session_dir, "01 Jan 2021 09:00:00", &[(201, "NP1010")]);

    let (software, matches) = detect_acq_software(&session_dir).unwrap();
    assert_eq!(software, AcqSoftware::SpikeGlx);
    assert_eq!(matches.len(), 1);

    let discovered =
        discover_session(&config_for(temp.path()), &session_row("M1", "M1/mixed")).unwrap();
    // Probe facts come from the SpikeGLX metadata, not the oebin
    assert_eq!(discovered.insertions.len(), 1);
    assert_eq!(discovered.insertions[0].probe, "101");
    assert_eq!(
        discovered.session_key.session_datetime,
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
    );
}

#[test]
fn openephys_positional_insertion_numbers() {
    let temp = TempDir::new().unwrap();
    let session_dir = temp.path().join("M2/2021-01-26");
    write_openephys_session(
        &session_dir,
        "26 Jan 2021 15:34:27",
        &[(301, "NP1010"), (302, "NP1010"), (303, "NP2000")],
    );

    let discovered =
        discover_session(&config_for(temp.path()), &session_row("M2", "M2/2021-01-26")).unwrap();

    assert_eq!(
        discovered.session_key.session_datetime,
        NaiveDate::from_ymd_opt(2021, 1, 26).unwrap().and_hms_opt(15, 34, 27).unwrap()
    );

    // AP/LFP streams share serials: three probes, numbered 0..3 in order
    let numbers: Vec<i64> = discovered.insertions.iter().map(|i| i.insertion_number).collect();
    assert_eq!(numbers, vec![0, 1, 2]);
    let serials: Vec<&str> = discovered.insertions.iter().map(|i| i.probe.as_str()).collect();
    assert_eq!(serials, vec!["301", "302", "303"]);
    assert_eq!(discovered.insertions[2].probe_type, "neuropixels 2.0 - SS");
}

#[test]
fn unrecognized_directory_is_acquisition_format_not_found() {
    let temp = TempDir::new().unwrap();
    let session_dir = temp.path().join("M1/empty");
    std::fs::create_dir_all(&session_dir).unwrap();
    std::fs::write(session_dir.join("notes.txt"), "nothing recorded").unwrap();

    let result = discover_session(&config_for(temp.path()), &session_row("M1", "M1/empty"));
    assert!(matches!(result, Err(IngestError::AcquisitionFormatNotFound(_))));
}

#[test]
fn probe_directory_without_numeric_suffix_fails() {
    let temp = TempDir::new().unwrap();
    let session_dir = temp.path().join("M1/badprobe");
    write_spikeglx_probe(&session_dir.join("probeA"), "2021-01-01T12:00:00", "101", "0");

    let result = discover_session(&config_for(temp.path()), &session_row("M1", "M1/badprobe"));
    assert!(matches!(result, Err(IngestError::ProbeNumberParse(_))));
}

#[test]
fn relative_session_dir_without_root_is_config_error() {
    let config = EphysConfig::default();
    let result = discover_session(&config, &session_row("M1", "M1/2021-01-01"));
    match result {
        Err(IngestError::Common(ephys_common::Error::Config(_))) => {}
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn missing_session_dir_is_path_error() {
    let temp = TempDir::new().unwrap();
    let result = discover_session(
        &config_for(temp.path()),
        &session_row("M1", "M1/does-not-exist"),
    );
    match result {
        Err(IngestError::Common(ephys_common::Error::Path(_))) => {}
        other => panic!("Expected Path error, got {:?}", other),
    }
}

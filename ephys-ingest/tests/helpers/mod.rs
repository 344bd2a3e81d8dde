//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Write one SpikeGLX probe directory with a single `.ap.meta` file
pub fn write_spikeglx_probe(probe_dir: &Path, create_time: &str, serial: &str, prb_type: &str) {
    fs::create_dir_all(probe_dir).unwrap();
    let probe_name = probe_dir.file_name().unwrap().to_string_lossy().to_string();
    let contents = format!(
        "fileCreateTime={}\nfileSizeBytes=4096\nimDatPrb_sn={}\nimDatPrb_type={}\n",
        create_time, serial, prb_type
    );
    fs::write(probe_dir.join(format!("run_g0.{}.ap.meta", probe_name)), contents).unwrap();
}

/// Write an Open Ephys session layout: one record node with a settings.xml
/// date and one recording whose oebin lists the given (serial, part number)
/// probes, each with an AP and an LFP stream.
pub fn write_openephys_session(session_dir: &Path, date: &str, probes: &[(u64, &str)]) {
    let node = session_dir.join("Record Node 101");
    let recording = node.join("experiment1").join("recording1");
    fs::create_dir_all(&recording).unwrap();

    fs::write(
        node.join("settings.xml"),
        format!("<SETTINGS>\n  <INFO>\n    <DATE>{}</DATE>\n  </INFO>\n</SETTINGS>\n", date),
    )
    .unwrap();

    let continuous: Vec<String> = probes
        .iter()
        .flat_map(|(serial, part)| {
            ["AP", "LFP"].iter().map(move |stream| {
                format!(
                    r#"{{"folder_name":"Neuropix-PXI-100.{serial}-{stream}/","probe_serial_number":{serial},"probe_part_number":"{part}"}}"#
                )
            })
        })
        .collect();

    fs::write(
        recording.join("structure.oebin"),
        format!(
            r#"{{"GUI version":"0.6.4","continuous":[{}]}}"#,
            continuous.join(",")
        ),
    )
    .unwrap();
}

/// Write a CSV manifest
pub fn write_csv(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

//! ephys-ingest library interface
//!
//! Exposes the manifest, discovery, and ingest APIs for integration testing

pub mod db;
pub mod discover;
pub mod error;
pub mod ingest;
pub mod manifest;
pub mod readers;

pub use error::{IngestError, IngestResult};

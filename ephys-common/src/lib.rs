//! # Ephys Common Library
//!
//! Shared code for the array-ephys ingest workflow including:
//! - Error types
//! - Configuration resolution
//! - Root-relative path arithmetic
//! - Database pool initialization and schema creation

pub mod config;
pub mod db;
pub mod error;
pub mod paths;

pub use error::{Error, Result};

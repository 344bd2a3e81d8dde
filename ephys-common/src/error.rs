//! Common error types for the ephys workflow

use thiserror::Error;

/// Common result type for ephys workflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared across the workflow crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A path cannot be resolved or expressed relative to the data root
    #[error("Path error: {0}")]
    Path(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

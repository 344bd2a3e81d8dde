//! Store access for the ingest workflow
//!
//! Free async fns over `&SqlitePool`, one module per table family. The
//! store's uniqueness and foreign-key constraints remain the final authority
//! on dedup; these helpers only decide insert-vs-skip up front.

pub mod probes;
pub mod sessions;
pub mod subjects;

use crate::error::IngestError;

/// Timestamp format used for session keys in the store
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Map store errors, surfacing foreign-key violations distinctly since they
/// indicate a broken insert ordering rather than bad input.
pub(crate) fn store_error(err: sqlx::Error) -> IngestError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.message().contains("FOREIGN KEY") {
            return IngestError::ReferentialIntegrity(db_err.message().to_string());
        }
    }
    IngestError::Common(ephys_common::Error::Database(err))
}

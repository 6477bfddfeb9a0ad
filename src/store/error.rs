//! Snapshot-loading error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or decoding an export snapshot
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents an I/O error while reading the export file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Represents a CSV decoding error (includes row position context)
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A record violated a schema invariant (bad flag char, bad rating, ...)
    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: u64, reason: String },

    /// The export file has not been downloaded yet
    #[error("Export not found at '{0}', run 'tagsieve sync' first")]
    MissingExport(PathBuf),
}

//! Export-download error types

use thiserror::Error;

/// Errors raised while locating or downloading a database export
#[derive(Debug, Error)]
pub enum ExportError {
    /// Represents an HTTP transport or status error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Represents an I/O error while writing the downloaded file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The server response had no usable Content-Length header
    #[error("Response for '{0}' did not include a Content-Length header")]
    MissingContentLength(String),

    /// The requested export age is outside the server's retention window
    #[error("Export age must be in the range [0, {max}] days inclusive (was {days})")]
    InvalidAge { days: u32, max: u32 },
}

//! Tagsieve - offline tag search over booru database exports
//!
//! This library downloads the daily gzipped CSV dumps published by the site,
//! loads them into an in-memory snapshot, and answers boolean tag-logic
//! queries (`+required -excluded ~optional field:>=value order:field`)
//! against millions of posts without touching the site's API.

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod logging;
pub mod output;
pub mod query;
pub mod store;
pub mod tags;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum TagsieveError {
    /// Query string could not be parsed
    #[error("Query error: {0}")]
    ParseError(#[from] query::ParseError),
    /// Snapshot loading / record decoding error
    #[error("Store error: {0}")]
    StoreError(#[from] store::StoreError),
    /// Export download error
    #[error("Export error: {0}")]
    ExportError(#[from] export::ExportError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Metadata serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

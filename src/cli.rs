//! Command-line interface definitions and parsing
//!
//! This module defines the complete CLI structure for tagsieve using the
//! `clap` crate.
//!
//! # Commands
//!
//! - **sync**: download database exports (posts, tags, ...)
//! - **search**: run a tag query against the local posts export
//! - **tags**: look up tags in the tags export
//! - **config**: manage application settings
//!
//! # Query tokens
//!
//! Search takes the query as trailing tokens with hyphen values allowed, so
//! the full search syntax works unquoted:
//!
//! ```bash
//! tagsieve search +wolf -fox ~bear score:>=10 order:score
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::export::ExportTarget;
use crate::store::Category;

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g., quiet=true)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (e.g., quiet)
        #[arg(value_name = "KEY")]
        key: String,
    },
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "tagsieve")]
#[command(about = "Offline tag search over booru database exports", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Directory holding the downloaded exports (overrides config)
    #[arg(long = "export-dir", global = true, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Download database exports
    #[command(visible_alias = "s")]
    Sync {
        /// Redownload even when a local copy exists
        #[arg(long = "refresh")]
        refresh: bool,

        /// Fetch the export published N days ago (the server keeps 3)
        #[arg(long = "days-ago", value_name = "N", default_value_t = 0)]
        days_ago: u32,

        /// Export tables to download (default: posts)
        #[arg(short = 't', long = "target", value_enum, value_name = "TARGET", num_args = 0..)]
        targets: Vec<ExportTarget>,
    },

    /// Search the local posts export with a tag query
    #[command(visible_alias = "q")]
    Search {
        /// Query tokens: tags ([+~-]name), predicates (field:>=N) and
        /// ordering (order:field[_desc])
        #[arg(value_name = "TOKEN", trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        query: Vec<String>,

        /// Keep only the first N results (applied after ordering)
        #[arg(short = 'n', long = "limit", value_name = "N")]
        limit: Option<usize>,

        /// Print derived file URLs instead of result summaries
        #[arg(long = "urls")]
        urls: bool,

        /// Write matching file URLs to a file, one per line
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,

        /// Save the matching records as a CSV file
        #[arg(long = "save-csv", value_name = "FILE")]
        save_csv: Option<PathBuf>,

        /// Write one JSON metadata file per match into a directory
        #[arg(long = "metadata", value_name = "DIR")]
        metadata: Option<PathBuf>,
    },

    /// Look up tags in the tags export
    #[command(visible_alias = "t")]
    Tags {
        /// Tag name to look up
        #[arg(value_name = "NAME")]
        name: Option<String>,

        /// List tags of this category instead
        #[arg(short = 'c', long = "category", value_enum, value_name = "CATEGORY")]
        category: Option<Category>,

        /// Minimum post count for category listings
        #[arg(long = "min-posts", value_name = "N", default_value_t = 1)]
        min_posts: i64,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

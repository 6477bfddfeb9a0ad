//! Database export retrieval
//!
//! The site publishes one gzipped CSV dump per table per UTC day and keeps
//! today's plus the previous three. An [`Export`] knows how to name, locate
//! and download one of those dumps; the query engine never touches the
//! network.

pub mod error;

pub use error::ExportError;

use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::ValueEnum;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_LENGTH;

use crate::output::human_size;

/// The server retains today's export plus this many previous days.
pub const MAX_EXPORT_AGE_DAYS: u32 = 3;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 30);

/// The export tables the server publishes.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Posts,
    Tags,
    TagAliases,
    TagImplications,
    Pools,
    WikiPages,
}

impl ExportTarget {
    /// Table name as it appears in the server-side filename.
    #[must_use]
    pub const fn server_name(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Tags => "tags",
            Self::TagAliases => "tag_aliases",
            Self::TagImplications => "tag_implications",
            Self::Pools => "pools",
            Self::WikiPages => "wiki_pages",
        }
    }

    /// Stable local filename, independent of the export date.
    #[must_use]
    pub fn local_name(self) -> String {
        format!("{}.csv.gz", self.server_name().replace('_', "-"))
    }
}

impl std::fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.server_name())
    }
}

/// Outcome of a sync call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Freshly downloaded, with the size in bytes
    Downloaded(u64),
    /// A local copy already existed and `refresh` was not set
    AlreadyPresent,
}

/// One downloadable database export.
#[derive(Debug, Clone)]
pub struct Export {
    pub target: ExportTarget,
    /// How many days back from today's export to fetch
    pub days_ago: u32,
    /// Directory the export is stored in locally
    pub base_path: PathBuf,
    /// Redownload even when a local copy exists
    pub refresh: bool,
}

impl Export {
    #[must_use]
    pub fn new(target: ExportTarget, base_path: impl Into<PathBuf>) -> Self {
        Self {
            target,
            days_ago: 0,
            base_path: base_path.into(),
            refresh: false,
        }
    }

    #[must_use]
    pub const fn days_ago(mut self, days: u32) -> Self {
        self.days_ago = days;
        self
    }

    #[must_use]
    pub const fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Filename of this export on the server, derived from the current
    /// UTC date minus `days_ago`.
    ///
    /// # Errors
    /// Returns [`ExportError::InvalidAge`] when `days_ago` is outside the
    /// server's retention window.
    pub fn server_filename(&self) -> Result<String, ExportError> {
        if self.days_ago > MAX_EXPORT_AGE_DAYS {
            return Err(ExportError::InvalidAge {
                days: self.days_ago,
                max: MAX_EXPORT_AGE_DAYS,
            });
        }

        let date = Utc::now() - chrono::Duration::days(i64::from(self.days_ago));
        Ok(format!(
            "{}-{}.csv.gz",
            self.target.server_name(),
            date.format("%Y-%m-%d")
        ))
    }

    /// Full remote URL of this export.
    ///
    /// # Errors
    /// Returns [`ExportError::InvalidAge`] when `days_ago` is out of range.
    pub fn server_url(&self, base_url: &str) -> Result<String, ExportError> {
        Ok(format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.server_filename()?
        ))
    }

    /// Path of the local copy of this export.
    #[must_use]
    pub fn local_path(&self) -> PathBuf {
        self.base_path.join(self.target.local_name())
    }

    /// Fetch the export's size on the server without downloading it.
    ///
    /// # Errors
    /// Returns an error for transport failures, non-success status codes,
    /// or a response without a Content-Length header.
    pub fn remote_size(&self, client: &Client, base_url: &str) -> Result<u64, ExportError> {
        let url = self.server_url(base_url)?;
        let response = client.head(&url).send()?.error_for_status()?;
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .ok_or(ExportError::MissingContentLength(url))
    }

    /// Download this export into `base_path`.
    ///
    /// An existing local copy short-circuits the download unless `refresh`
    /// is set, in which case it is removed first.
    ///
    /// # Errors
    /// Returns an error for transport failures, non-success status codes,
    /// or local filesystem failures.
    pub fn sync(&self, client: &Client, base_url: &str) -> Result<SyncStatus, ExportError> {
        let local_path = self.local_path();

        if local_path.exists() {
            if self.refresh {
                fs::remove_file(&local_path)?;
                tracing::info!("removed '{}' for refresh", local_path.display());
            } else {
                tracing::info!(
                    "export '{}' already present, not redownloading",
                    local_path.display()
                );
                return Ok(SyncStatus::AlreadyPresent);
            }
        }

        let size = self.remote_size(client, base_url)?;
        let url = self.server_url(base_url)?;
        tracing::info!(
            size = %human_size(size),
            "downloading '{}' to '{}'",
            url,
            local_path.display()
        );

        let mut response = client.get(&url).send()?.error_for_status()?;
        let mut file = BufWriter::new(fs::File::create(&local_path)?);
        let written = std::io::copy(&mut response, &mut file)?;

        Ok(SyncStatus::Downloaded(written))
    }
}

/// Build the HTTP client used for export downloads.
///
/// # Errors
/// Returns an error when the TLS backend cannot be initialized.
pub fn build_client(user_agent: &str) -> Result<Client, ExportError> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_filename_shape() {
        let export = Export::new(ExportTarget::Posts, "db");
        let name = export.server_filename().unwrap();
        assert!(name.starts_with("posts-"));
        assert!(name.ends_with(".csv.gz"));
        // posts-YYYY-MM-DD.csv.gz
        assert_eq!(name.len(), "posts-0000-00-00.csv.gz".len());
    }

    #[test]
    fn test_server_filename_rejects_stale_age() {
        let export = Export::new(ExportTarget::Posts, "db").days_ago(MAX_EXPORT_AGE_DAYS + 1);
        assert!(matches!(
            export.server_filename(),
            Err(ExportError::InvalidAge { days: 4, max: 3 })
        ));
    }

    #[test]
    fn test_server_url_joins_base() {
        let export = Export::new(ExportTarget::Tags, "db");
        let url = export.server_url("https://example.net/db_export/").unwrap();
        assert!(url.starts_with("https://example.net/db_export/tags-"));
    }

    #[test]
    fn test_local_path_is_date_independent() {
        let export = Export::new(ExportTarget::TagAliases, "/var/cache/tagsieve");
        assert_eq!(
            export.local_path(),
            PathBuf::from("/var/cache/tagsieve/tag-aliases.csv.gz")
        );
    }

    #[test]
    fn test_target_names() {
        assert_eq!(ExportTarget::WikiPages.server_name(), "wiki_pages");
        assert_eq!(ExportTarget::WikiPages.local_name(), "wiki-pages.csv.gz");
        assert_eq!(ExportTarget::Posts.to_string(), "posts");
    }
}

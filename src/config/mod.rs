//! Configuration module for tagsieve
//!
//! Manages application configuration: where exports are stored, which
//! server to fetch them from, and the load-time prefilter. Configuration
//! is stored in the user's config directory.

mod setup;

pub use setup::first_time_setup;

use std::fs;
use std::path::PathBuf;

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::store::Prefilter;

/// Default export download endpoint.
pub const DEFAULT_EXPORT_BASE_URL: &str = "https://e621.net/db_export";
/// Default static-file host used for derived post URLs.
pub const DEFAULT_FILE_BASE_URL: &str = "https://static1.e621.net/data";

fn default_export_dir() -> PathBuf {
    PathBuf::from("db")
}

fn default_export_base_url() -> String {
    DEFAULT_EXPORT_BASE_URL.to_string()
}

fn default_file_base_url() -> String {
    DEFAULT_FILE_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("tagsieve/{}", env!("CARGO_PKG_VERSION"))
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Directory the CSV exports are downloaded into
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Base URL the exports are downloaded from
    #[serde(default = "default_export_base_url")]
    pub export_base_url: String,

    /// Base URL of the static-file host, used to derive post URLs
    #[serde(default = "default_file_base_url")]
    pub file_base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    /// Load-time cleaning pass applied to the posts snapshot
    #[serde(default)]
    pub prefilter: Prefilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
            export_base_url: default_export_base_url(),
            file_base_url: default_file_base_url(),
            user_agent: default_user_agent(),
            quiet: false,
            prefilter: Prefilter::default(),
        }
    }
}

impl AppConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        Ok(config_dir.join("tagsieve").join("config.toml"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(config_path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the
    /// configuration cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Load configuration, running first-time setup if config doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or creating the configuration fails.
    pub fn load_or_setup() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load()
        } else {
            first_time_setup()
        }
    }
}

//! Tagsieve CLI application entry point
//!
//! Offline tag search over booru database exports: download the daily CSV
//! dump once, then run full tag-syntax queries against it locally.
//!
//! # Usage
//!
//! ```bash
//! # Download today's posts export
//! tagsieve sync
//!
//! # Also grab the tags export
//! tagsieve sync -t posts -t tags
//!
//! # Search with the full query syntax
//! tagsieve search +wolf -fox ~bear score:>=10 order:score
//!
//! # Derived file URLs only, piped into a bulk downloader
//! tagsieve -q search +wolf --urls
//!
//! # Look up a tag, or list a category
//! tagsieve tags wolf
//! tagsieve tags -c species --min-posts 100
//! ```
//!
//! # Configuration
//!
//! On first run, tagsieve prompts for the export download directory.
//! Configuration is stored in the user's config directory
//! (`~/.config/tagsieve/config.toml` on Linux).

use tagsieve::{
    TagsieveError,
    cli::{Cli, Commands, ConfigCommands},
    commands,
    commands::search::SearchOptions,
    config::AppConfig,
    logging,
};

type Result<T> = std::result::Result<T, TagsieveError>;

/// Handle the config command - manage application settings
///
/// # Errors
///
/// Returns `TagsieveError` if the configuration key is invalid, value
/// parsing fails, or configuration save fails.
fn handle_config_command(
    mut config: AppConfig,
    command: &ConfigCommands,
    quiet: bool,
) -> Result<()> {
    const KEYS: &str = "quiet, export_dir, export_base_url, file_base_url, user_agent";

    match command {
        ConfigCommands::Set { setting } => {
            let parts: Vec<&str> = setting.splitn(2, '=').collect();
            if parts.len() != 2 {
                return Err(TagsieveError::InvalidInput(
                    "Invalid format. Use: tagsieve config set key=value".into(),
                ));
            }

            let key = parts[0].trim();
            let value = parts[1].trim();

            match key {
                "quiet" => {
                    config.quiet = value.parse::<bool>().map_err(|_| {
                        TagsieveError::InvalidInput(format!(
                            "Invalid value for quiet: '{value}'. Use 'true' or 'false'"
                        ))
                    })?;
                }
                "export_dir" => {
                    config.export_dir = value.into();
                }
                "export_base_url" => {
                    config.export_base_url = value.to_string();
                }
                "file_base_url" => {
                    config.file_base_url = value.to_string();
                }
                "user_agent" => {
                    config.user_agent = value.to_string();
                }
                _ => {
                    return Err(TagsieveError::InvalidInput(format!(
                        "Unknown configuration key: '{key}'. Available keys: {KEYS}"
                    )));
                }
            }

            config.save()?;
            if !quiet {
                println!("Set {key} = {value}");
            }
        }
        ConfigCommands::Get { key } => match key.as_str() {
            "quiet" => println!("{}", config.quiet),
            "export_dir" => println!("{}", config.export_dir.display()),
            "export_base_url" => println!("{}", config.export_base_url),
            "file_base_url" => println!("{}", config.file_base_url),
            "user_agent" => println!("{}", config.user_agent),
            _ => {
                return Err(TagsieveError::InvalidInput(format!(
                    "Unknown configuration key: '{key}'. Available keys: {KEYS}"
                )));
            }
        },
    }
    Ok(())
}

/// Main entry point for the tagsieve application
///
/// Loads configuration, parses command-line arguments, and dispatches to
/// the appropriate command handler.
///
/// # Errors
///
/// Returns `TagsieveError` if configuration loading fails or any command
/// handler returns an error.
fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let mut config = AppConfig::load_or_setup()?;
    if let Some(dir) = &cli.export_dir {
        config.export_dir = dir.clone();
    }

    let quiet = cli.quiet || config.quiet;
    logging::init(if quiet { "warn" } else { "info" });

    match &cli.command {
        Commands::Sync { refresh, days_ago, targets } => {
            commands::sync(&config, targets, *days_ago, *refresh, quiet)
        }
        Commands::Search { query, limit, urls, output, save_csv, metadata } => {
            let opts = SearchOptions {
                limit: *limit,
                urls: *urls,
                output: output.clone(),
                save_csv: save_csv.clone(),
                metadata: metadata.clone(),
            };
            commands::search(&config, &query.join(" "), &opts, quiet)
        }
        Commands::Tags { name, category, min_posts } => {
            commands::tags(&config, name.as_deref(), *category, *min_posts, quiet)
        }
        Commands::Config { command } => handle_config_command(config, command, quiet),
    }
}

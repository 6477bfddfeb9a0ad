//! Sync command - download database exports

use std::fs;

use crate::{
    TagsieveError,
    config::AppConfig,
    export::{self, Export, ExportTarget, SyncStatus},
    output,
};

type Result<T> = std::result::Result<T, TagsieveError>;

/// Execute the sync command
///
/// Downloads each requested export table into the configured export
/// directory. With no explicit targets, only the posts export is synced -
/// it is the one search needs.
///
/// # Errors
/// Returns an error if the export directory cannot be created or a
/// download fails.
pub fn execute(
    config: &AppConfig,
    targets: &[ExportTarget],
    days_ago: u32,
    refresh: bool,
    quiet: bool,
) -> Result<()> {
    let targets: &[ExportTarget] = if targets.is_empty() {
        &[ExportTarget::Posts]
    } else {
        targets
    };

    fs::create_dir_all(&config.export_dir)?;
    let client = export::build_client(&config.user_agent)?;

    for target in targets {
        let export = Export::new(*target, &config.export_dir)
            .days_ago(days_ago)
            .refresh(refresh);

        match export.sync(&client, &config.export_base_url)? {
            SyncStatus::Downloaded(bytes) => {
                if !quiet {
                    println!(
                        "Downloaded {} export ({}) to {}",
                        target,
                        output::human_size(bytes),
                        export.local_path().display()
                    );
                }
            }
            SyncStatus::AlreadyPresent => {
                if !quiet {
                    println!(
                        "{} export already present at {} (use --refresh to redownload)",
                        target,
                        export.local_path().display()
                    );
                }
            }
        }
    }

    Ok(())
}

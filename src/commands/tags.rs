//! Tags command - look up tags in the tags export

use crate::{
    TagsieveError,
    config::AppConfig,
    export::{Export, ExportTarget},
    output,
    store::{Category, TagIndex},
};

type Result<T> = std::result::Result<T, TagsieveError>;

/// Execute the tags command
///
/// With a name, looks up that tag. With a category, lists that category's
/// tags by descending usage. With neither, prints per-category tag counts.
///
/// # Errors
/// Returns an error if the tags export is missing or malformed.
pub fn execute(
    config: &AppConfig,
    name: Option<&str>,
    category: Option<Category>,
    min_posts: i64,
    quiet: bool,
) -> Result<()> {
    let tags_path = Export::new(ExportTarget::Tags, &config.export_dir).local_path();
    let index = TagIndex::load(&tags_path)?;

    if let Some(name) = name {
        match index.get(name) {
            Some(info) => {
                println!(
                    "{}",
                    output::tag_line(name, info.category.name(), info.post_count, quiet)
                );
            }
            None => {
                if !quiet {
                    println!("No tag named '{name}' in the tags export");
                }
            }
        }
        return Ok(());
    }

    if let Some(category) = category {
        let entries = index.by_category(category, min_posts);
        if entries.is_empty() {
            if !quiet {
                println!("No {category} tags with at least {min_posts} post(s)");
            }
            return Ok(());
        }

        if !quiet {
            println!("{} {} tag(s) with at least {} post(s):", entries.len(), category, min_posts);
        }
        for (name, info) in entries {
            println!("{}", output::tag_line(name, info.category.name(), info.post_count, quiet));
        }
        return Ok(());
    }

    if !quiet {
        println!("{} tag(s) in the index:", index.len());
    }
    for (category, count) in index.category_counts() {
        if quiet {
            println!("{category} {count}");
        } else {
            println!("  {category}: {count}");
        }
    }

    Ok(())
}

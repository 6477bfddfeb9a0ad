//! Search command - query the local posts export

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::{
    TagsieveError,
    config::AppConfig,
    export::{Export, ExportTarget},
    output,
    query::{self, Query},
    store::{Post, PostStore},
};

type Result<T> = std::result::Result<T, TagsieveError>;

/// Output options for the search command
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Keep only the first N results (after ordering)
    pub limit: Option<usize>,
    /// Print derived file URLs instead of result summaries
    pub urls: bool,
    /// Write matching file URLs to a file, one per line
    pub output: Option<PathBuf>,
    /// Save the matching records as a CSV file
    pub save_csv: Option<PathBuf>,
    /// Write one JSON metadata file per match into this directory
    pub metadata: Option<PathBuf>,
}

/// JSON sidecar written next to downloaded samples by `--metadata`
#[derive(Debug, Serialize)]
struct PostMetadata<'a> {
    id: u64,
    md5: &'a str,
    file_ext: &'a str,
    rating: String,
    score: i64,
    down_score: i64,
    fav_count: i64,
    image_width: i64,
    image_height: i64,
    file_size: i64,
    duration: Option<f64>,
    tags: Vec<&'a str>,
    url: Option<String>,
}

impl<'a> PostMetadata<'a> {
    fn new(post: &'a Post, file_base_url: &str) -> Self {
        let mut tags: Vec<&str> = post.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        Self {
            id: post.id,
            md5: &post.md5,
            file_ext: &post.file_ext,
            rating: post.rating.to_string(),
            score: post.score,
            down_score: post.down_score,
            fav_count: post.fav_count,
            image_width: post.image_width,
            image_height: post.image_height,
            file_size: post.file_size,
            duration: post.duration,
            tags,
            url: post.file_url(file_base_url),
        }
    }
}

/// Execute the search command
///
/// Parses the query, loads the posts snapshot (with the configured
/// prefilter), evaluates, and prints/exports the matches.
///
/// # Errors
/// Returns an error if the query does not parse, the posts export is
/// missing or malformed, or an output file cannot be written.
pub fn execute(config: &AppConfig, raw_query: &str, opts: &SearchOptions, quiet: bool) -> Result<()> {
    let query = query::parse(raw_query)?;
    if query.is_unsatisfiable() {
        tracing::warn!("a tag is both required and excluded; the query can never match");
    }

    let posts_path = Export::new(ExportTarget::Posts, &config.export_dir).local_path();
    let store = PostStore::load(&posts_path, &config.prefilter)?;

    let evaluation = store.evaluate(&query);
    if evaluation.field_errors > 0 {
        tracing::warn!(
            records = evaluation.field_errors,
            "records dropped: a predicate referenced a field they have no value for"
        );
    }

    let shown = opts.limit.unwrap_or(usize::MAX).min(evaluation.len());
    let matches = &evaluation.matches[..shown];

    print_results(&query, matches, evaluation.len(), opts, config, quiet);

    if let Some(path) = &opts.output {
        write_url_file(path, matches, &config.file_base_url)?;
        if !quiet {
            println!("Wrote {} URL(s) to {}", matches.len(), path.display());
        }
    }

    if let Some(path) = &opts.save_csv {
        PostStore::write_csv(path, matches)?;
        if !quiet {
            println!("Saved {} record(s) to {}", matches.len(), path.display());
        }
    }

    if let Some(dir) = &opts.metadata {
        write_metadata(dir, matches, &config.file_base_url)?;
        if !quiet {
            println!("Wrote {} metadata file(s) to {}", matches.len(), dir.display());
        }
    }

    Ok(())
}

fn print_results(
    query: &Query,
    matches: &[&Post],
    total: usize,
    opts: &SearchOptions,
    config: &AppConfig,
    quiet: bool,
) {
    if matches.is_empty() {
        if !quiet {
            println!("No posts found matching the query");
        }
        return;
    }

    if !quiet {
        let limited = if matches.len() < total {
            format!(" (showing {})", matches.len())
        } else {
            String::new()
        };
        println!(
            "Found {} post(s) matching {} tag clause(s) and {} predicate(s){}:",
            total,
            query.required.len() + query.excluded.len() + query.optional.len(),
            query.predicates.len(),
            limited
        );
    }

    for post in matches {
        if opts.urls {
            match post.file_url(&config.file_base_url) {
                Some(url) => println!("{url}"),
                None => tracing::warn!(id = post.id, "post has no usable content hash"),
            }
        } else {
            println!("{}", output::post_line(post, quiet));
        }
    }
}

/// One URL per line, the format bulk downloaders expect.
fn write_url_file(path: &PathBuf, matches: &[&Post], file_base_url: &str) -> Result<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for post in matches {
        if let Some(url) = post.file_url(file_base_url) {
            writeln!(writer, "{url}")?;
        } else {
            tracing::warn!(id = post.id, "skipping post with no usable content hash");
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_metadata(dir: &PathBuf, matches: &[&Post], file_base_url: &str) -> Result<()> {
    fs::create_dir_all(dir)?;
    for post in matches {
        let file = fs::File::create(dir.join(format!("{}.json", post.id)))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &PostMetadata::new(post, file_base_url))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Rating;
    use crate::testing::PostBuilder;

    #[test]
    fn test_metadata_shape() {
        let post = PostBuilder::new(31337)
            .tags(&["wolf", "bear"])
            .rating(Rating::Explicit)
            .score(42)
            .build();
        let metadata = PostMetadata::new(&post, "https://static.example.net/data");

        assert_eq!(metadata.id, 31337);
        assert_eq!(metadata.rating, "e");
        assert_eq!(metadata.tags, vec!["bear", "wolf"]);
        let url = metadata.url.expect("fixture md5 is shardable");
        assert!(url.starts_with("https://static.example.net/data/"));
        assert!(url.ends_with(".jpg"));
    }

    #[test]
    fn test_write_url_file_skips_short_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");

        let good = PostBuilder::new(1).build();
        let bad = PostBuilder::new(2).md5("xx").build();
        let matches = vec![&good, &bad];

        write_url_file(&path, &matches, "https://static.example.net/data").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains(&good.md5));
    }

    #[test]
    fn test_write_metadata_one_file_per_post() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("meta");

        let first = PostBuilder::new(10).tags(&["wolf"]).build();
        let second = PostBuilder::new(20).tags(&["fox"]).build();
        let matches = vec![&first, &second];

        write_metadata(&out, &matches, "https://static.example.net/data").unwrap();
        assert!(out.join("10.json").exists());
        assert!(out.join("20.json").exists());

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("10.json")).unwrap()).unwrap();
        assert_eq!(parsed["id"], 10);
        assert_eq!(parsed["tags"][0], "wolf");
    }
}

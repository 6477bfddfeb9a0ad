//! Output formatting for CLI display
//!
//! This module provides utilities for formatting output in the CLI,
//! including result lines, human-readable sizes and rating colorization.

use byte_unit::{Byte, UnitType};
use colored::Colorize;

use crate::query::Rating;
use crate::store::Post;

/// Number of tags shown on a result line before truncation
const TAG_PREVIEW: usize = 8;

/// Format a byte count for humans
#[must_use]
pub fn human_size(bytes: u64) -> String {
    Byte::from_u64(bytes)
        .get_appropriate_unit(UnitType::Decimal)
        .to_string()
}

/// Color a rating letter by severity
#[must_use]
pub fn colorize_rating(rating: Rating) -> String {
    let letter = rating.to_string();
    match rating {
        Rating::Safe => letter.green().to_string(),
        Rating::Questionable => letter.yellow().to_string(),
        Rating::Explicit => letter.red().to_string(),
    }
}

/// Format one matching post for display
///
/// Quiet mode prints just the id, good for piping into other tools.
#[must_use]
pub fn post_line(post: &Post, quiet: bool) -> String {
    if quiet {
        return post.id.to_string();
    }

    let mut tag_list: Vec<&str> = post.tags.iter().map(String::as_str).collect();
    tag_list.sort_unstable();
    let shown = tag_list.len().min(TAG_PREVIEW);
    let mut tags = tag_list[..shown].join(" ");
    if tag_list.len() > shown {
        tags.push_str(&format!(" (+{})", tag_list.len() - shown));
    }

    format!(
        "  #{} [{}] {}x{} score:{} fav:{} {} | {}",
        post.id,
        colorize_rating(post.rating),
        post.image_width,
        post.image_height,
        post.score,
        post.fav_count,
        human_size(post.file_size.max(0) as u64),
        tags
    )
}

/// Format a tag index entry for display
#[must_use]
pub fn tag_line(name: &str, category: &str, post_count: i64, quiet: bool) -> String {
    if quiet {
        name.to_string()
    } else {
        format!("  {name} [{category}] used by {post_count} post(s)")
    }
}

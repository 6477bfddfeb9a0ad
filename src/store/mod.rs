//! In-memory snapshot of the posts export
//!
//! A [`PostStore`] is one immutable load of the posts CSV dump. Records are
//! decoded streaming from the gzipped file, run through a configurable
//! [`Prefilter`] (the cheap cleaning pass: extensions, dimensions, status
//! flags, blocked tags), and then held in memory for query evaluation.
//! Refreshing the dataset means loading a new store and dropping the old
//! one; a store is never mutated in place.

pub mod error;
pub mod tagindex;

pub use error::StoreError;
pub use tagindex::{Category, TagIndex, TagInfo};

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};

use crate::output::human_size;
use crate::query::evaluator::{Evaluation, Record, evaluate};
use crate::query::types::{Field, Query, Rating};
use crate::tags;

/// One post from the dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: u64,
    /// Content hash; together with `file_ext` this is all a downloader
    /// needs to derive the file URL.
    pub md5: String,
    pub file_ext: String,
    pub tags: HashSet<String>,
    pub rating: Rating,
    pub score: i64,
    pub down_score: i64,
    pub fav_count: i64,
    pub image_width: i64,
    pub image_height: i64,
    pub file_size: i64,
    /// Seconds; only present for videos/animations
    pub duration: Option<f64>,
    pub is_deleted: bool,
    pub is_pending: bool,
    pub is_flagged: bool,
}

impl Post {
    /// Derive the static-file URL for this post.
    ///
    /// The server shards files into two directory levels taken from the
    /// hash prefix: `<base>/<md5[0..2]>/<md5[2..4]>/<md5>.<ext>`.
    ///
    /// Returns `None` when the hash is too short to shard (deleted posts
    /// can carry an empty hash).
    #[must_use]
    pub fn file_url(&self, base: &str) -> Option<String> {
        let first = self.md5.get(0..2)?;
        let second = self.md5.get(2..4)?;
        Some(format!(
            "{}/{}/{}/{}.{}",
            base.trim_end_matches('/'),
            first,
            second,
            self.md5,
            self.file_ext
        ))
    }
}

impl Record for Post {
    fn tags(&self) -> &HashSet<String> {
        &self.tags
    }

    #[allow(clippy::cast_precision_loss)]
    fn field(&self, field: Field) -> Option<f64> {
        match field {
            Field::Id => Some(self.id as f64),
            Field::Score => Some(self.score as f64),
            Field::DownScore => Some(self.down_score as f64),
            Field::FavCount => Some(self.fav_count as f64),
            Field::ImageWidth => Some(self.image_width as f64),
            Field::ImageHeight => Some(self.image_height as f64),
            Field::FileSize => Some(self.file_size as f64),
            Field::Duration => self.duration,
            Field::Rating => Some(self.rating.rank()),
        }
    }
}

/// Raw CSV row as published in the export. Columns we do not consume are
/// ignored by name-based deserialization.
#[derive(Debug, Deserialize)]
struct RawPost {
    id: u64,
    md5: String,
    rating: String,
    image_width: i64,
    image_height: i64,
    tag_string: String,
    fav_count: i64,
    file_ext: String,
    file_size: i64,
    duration: Option<f64>,
    is_deleted: String,
    is_pending: String,
    is_flagged: String,
    score: i64,
    down_score: i64,
}

impl TryFrom<RawPost> for Post {
    type Error = StoreError;

    fn try_from(raw: RawPost) -> Result<Self, Self::Error> {
        let rating = raw.rating.parse::<Rating>().map_err(|()| StoreError::InvalidRecord {
            id: raw.id,
            reason: format!("unknown rating '{}'", raw.rating),
        })?;

        Ok(Self {
            id: raw.id,
            tags: tags::tag_set(&raw.tag_string),
            rating,
            is_deleted: flag(raw.id, "is_deleted", &raw.is_deleted)?,
            is_pending: flag(raw.id, "is_pending", &raw.is_pending)?,
            is_flagged: flag(raw.id, "is_flagged", &raw.is_flagged)?,
            md5: raw.md5,
            file_ext: raw.file_ext,
            score: raw.score,
            down_score: raw.down_score,
            fav_count: raw.fav_count,
            image_width: raw.image_width,
            image_height: raw.image_height,
            file_size: raw.file_size,
            duration: raw.duration,
        })
    }
}

fn flag(id: u64, column: &str, value: &str) -> Result<bool, StoreError> {
    match value {
        "t" => Ok(true),
        "f" => Ok(false),
        other => Err(StoreError::InvalidRecord {
            id,
            reason: format!("column {column} holds '{other}', expected 't' or 'f'"),
        }),
    }
}

/// Load-time cleaning pass applied to every record before it enters the
/// snapshot. All criteria are optional; the default keeps everything
/// except deleted/pending/flagged posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Prefilter {
    /// Keep only these file extensions (empty means all)
    pub allowed_exts: Vec<String>,
    pub min_width: i64,
    pub min_height: i64,
    pub min_score: Option<i64>,
    pub min_fav_count: Option<i64>,
    /// Drop any post carrying one of these tags
    pub blocked_tags: Vec<String>,
    pub skip_deleted: bool,
    pub skip_pending: bool,
    pub skip_flagged: bool,
}

impl Default for Prefilter {
    fn default() -> Self {
        Self {
            allowed_exts: Vec::new(),
            min_width: 0,
            min_height: 0,
            min_score: None,
            min_fav_count: None,
            blocked_tags: Vec::new(),
            skip_deleted: true,
            skip_pending: true,
            skip_flagged: true,
        }
    }
}

impl Prefilter {
    /// Decide whether a decoded record enters the snapshot.
    #[must_use]
    pub fn keeps(&self, post: &Post) -> bool {
        if self.skip_deleted && post.is_deleted {
            return false;
        }
        if self.skip_pending && post.is_pending {
            return false;
        }
        if self.skip_flagged && post.is_flagged {
            return false;
        }
        if !self.allowed_exts.is_empty()
            && !self.allowed_exts.iter().any(|ext| *ext == post.file_ext)
        {
            return false;
        }
        if post.image_width < self.min_width || post.image_height < self.min_height {
            return false;
        }
        if let Some(min) = self.min_score
            && post.score < min
        {
            return false;
        }
        if let Some(min) = self.min_fav_count
            && post.fav_count < min
        {
            return false;
        }
        if self.blocked_tags.iter().any(|tag| post.tags.contains(tag)) {
            return false;
        }
        true
    }
}

/// One immutable snapshot of the posts dataset.
#[derive(Debug, Default)]
pub struct PostStore {
    posts: Vec<Post>,
}

impl PostStore {
    /// Build a store from already-decoded posts. Input order is preserved
    /// and becomes the store's stable iteration order.
    #[must_use]
    pub fn from_posts(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    /// Load and prefilter a gzipped CSV posts export.
    ///
    /// Records are decoded streaming; a malformed record (missing numeric
    /// column, bad flag char, unknown rating) aborts the load with row
    /// context rather than being silently defaulted.
    ///
    /// # Errors
    /// Returns [`StoreError::MissingExport`] when the file does not exist,
    /// or a decode error for the first invalid record.
    pub fn load(path: &Path, prefilter: &Prefilter) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::MissingExport(path.to_path_buf()));
        }

        let started = Instant::now();
        let reader = MultiGzDecoder::new(BufReader::new(File::open(path)?));
        let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);

        let mut posts = Vec::new();
        let mut dropped: u64 = 0;
        let mut dropped_bytes: u64 = 0;

        for row in csv_reader.deserialize::<RawPost>() {
            let post = Post::try_from(row?)?;
            if prefilter.keeps(&post) {
                posts.push(post);
            } else {
                dropped += 1;
                dropped_bytes += post.file_size.max(0) as u64;
            }
        }

        let store = Self { posts };
        tracing::info!(
            kept = store.len(),
            dropped,
            dropped_size = %human_size(dropped_bytes),
            elapsed = ?started.elapsed(),
            "loaded posts export from {}",
            path.display()
        );
        Ok(store)
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Combined size of all files referenced by the snapshot.
    #[must_use]
    pub fn total_file_size(&self) -> u64 {
        self.posts.iter().map(|post| post.file_size.max(0) as u64).sum()
    }

    /// Evaluate a parsed query against this snapshot.
    #[must_use]
    pub fn evaluate(&self, query: &Query) -> Evaluation<'_, Post> {
        evaluate(query, &self.posts)
    }

    /// Re-export a subset of the snapshot as a plain CSV file with the
    /// columns this tool consumes, tags re-joined into a `tag_string`.
    ///
    /// # Errors
    /// Returns an error when the file cannot be written.
    pub fn write_csv(path: &Path, posts: &[&Post]) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(path)?;
        for post in posts {
            let mut tag_list: Vec<&str> = post.tags.iter().map(String::as_str).collect();
            tag_list.sort_unstable();
            writer.serialize(CsvPost {
                id: post.id,
                md5: &post.md5,
                rating: post.rating.to_string(),
                image_width: post.image_width,
                image_height: post.image_height,
                tag_string: tag_list.join(" "),
                fav_count: post.fav_count,
                file_ext: &post.file_ext,
                file_size: post.file_size,
                duration: post.duration,
                score: post.score,
                down_score: post.down_score,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Row shape used when re-exporting a filtered snapshot.
#[derive(Debug, Serialize)]
struct CsvPost<'a> {
    id: u64,
    md5: &'a str,
    rating: String,
    image_width: i64,
    image_height: i64,
    tag_string: String,
    fav_count: i64,
    file_ext: &'a str,
    file_size: i64,
    duration: Option<f64>,
    score: i64,
    down_score: i64,
}

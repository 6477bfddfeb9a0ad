//! Tag metadata index built from the tags export
//!
//! The tags dump maps every tag name to a category and a usage count.
//! Loading it is optional for searching but powers tag lookup and
//! category listings.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use flate2::read::MultiGzDecoder;
use serde::Deserialize;

use super::StoreError;
use crate::tags;

/// Tag category, with the numeric codes used by the export.
///
/// The codes are not contiguous: 2 is unassigned upstream.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    General,
    Artist,
    Copyright,
    Character,
    Species,
    Invalid,
    Meta,
    Lore,
}

impl Category {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::General => 0,
            Self::Artist => 1,
            Self::Copyright => 3,
            Self::Character => 4,
            Self::Species => 5,
            Self::Invalid => 6,
            Self::Meta => 7,
            Self::Lore => 8,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::General),
            1 => Some(Self::Artist),
            3 => Some(Self::Copyright),
            4 => Some(Self::Character),
            5 => Some(Self::Species),
            6 => Some(Self::Invalid),
            7 => Some(Self::Meta),
            8 => Some(Self::Lore),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Artist => "artist",
            Self::Copyright => "copyright",
            Self::Character => "character",
            Self::Species => "species",
            Self::Invalid => "invalid",
            Self::Meta => "meta",
            Self::Lore => "lore",
        }
    }

    pub const ALL: [Self; 8] = [
        Self::General,
        Self::Artist,
        Self::Copyright,
        Self::Character,
        Self::Species,
        Self::Invalid,
        Self::Meta,
        Self::Lore,
    ];
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or(())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Index entry for one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    pub category: Category,
    pub post_count: i64,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    id: u64,
    name: String,
    category: u8,
    post_count: i64,
}

/// Lookup table from tag name to category and usage count.
#[derive(Debug, Default)]
pub struct TagIndex {
    entries: HashMap<String, TagInfo>,
}

impl TagIndex {
    /// Load the gzipped CSV tags export.
    ///
    /// # Errors
    /// Returns [`StoreError::MissingExport`] when the file does not exist,
    /// or a decode error for the first invalid record.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::MissingExport(path.to_path_buf()));
        }

        let reader = MultiGzDecoder::new(BufReader::new(File::open(path)?));
        let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);

        let mut entries = HashMap::new();
        for row in csv_reader.deserialize::<RawTag>() {
            let raw = row?;
            let category =
                Category::from_code(raw.category).ok_or_else(|| StoreError::InvalidRecord {
                    id: raw.id,
                    reason: format!("unknown tag category code {}", raw.category),
                })?;
            entries.insert(
                tags::normalize(&raw.name),
                TagInfo { category, post_count: raw.post_count },
            );
        }

        tracing::info!(tags = entries.len(), "loaded tags export from {}", path.display());
        Ok(Self { entries })
    }

    #[must_use]
    pub fn from_entries(entries: HashMap<String, TagInfo>) -> Self {
        Self { entries }
    }

    /// Look up a tag by (normalized) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TagInfo> {
        self.entries.get(&tags::normalize(name))
    }

    /// All tags of one category with at least `min_posts` uses, sorted by
    /// descending usage (name-ascending for ties).
    #[must_use]
    pub fn by_category(&self, category: Category, min_posts: i64) -> Vec<(&str, &TagInfo)> {
        let mut matches: Vec<(&str, &TagInfo)> = self
            .entries
            .iter()
            .filter(|(_, info)| info.category == category && info.post_count >= min_posts)
            .map(|(name, info)| (name.as_str(), info))
            .collect();
        matches.sort_by(|a, b| b.1.post_count.cmp(&a.1.post_count).then(a.0.cmp(b.0)));
        matches
    }

    /// Number of tags per category across the whole index.
    #[must_use]
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let count = self
                    .entries
                    .values()
                    .filter(|info| info.category == category)
                    .count();
                (category, count)
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

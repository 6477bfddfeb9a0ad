//! Testing utilities for tagsieve
//!
//! Provides a builder for `Post` fixtures so tests can construct records
//! with only the fields they care about.
//!
//! Only available when compiled with `cfg(test)`.

use crate::query::Rating;
use crate::store::Post;
use crate::tags;

/// Builder for `Post` test fixtures
///
/// Defaults to a kept-by-default post: safe rating, no tags, zeroed
/// counters, a shardable deterministic hash derived from the id, and no
/// status flags set.
///
/// # Examples
/// ```
/// # use tagsieve::testing::PostBuilder;
/// let post = PostBuilder::new(1).tags(&["wolf"]).score(10).build();
/// assert!(post.tags.contains("wolf"));
/// ```
pub struct PostBuilder {
    post: Post,
}

impl PostBuilder {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            post: Post {
                id,
                md5: format!("{id:032x}"),
                file_ext: "jpg".to_string(),
                tags: std::collections::HashSet::new(),
                rating: Rating::Safe,
                score: 0,
                down_score: 0,
                fav_count: 0,
                image_width: 1000,
                image_height: 1000,
                file_size: 1024,
                duration: None,
                is_deleted: false,
                is_pending: false,
                is_flagged: false,
            },
        }
    }

    #[must_use]
    pub fn tags(mut self, names: &[&str]) -> Self {
        self.post.tags = names.iter().map(|name| tags::normalize(name)).collect();
        self
    }

    #[must_use]
    pub fn md5(mut self, md5: &str) -> Self {
        self.post.md5 = md5.to_string();
        self
    }

    #[must_use]
    pub fn ext(mut self, ext: &str) -> Self {
        self.post.file_ext = ext.to_string();
        self
    }

    #[must_use]
    pub const fn rating(mut self, rating: Rating) -> Self {
        self.post.rating = rating;
        self
    }

    #[must_use]
    pub const fn score(mut self, score: i64) -> Self {
        self.post.score = score;
        self
    }

    #[must_use]
    pub const fn down_score(mut self, down_score: i64) -> Self {
        self.post.down_score = down_score;
        self
    }

    #[must_use]
    pub const fn fav_count(mut self, fav_count: i64) -> Self {
        self.post.fav_count = fav_count;
        self
    }

    #[must_use]
    pub const fn dimensions(mut self, width: i64, height: i64) -> Self {
        self.post.image_width = width;
        self.post.image_height = height;
        self
    }

    #[must_use]
    pub const fn file_size(mut self, file_size: i64) -> Self {
        self.post.file_size = file_size;
        self
    }

    #[must_use]
    pub const fn duration(mut self, seconds: f64) -> Self {
        self.post.duration = Some(seconds);
        self
    }

    #[must_use]
    pub const fn deleted(mut self) -> Self {
        self.post.is_deleted = true;
        self
    }

    #[must_use]
    pub const fn pending(mut self) -> Self {
        self.post.is_pending = true;
        self
    }

    #[must_use]
    pub const fn flagged(mut self) -> Self {
        self.post.is_flagged = true;
        self
    }

    #[must_use]
    pub fn build(self) -> Post {
        self.post
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_are_kept_by_default() {
        let post = PostBuilder::new(1).build();
        assert_eq!(post.id, 1);
        assert_eq!(post.md5.len(), 32);
        assert!(!post.is_deleted);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_builder_normalizes_tags() {
        let post = PostBuilder::new(1).tags(&["Wolf", "BEAR"]).build();
        assert!(post.tags.contains("wolf"));
        assert!(post.tags.contains("bear"));
    }
}

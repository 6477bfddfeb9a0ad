//! The query model: fields, comparators, predicates and the `Query` aggregate
//!
//! A [`Query`] is built once by the parser and consumed read-only by the
//! evaluator; it is never mutated after construction and can be shared
//! freely across threads.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A named scalar field of a post that queries may compare against or
/// order by.
///
/// The set is closed: unknown names are a parse error, never a silent
/// pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Score,
    DownScore,
    FavCount,
    ImageWidth,
    ImageHeight,
    FileSize,
    /// Only present on videos/animations; still images have no duration.
    Duration,
    /// Enumerated, not numeric: only `=` and `!=` comparisons are valid.
    Rating,
}

impl Field {
    /// Look up a field by its query-string name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "score" => Some(Self::Score),
            "down_score" => Some(Self::DownScore),
            "fav_count" => Some(Self::FavCount),
            "image_width" => Some(Self::ImageWidth),
            "image_height" => Some(Self::ImageHeight),
            "file_size" => Some(Self::FileSize),
            "duration" => Some(Self::Duration),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Score => "score",
            Self::DownScore => "down_score",
            Self::FavCount => "fav_count",
            Self::ImageWidth => "image_width",
            Self::ImageHeight => "image_height",
            Self::FileSize => "file_size",
            Self::Duration => "duration",
            Self::Rating => "rating",
        }
    }

    /// Whether `order:<field>` accepts this field.
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        !matches!(self, Self::Rating)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content rating of a post, as stored in the export's `rating` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rating {
    Safe,
    Questionable,
    Explicit,
}

impl Rating {
    /// Numeric rank used when a rating is compared as a field value.
    #[must_use]
    pub const fn rank(self) -> f64 {
        match self {
            Self::Safe => 0.0,
            Self::Questionable => 1.0,
            Self::Explicit => 2.0,
        }
    }
}

impl FromStr for Rating {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" | "safe" => Ok(Self::Safe),
            "q" | "questionable" => Ok(Self::Questionable),
            "e" | "explicit" => Ok(Self::Explicit),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Safe => "s",
            Self::Questionable => "q",
            Self::Explicit => "e",
        };
        f.write_str(c)
    }
}

/// Comparison operator of a field predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparator {
    /// Parse the operator part of a field token. The empty string means `=`.
    #[must_use]
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "" | "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    /// Equality-class comparators are the only ones valid for enumerated
    /// fields.
    #[must_use]
    pub const fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    #[must_use]
    pub fn compare(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// One `field:op value` constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldPredicate {
    pub field: Field,
    pub comparator: Comparator,
    pub value: f64,
}

/// One `order:<field>[_desc]` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDirective {
    pub field: Field,
    pub descending: bool,
}

/// A parsed search query.
///
/// Tag clauses are grouped by role: every `required` tag must be present,
/// no `excluded` tag may be present, and when `optional` is non-empty at
/// least one of its tags must be present. A tag recorded in conflicting
/// roles is kept in both sets; the evaluator then rejects every record,
/// which is the intended fail-closed behavior for such queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub required: HashSet<String>,
    pub excluded: HashSet<String>,
    pub optional: HashSet<String>,
    pub predicates: Vec<FieldPredicate>,
    pub order: Option<OrderDirective>,
}

impl Query {
    /// True when the tag clauses alone guarantee zero results.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        !self.required.is_disjoint(&self.excluded)
    }

    /// True when the query constrains nothing and would match every record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
            && self.excluded.is_empty()
            && self.optional.is_empty()
            && self.predicates.is_empty()
    }
}

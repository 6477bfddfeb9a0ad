//! Query evaluation against a record snapshot
//!
//! Evaluation is a pure function of the query and the records: the same
//! inputs always produce the same ordered result. The filter pass runs on
//! rayon; indexed parallel iterators preserve input order, so parallelism
//! changes wall-clock time only, never results.

use std::cmp::Ordering;
use std::collections::HashSet;

use rayon::prelude::*;

use crate::query::types::{Field, OrderDirective, Query};

/// The record interface the evaluator needs: a tag set with O(1)
/// membership and named scalar field access.
///
/// `field` returns `None` when the record has no value for that field
/// (e.g. `duration` on a still image).
pub trait Record {
    fn tags(&self) -> &HashSet<String>;
    fn field(&self, field: Field) -> Option<f64>;
}

/// Result of evaluating a query: the matching records in final order plus
/// a count of records dropped because a predicate referenced a field they
/// had no value for.
#[derive(Debug)]
pub struct Evaluation<'a, R> {
    pub matches: Vec<&'a R>,
    pub field_errors: usize,
}

impl<R> Evaluation<'_, R> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Match,
    Reject,
    /// A predicate referenced a field the record has no value for
    FieldError,
}

/// Evaluate `query` against `records`, returning the matching subset in
/// input order, or sorted by the query's order directive when present
/// (stable: equal keys keep input order; records without the order field
/// sort before all valued ones in ascending order).
#[must_use]
pub fn evaluate<'a, R>(query: &Query, records: &'a [R]) -> Evaluation<'a, R>
where
    R: Record + Sync,
{
    let outcomes: Vec<Outcome> = records
        .par_iter()
        .map(|record| outcome(query, record))
        .collect();

    let mut matches = Vec::new();
    let mut field_errors = 0;
    for (record, outcome) in records.iter().zip(outcomes) {
        match outcome {
            Outcome::Match => matches.push(record),
            Outcome::Reject => {}
            Outcome::FieldError => field_errors += 1,
        }
    }

    if let Some(directive) = &query.order {
        sort_matches(&mut matches, directive);
    }

    Evaluation { matches, field_errors }
}

/// Stage order matters: the tag-set checks are cheapest and most
/// discriminating, so predicates only run for records that survive them.
fn outcome<R: Record>(query: &Query, record: &R) -> Outcome {
    let tags = record.tags();

    if !query.required.iter().all(|tag| tags.contains(tag)) {
        return Outcome::Reject;
    }
    if query.excluded.iter().any(|tag| tags.contains(tag)) {
        return Outcome::Reject;
    }
    if !query.optional.is_empty() && !query.optional.iter().any(|tag| tags.contains(tag)) {
        return Outcome::Reject;
    }

    for predicate in &query.predicates {
        match record.field(predicate.field) {
            Some(value) => {
                if !predicate.comparator.compare(value, predicate.value) {
                    return Outcome::Reject;
                }
            }
            None => return Outcome::FieldError,
        }
    }

    Outcome::Match
}

fn sort_matches<R: Record>(matches: &mut [&R], directive: &OrderDirective) {
    matches.sort_by(|a, b| {
        let ordering = compare_keys(a.field(directive.field), b.field(directive.field));
        if directive.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare_keys(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.total_cmp(&b),
    }
}

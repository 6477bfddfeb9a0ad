//! Search-string grammar parser
//!
//! The grammar is a whitespace-separated token stream. Every token is
//! classified up front by [`classify`] using an ordered rule set, so the
//! three overlapping token shapes never fall through into one another:
//!
//! 1. `order:<field>` / `order:<field>_desc` - ordering directive
//!    (ascending by default, `_desc` suffix for descending; when several
//!    appear the last one wins)
//! 2. `<field>:<op><value>` - field predicate, `op` one of
//!    `=` `!=` `>` `>=` `<` `<=` (missing op means `=`)
//! 3. `[+~-]?<name>` - tag clause: `+`/bare is required, `-` excluded,
//!    `~` optional; the name is lowercased
//!
//! Parsing is all-or-nothing: the first bad token fails the whole parse and
//! no partial query is ever produced.

use std::collections::HashSet;

use crate::query::types::{Comparator, Field, FieldPredicate, OrderDirective, Query, Rating};
use crate::tags;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A tag token was empty after stripping its role prefix
    #[error("Empty tag name")]
    EmptyTag,
    /// A `name:` token whose name is neither `order` nor a known field
    #[error("Unknown field: '{0}'")]
    UnknownField(String),
    /// The operator part of a field token is not a valid comparator
    #[error("Invalid comparator in '{0}'")]
    InvalidComparator(String),
    /// The value part of a field token does not parse for that field
    #[error("Invalid value in '{0}'")]
    InvalidNumericValue(String),
}

/// Classification of a single raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// A plain tag token, role prefix still attached
    Tag(&'a str),
    /// `<field>:<rest>` with a recognized field name
    Field { field: Field, rest: &'a str },
    /// `order:<rest>`
    Order(&'a str),
    /// Contains `:` but the head is neither `order` nor a known field
    Invalid(&'a str),
}

/// Classify one token. Field and order shapes are checked before the bare
/// tag shape, so a colon always means "directive or error", never a tag.
pub(crate) fn classify(token: &str) -> TokenKind<'_> {
    match token.split_once(':') {
        Some(("order", rest)) => TokenKind::Order(rest),
        Some((head, rest)) => match Field::parse(head) {
            Some(field) => TokenKind::Field { field, rest },
            None => TokenKind::Invalid(head),
        },
        None => TokenKind::Tag(token),
    }
}

/// Parse a full search string into a [`Query`].
///
/// # Errors
/// Returns the first [`ParseError`] encountered; nothing is returned on a
/// partially valid input.
pub fn parse(input: &str) -> Result<Query, ParseError> {
    let mut required = HashSet::new();
    let mut excluded = HashSet::new();
    let mut optional = HashSet::new();
    let mut predicates = Vec::new();
    let mut order: Option<OrderDirective> = None;

    for token in input.split_whitespace() {
        match classify(token) {
            TokenKind::Order(rest) => {
                let directive = parse_order(rest)?;
                if let Some(previous) = order.replace(directive) {
                    tracing::debug!(
                        dropped = %previous.field,
                        kept = %directive.field,
                        "multiple order directives, last one wins"
                    );
                }
            }
            TokenKind::Field { field, rest } => {
                predicates.push(parse_predicate(field, rest, token)?);
            }
            TokenKind::Tag(raw) => {
                let (set, name) = match raw.split_at(prefix_len(raw)) {
                    ("-", name) => (&mut excluded, name),
                    ("~", name) => (&mut optional, name),
                    (_, name) => (&mut required, name),
                };
                if name.is_empty() {
                    return Err(ParseError::EmptyTag);
                }
                set.insert(tags::normalize(name));
            }
            TokenKind::Invalid(head) => {
                return Err(ParseError::UnknownField(head.to_string()));
            }
        }
    }

    Ok(Query {
        required,
        excluded,
        optional,
        predicates,
        order,
    })
}

fn prefix_len(token: &str) -> usize {
    match token.as_bytes().first() {
        Some(b'+' | b'-' | b'~') => 1,
        _ => 0,
    }
}

fn parse_order(rest: &str) -> Result<OrderDirective, ParseError> {
    let (name, descending) = match rest.strip_suffix("_desc") {
        Some(name) => (name, true),
        None => (rest, false),
    };

    match Field::parse(name) {
        Some(field) if field.is_orderable() => Ok(OrderDirective { field, descending }),
        _ => Err(ParseError::UnknownField(name.to_string())),
    }
}

fn parse_predicate(field: Field, rest: &str, token: &str) -> Result<FieldPredicate, ParseError> {
    let op_len = rest
        .bytes()
        .take_while(|b| matches!(b, b'=' | b'!' | b'<' | b'>'))
        .count();
    let comparator = Comparator::parse(&rest[..op_len])
        .ok_or_else(|| ParseError::InvalidComparator(token.to_string()))?;

    let raw_value = &rest[op_len..];
    if raw_value.is_empty() {
        return Err(ParseError::InvalidNumericValue(token.to_string()));
    }

    let value = if field == Field::Rating {
        // Ratings are an enumeration: only equality comparisons make sense.
        if !comparator.is_equality() {
            return Err(ParseError::InvalidComparator(token.to_string()));
        }
        raw_value
            .parse::<Rating>()
            .map_err(|()| ParseError::InvalidNumericValue(token.to_string()))?
            .rank()
    } else {
        raw_value
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumericValue(token.to_string()))?
    };

    Ok(FieldPredicate {
        field,
        comparator,
        value,
    })
}

//! Raw query parser.
//!
//! Turns the search-bar wire format into a [`Query`]:
//!
//! ```text
//! query     := pair ('+' pair)*
//! pair      := label ':' valueList
//! valueList := value (',' value)*
//! ```
//!
//! Each pair becomes a disjunction over its values; pairs are ANDed. Commas
//! inside a double-quoted value do not split it.
//!
//! Parsing is lenient: a malformed pair is dropped rather than failing the
//! whole query. Dropped fragments are reported through
//! [`Parser::parse_with_diagnostics`] and logged at `debug` level. Only a
//! query with no usable pair at all is an error.

use std::fmt;

use crate::error::{Result, SiftError};
use crate::matcher::WILDCARD;
use crate::query::{collapse, BaseQuery, FieldMatch, Query};

/// Separates pairs.
pub const PAIR_SEPARATOR: char = '+';
/// Separates a label from its values.
pub const LABEL_SEPARATOR: char = ':';
/// Separates values within a pair.
pub const VALUE_SEPARATOR: char = ',';

/// Why a fragment of a raw query was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The pair has no `:`.
    MissingColon,
    /// Nothing precedes the `:`.
    EmptyLabel,
    /// No non-empty value follows the `:` and empty values are not allowed.
    EmptyValue,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::MissingColon => "missing ':' between label and values",
            SkipReason::EmptyLabel => "empty label",
            SkipReason::EmptyValue => "no value",
        })
    }
}

/// A dropped fragment of a raw query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPair {
    /// The fragment as it appeared between `+` separators.
    pub fragment: String,
    /// Why it was dropped.
    pub reason: SkipReason,
}

/// Result of a lenient parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// The parsed query; [`Query::Empty`] if no pair survived.
    pub query: Query,
    /// Label of the last surviving pair.
    pub last_label: Option<String>,
    /// Fragments that were dropped, in input order.
    pub skipped: Vec<SkippedPair>,
}

impl ParseOutcome {
    /// Returns `true` if no pair survived.
    pub fn is_empty(&self) -> bool {
        self.last_label.is_none()
    }
}

/// Raw query parser configuration.
///
/// ```
/// use sift::{Parser, Query};
///
/// let outcome = Parser::new().parse_with_diagnostics("Name:Ann+garbage");
/// assert_eq!(outcome.query, Query::match_field("Name", "Ann"));
/// assert_eq!(outcome.skipped.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    allow_empty_values: bool,
    autocomplete: bool,
}

impl Parser {
    /// Creates a strict parser: empty values are dropped.
    pub fn new() -> Self {
        Parser::default()
    }

    /// Keeps empty values, treating them as the wildcard.
    pub fn allow_empty_values(mut self, allow: bool) -> Self {
        self.allow_empty_values = allow;
        self
    }

    /// Autocomplete mode: empty values are allowed and the last value of the
    /// last pair gets a trailing wildcard and is highlighted.
    pub fn autocomplete(mut self, enabled: bool) -> Self {
        self.autocomplete = enabled;
        if enabled {
            self.allow_empty_values = true;
        }
        self
    }

    /// Parses `raw`, failing with [`SiftError::EmptyQuery`] if it is empty or
    /// no pair survives.
    pub fn parse(&self, raw: &str) -> Result<Query> {
        if raw.is_empty() {
            return Err(SiftError::EmptyQuery);
        }
        let outcome = self.parse_with_diagnostics(raw);
        if outcome.is_empty() {
            return Err(SiftError::EmptyQuery);
        }
        Ok(outcome.query)
    }

    /// Parses `raw` without failing, reporting every dropped fragment.
    pub fn parse_with_diagnostics(&self, raw: &str) -> ParseOutcome {
        let mut pairs: Vec<(String, Vec<String>)> = Vec::new();
        let mut skipped = Vec::new();

        for fragment in split_unquoted(raw, PAIR_SEPARATOR) {
            match self.parse_pair(fragment) {
                Ok(pair) => pairs.push(pair),
                Err(reason) => {
                    tracing::debug!(fragment, %reason, "dropping malformed query pair");
                    skipped.push(SkippedPair {
                        fragment: fragment.to_string(),
                        reason,
                    });
                }
            }
        }

        let last_label = pairs.last().map(|(label, _)| label.clone());
        let pair_count = pairs.len();
        let mut groups = Vec::with_capacity(pair_count);

        for (index, (label, values)) in pairs.into_iter().enumerate() {
            let is_last_pair = index + 1 == pair_count;
            let value_count = values.len();
            let matches = values
                .into_iter()
                .enumerate()
                .map(|(position, value)| {
                    let completing =
                        self.autocomplete && is_last_pair && position + 1 == value_count;
                    Query::Base(BaseQuery::MatchField(self.field_match(
                        &label, value, completing,
                    )))
                })
                .collect();
            groups.push(collapse(matches, Query::Disjunction));
        }

        ParseOutcome {
            query: collapse(groups, Query::Conjunction),
            last_label,
            skipped,
        }
    }

    fn parse_pair(&self, fragment: &str) -> std::result::Result<(String, Vec<String>), SkipReason> {
        let fragment = fragment.trim();
        let (label, values) = fragment
            .split_once(LABEL_SEPARATOR)
            .ok_or(SkipReason::MissingColon)?;
        let label = label.trim();
        if label.is_empty() {
            return Err(SkipReason::EmptyLabel);
        }

        let values: Vec<String> = split_values(values.trim())
            .into_iter()
            .filter(|value| self.allow_empty_values || !value.is_empty())
            .collect();
        if values.is_empty() {
            return Err(SkipReason::EmptyValue);
        }
        Ok((label.to_string(), values))
    }

    fn field_match(&self, label: &str, value: String, completing: bool) -> FieldMatch {
        let value = if completing {
            format!("{value}{WILDCARD}")
        } else if value.is_empty() {
            WILDCARD.to_string()
        } else {
            value
        };
        FieldMatch {
            label: label.to_string(),
            value,
            highlight: completing,
        }
    }
}

/// Splits a value list on commas that are not inside double quotes.
fn split_values(values: &str) -> Vec<String> {
    split_unquoted(values, VALUE_SEPARATOR)
        .into_iter()
        .map(|value| value.trim().to_string())
        .collect()
}

/// Splits `raw` on every `separator` that is not inside double quotes.
/// Quotes are kept in the pieces.
fn split_unquoted(raw: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut quoted = false;

    for (i, c) in raw.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            pieces.push(&raw[start..i]);
            start = i + c.len_utf8();
        }
    }
    pieces.push(&raw[start..]);
    pieces
}

/// Parses a raw query strictly.
///
/// Fails with [`SiftError::EmptyQuery`] if `raw` is empty or every pair in it
/// is malformed.
///
/// ```
/// use sift::{parse_raw_query, Query};
///
/// let query = parse_raw_query("Name:Ann+Tag:vip,staff").unwrap();
/// assert_eq!(
///     query,
///     Query::Conjunction(vec![
///         Query::match_field("Name", "Ann"),
///         Query::match_any("Tag", &["vip", "staff"]),
///     ])
/// );
/// assert!(parse_raw_query("").is_err());
/// ```
pub fn parse_raw_query(raw: &str) -> Result<Query> {
    Parser::new().parse(raw)
}

/// Like [`parse_raw_query`], but an empty string yields [`Query::Empty`],
/// which matches everything.
pub fn parse_raw_query_or_empty(raw: &str) -> Result<Query> {
    if raw.is_empty() {
        return Ok(Query::Empty);
    }
    parse_raw_query(raw)
}

/// Parses a query being typed into a search bar.
///
/// Returns the query and the label of the last pair, the field being
/// completed. The value being typed becomes a highlighted prefix match.
///
/// ```
/// use sift::{parse_autocomplete_query, FieldMatch, Query, BaseQuery};
///
/// let (query, label) = parse_autocomplete_query("Name:An").unwrap();
/// assert_eq!(label, "Name");
/// assert_eq!(
///     query,
///     Query::Base(BaseQuery::MatchField(FieldMatch::new("Name", "An*").highlighted()))
/// );
/// ```
pub fn parse_autocomplete_query(raw: &str) -> Result<(Query, String)> {
    if raw.is_empty() {
        return Err(SiftError::EmptyQuery);
    }
    let outcome = Parser::new().autocomplete(true).parse_with_diagnostics(raw);
    match outcome.last_label {
        Some(label) => Ok((outcome.query, label)),
        None => Err(SiftError::EmptyQuery),
    }
}

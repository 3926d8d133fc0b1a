//! Match results for highlighting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Values that matched during one predicate evaluation, keyed by the wire
/// path of the field they were found in.
///
/// Each evaluation produces a fresh result. Values keep the order in which
/// they were found; a value already recorded under a key is not repeated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchResult {
    matches: BTreeMap<String, Vec<String>>,
}

impl MatchResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        MatchResult::default()
    }

    /// Records a matched value under `path`.
    pub fn record(&mut self, path: &str, value: String) {
        let values = self.matches.entry(path.to_string()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Adds every value of `other` to this result.
    pub fn merge(&mut self, other: MatchResult) {
        for (path, values) in other.matches {
            for value in values {
                self.record(&path, value);
            }
        }
    }

    /// Values matched under `path`.
    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.matches.get(path).map(Vec::as_slice)
    }

    /// Returns `true` if nothing was recorded.
    ///
    /// A predicate can match without recording anything, for example
    /// through an unknown label.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of distinct paths with matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Iterates over paths and their values in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.matches
            .iter()
            .map(|(path, values)| (path.as_str(), values.as_slice()))
    }

    /// Consumes the result, returning the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.matches
    }
}

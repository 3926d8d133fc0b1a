//! Error types for the sift crate.

use thiserror::Error;

/// Errors that can occur when parsing or compiling queries.
///
/// Only structural problems are errors. Unknown field labels and literals
/// that do not parse for a field's type are absorbed by the compiled
/// predicate instead.
#[derive(Debug, Error)]
pub enum SiftError {
    /// The raw query was empty or none of its pairs could be parsed.
    #[error("empty query")]
    EmptyQuery,

    /// A query node this engine cannot evaluate.
    #[error("unrecognized query node type: {0}")]
    UnrecognizedQuery(String),

    /// Document-id queries need an index.
    #[error("DocID queries require an index and cannot be evaluated as an in-memory predicate")]
    DocIdsUnsupported,

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Result type for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;

//! Comparison operators for numeric and enum leaves.
//!
//! A numeric or enum query value may carry a leading operator (`>=3`,
//! `<HIGH`). [`Op::split`] peels it off; values without one compare for
//! equality.

use std::cmp::Ordering;

/// Comparison operator prefixed to a query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Op {
    /// Equal. Written `=` or omitted.
    #[default]
    Eq,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Gte,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Lte,
}

impl Op {
    /// Splits a leading operator off `value`.
    ///
    /// Returns the operator and the trimmed remainder. Values without an
    /// operator yield [`Op::Eq`] and the whole (trimmed) value.
    ///
    /// ```
    /// use sift::Op;
    ///
    /// assert_eq!(Op::split(">= 10"), (Op::Gte, "10"));
    /// assert_eq!(Op::split("7"), (Op::Eq, "7"));
    /// ```
    pub fn split(value: &str) -> (Op, &str) {
        // Two-character operators first so ">=" is not read as ">".
        const PREFIXES: [(&str, Op); 5] = [
            (">=", Op::Gte),
            ("<=", Op::Lte),
            (">", Op::Gt),
            ("<", Op::Lt),
            ("=", Op::Eq),
        ];
        let value = value.trim();
        for (prefix, op) in PREFIXES {
            if let Some(rest) = value.strip_prefix(prefix) {
                return (op, rest.trim());
            }
        }
        (Op::Eq, value)
    }

    /// Evaluates a comparison given an ordering result.
    ///
    /// The ordering is that of the record value relative to the query value.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
        }
    }

    /// Returns the textual form of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Leaf value matchers.
//!
//! A [`LeafMatcher`] is compiled once from a query literal and the kind of
//! the leaf it will be applied to, then tested against leaf values.
//!
//! | Kind | Literal syntax |
//! |------|----------------|
//! | any | `*` matches any present value; `!` prefix negates |
//! | String | case-insensitive equality; `"quoted"` is case-sensitive; `a*b` is a glob; `r/re` is a regex |
//! | Number | optional `<`, `<=`, `>`, `>=`, `=` prefix |
//! | Bool | `true` / `false`, any case |
//! | Enum | symbolic name, any case; with an operator, compares discriminants |
//!
//! Globs and regexes are case-insensitive and must match the whole value.
//! Literals that cannot apply to the leaf kind (`abc` against a number)
//! compile to a matcher that never matches.

use regex::Regex;

use crate::error::Result;
use crate::op::Op;
use crate::shape::LeafKind;
use crate::value::{Number, Value};

/// Matches any present value.
pub const WILDCARD: &str = "*";
/// Inverts the rest of the literal.
pub const NEGATION: &str = "!";
/// Introduces a regular expression.
pub const REGEX_PREFIX: &str = "r/";

/// A compiled test for one leaf value.
#[derive(Debug, Clone)]
pub enum LeafMatcher {
    /// Matches every value.
    Any,
    /// Matches nothing.
    Never,
    /// Matches what the inner matcher does not.
    Not(Box<LeafMatcher>),
    /// Case-insensitive string equality (stored lowercased).
    StringEq(String),
    /// Case-sensitive string equality.
    StringExact(String),
    /// Anchored pattern over strings.
    Pattern(Regex),
    /// Numeric comparison.
    Number(Op, Number),
    /// Boolean equality.
    Bool(bool),
    /// Case-insensitive enum name equality (stored lowercased).
    EnumName(String),
    /// Enum discriminant comparison.
    EnumOrder(Op, i64),
}

impl LeafMatcher {
    /// Compiles `literal` for leaves of `kind`.
    ///
    /// Only an invalid regular expression is an error.
    pub fn compile(kind: LeafKind, literal: &str) -> Result<LeafMatcher> {
        let literal = literal.trim();
        if let Some(rest) = literal.strip_prefix(NEGATION) {
            return Ok(match LeafMatcher::compile(kind, rest)? {
                LeafMatcher::Never => LeafMatcher::Never,
                inner => LeafMatcher::Not(Box::new(inner)),
            });
        }
        if literal == WILDCARD {
            return Ok(LeafMatcher::Any);
        }
        Ok(match kind {
            LeafKind::String => string_matcher(literal)?,
            LeafKind::Bool => bool_matcher(literal),
            LeafKind::Number => number_matcher(literal),
            LeafKind::Enum(variants) => enum_matcher(variants, literal),
        })
    }

    /// Tests a leaf value. Values of the wrong type never match.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        match (self, value) {
            (LeafMatcher::Any, _) => true,
            (LeafMatcher::Never, _) => false,
            (LeafMatcher::Not(inner), value) => !inner.matches(value),

            (LeafMatcher::StringEq(expected), Value::String(s)) => eq_ignore_case(s, expected),
            (LeafMatcher::StringExact(expected), Value::String(s)) => *s == expected.as_str(),
            (LeafMatcher::Pattern(regex), Value::String(s)) => regex.is_match(s),

            (LeafMatcher::Number(op, expected), Value::Number(n)) => match n.compare(*expected) {
                Some(ordering) => op.eval_ordering(ordering),
                None => false, // NaN comparison
            },

            (LeafMatcher::Bool(expected), Value::Bool(b)) => b == expected,

            (LeafMatcher::EnumName(expected), Value::Enum { name, .. }) => {
                eq_ignore_case(name, expected)
            }
            (LeafMatcher::EnumOrder(op, expected), Value::Enum { discriminant, .. }) => {
                op.eval_ordering(discriminant.cmp(expected))
            }

            // Type mismatch - doesn't match
            _ => false,
        }
    }
}

/// Compares `value` to an already lowercased `lowered` without allocating.
fn eq_ignore_case(value: &str, lowered: &str) -> bool {
    value.chars().flat_map(char::to_lowercase).eq(lowered.chars())
}

fn string_matcher(literal: &str) -> Result<LeafMatcher> {
    if let Some(pattern) = literal.strip_prefix(REGEX_PREFIX) {
        let regex = Regex::new(&format!("(?i)^(?:{pattern})$"))?;
        return Ok(LeafMatcher::Pattern(regex));
    }
    if literal.len() >= 2 && literal.starts_with('"') && literal.ends_with('"') {
        return Ok(LeafMatcher::StringExact(
            literal[1..literal.len() - 1].to_string(),
        ));
    }
    if literal.contains(WILDCARD) {
        let body = literal
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("(?is)^{body}$"))?;
        return Ok(LeafMatcher::Pattern(regex));
    }
    Ok(LeafMatcher::StringEq(literal.to_lowercase()))
}

fn bool_matcher(literal: &str) -> LeafMatcher {
    if literal.eq_ignore_ascii_case("true") {
        LeafMatcher::Bool(true)
    } else if literal.eq_ignore_ascii_case("false") {
        LeafMatcher::Bool(false)
    } else {
        LeafMatcher::Never
    }
}

/// Integers stay integers so that large ids compare exactly.
fn number_matcher(literal: &str) -> LeafMatcher {
    let (op, rest) = Op::split(literal);
    let number = if let Ok(n) = rest.parse::<i64>() {
        Number::I64(n)
    } else if let Ok(n) = rest.parse::<u64>() {
        Number::U64(n)
    } else {
        match rest.parse::<f64>() {
            Ok(n) if !n.is_nan() => Number::F64(n),
            _ => return LeafMatcher::Never,
        }
    };
    LeafMatcher::Number(op, number)
}

fn enum_matcher(variants: &[(&str, i64)], literal: &str) -> LeafMatcher {
    let (op, name) = Op::split(literal);
    if name.is_empty() {
        return LeafMatcher::Never;
    }
    if op == Op::Eq {
        return LeafMatcher::EnumName(name.to_lowercase());
    }
    variants
        .iter()
        .find(|(variant, _)| variant.eq_ignore_ascii_case(name))
        .map_or(LeafMatcher::Never, |(_, discriminant)| {
            LeafMatcher::EnumOrder(op, *discriminant)
        })
}

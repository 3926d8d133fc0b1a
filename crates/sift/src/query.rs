//! Query AST and builder.
//!
//! A [`Query`] is an immutable boolean tree. Trees come either from the raw
//! query parser ([`crate::parse_raw_query`]) or are assembled directly with
//! the constructors here and [`QueryBuilder`].
//!
//! The constructors apply the same collapsing rules as the parser: a group
//! with no children is [`Query::Empty`], a group with one child is that
//! child. Compilation dispatches on node type, so these shapes matter.

use serde::{Deserialize, Serialize};

/// A boolean query tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Matches iff every child matches.
    Conjunction(Vec<Query>),
    /// Matches iff at least one child matches.
    Disjunction(Vec<Query>),
    /// Matches iff all of `must` match and none of `must_not` match.
    Boolean {
        must: Vec<Query>,
        must_not: Vec<Query>,
    },
    /// A leaf condition.
    Base(BaseQuery),
    /// No condition at all. Vacuously true at the root of a query.
    #[default]
    Empty,
}

/// Leaf conditions of a [`Query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseQuery {
    /// One field condition.
    MatchField(FieldMatch),
    /// Several field conditions that must hold on the same nested element.
    MatchLinkedFields(Vec<FieldMatch>),
    /// Membership by document id. Not evaluable without an index.
    DocIds(Vec<String>),
    /// Never matches.
    MatchNone,
}

/// A single `label:value` condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMatch {
    /// Logical field label, matched case-insensitively.
    pub label: String,
    /// Literal value, including any operator or wildcard syntax.
    pub value: String,
    /// Whether the caller wants this match highlighted.
    #[serde(default)]
    pub highlight: bool,
}

impl FieldMatch {
    /// Creates a non-highlighted field condition.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        FieldMatch {
            label: label.into(),
            value: value.into(),
            highlight: false,
        }
    }

    /// Marks this condition for highlighting.
    pub fn highlighted(mut self) -> Self {
        self.highlight = true;
        self
    }
}

impl Query {
    /// Conjunction of `children`, collapsed.
    pub fn conjunction(children: Vec<Query>) -> Query {
        collapse(children, Query::Conjunction)
    }

    /// Disjunction of `children`, collapsed.
    pub fn disjunction(children: Vec<Query>) -> Query {
        collapse(children, Query::Disjunction)
    }

    /// A single field condition.
    pub fn match_field(label: impl Into<String>, value: impl Into<String>) -> Query {
        Query::Base(BaseQuery::MatchField(FieldMatch::new(label, value)))
    }

    /// A disjunction of one field condition per value, collapsed.
    pub fn match_any(label: &str, values: &[&str]) -> Query {
        Query::disjunction(
            values
                .iter()
                .map(|value| Query::match_field(label, *value))
                .collect(),
        )
    }

    /// Field conditions that must hold on the same nested element.
    pub fn match_linked(fields: Vec<FieldMatch>) -> Query {
        Query::Base(BaseQuery::MatchLinkedFields(fields))
    }

    /// Membership by document id.
    pub fn doc_ids<I, S>(ids: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::Base(BaseQuery::DocIds(ids.into_iter().map(Into::into).collect()))
    }

    /// A query that never matches.
    pub fn match_none() -> Query {
        Query::Base(BaseQuery::MatchNone)
    }

    /// `must` holds and none of `must_not` holds.
    pub fn boolean(must: Vec<Query>, must_not: Vec<Query>) -> Query {
        Query::Boolean { must, must_not }
    }

    /// Negation: matches exactly what `query` does not.
    pub fn negate(query: Query) -> Query {
        Query::Boolean {
            must: Vec::new(),
            must_not: vec![query],
        }
    }

    /// Returns `true` for the empty query.
    pub fn is_empty(&self) -> bool {
        matches!(self, Query::Empty)
    }
}

/// Applies the degenerate collapsing rules: no children yields
/// [`Query::Empty`], one child is returned unwrapped.
pub(crate) fn collapse(mut children: Vec<Query>, wrap: fn(Vec<Query>) -> Query) -> Query {
    match children.len() {
        0 => Query::Empty,
        1 => children.remove(0),
        _ => wrap(children),
    }
}

/// Fluent builder for server-generated queries.
///
/// Each added group is ANDed with the others.
///
/// # Example
///
/// ```
/// use sift::{FieldMatch, Query, QueryBuilder};
///
/// let query = QueryBuilder::new()
///     .add_strings("Namespace", ["prod", "stage"])
///     .add_linked([
///         FieldMatch::new("Image", "nginx"),
///         FieldMatch::new("Privileged", "true"),
///     ])
///     .exclude("Cluster", ["legacy"])
///     .build();
///
/// assert!(matches!(query, Query::Boolean { .. }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    must: Vec<Query>,
    must_not: Vec<Query>,
    highlight: bool,
}

impl QueryBuilder {
    /// Creates a new empty builder. An empty builder builds [`Query::Empty`].
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    /// Marks every field condition added afterwards for highlighting.
    pub fn highlighted(mut self) -> Self {
        self.highlight = true;
        self
    }

    /// Requires `label` to match at least one of `values`.
    pub fn add_strings<I, S>(mut self, label: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group = self.field_group(label, values);
        self.must.push(group);
        self
    }

    /// Requires every condition to hold on the same nested element.
    pub fn add_linked<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = FieldMatch>,
    {
        let highlight = self.highlight;
        let fields = fields
            .into_iter()
            .map(|mut field| {
                field.highlight |= highlight;
                field
            })
            .collect();
        self.must.push(Query::match_linked(fields));
        self
    }

    /// Adds an arbitrary sub-query to the required set.
    pub fn add_query(mut self, query: Query) -> Self {
        if !query.is_empty() {
            self.must.push(query);
        }
        self
    }

    /// Excludes records where `label` matches any of `values`.
    pub fn exclude<I, S>(mut self, label: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group = self.field_group(label, values);
        self.must_not.push(group);
        self
    }

    /// Finalizes the query.
    ///
    /// Without exclusions this is the collapsed conjunction of the required
    /// groups; with exclusions it is a [`Query::Boolean`].
    pub fn build(self) -> Query {
        if self.must_not.is_empty() {
            return Query::conjunction(self.must);
        }
        Query::Boolean {
            must: self.must,
            must_not: self.must_not,
        }
    }

    fn field_group<I, S>(&self, label: &str, values: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::disjunction(
            values
                .into_iter()
                .map(|value| {
                    Query::Base(BaseQuery::MatchField(FieldMatch {
                        label: label.to_string(),
                        value: value.into(),
                        highlight: self.highlight,
                    }))
                })
                .collect(),
        )
    }
}

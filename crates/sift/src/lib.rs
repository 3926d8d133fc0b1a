//! Sift - compiles search-bar queries into predicates over Rust structs.
//!
//! A raw query such as `Namespace:prod,stage+Image:nginx*` is parsed into a
//! [`Query`] tree, resolved against the labeled fields of a record type, and
//! compiled into a [`Predicate`] that can be evaluated against any number of
//! records. A successful evaluation returns a [`MatchResult`] listing the
//! values that matched, keyed by field path, for highlighting.
//!
//! # Quick Start
//!
//! ```rust
//! use sift::{PredicateFactory, Searchable};
//!
//! #[derive(Searchable)]
//! struct Image {
//!     #[search(label = "Image")]
//!     name: String,
//! }
//!
//! #[derive(Searchable)]
//! struct Container {
//!     image: Option<Image>,
//!     #[search(label = "Privileged")]
//!     privileged: bool,
//! }
//!
//! #[derive(Searchable)]
//! struct Deployment {
//!     #[search(label = "Deployment")]
//!     name: String,
//!     #[search(label = "Replicas")]
//!     replicas: u32,
//!     containers: Vec<Container>,
//! }
//!
//! let deployments = vec![
//!     Deployment {
//!         name: "web".into(),
//!         replicas: 3,
//!         containers: vec![Container {
//!             image: Some(Image { name: "nginx:1.25".into() }),
//!             privileged: false,
//!         }],
//!     },
//!     Deployment {
//!         name: "proxy".into(),
//!         replicas: 1,
//!         containers: vec![Container {
//!             image: Some(Image { name: "envoy:1.30".into() }),
//!             privileged: true,
//!         }],
//!     },
//! ];
//!
//! let predicate = PredicateFactory::<Deployment>::new()
//!     .compile_raw("Image:nginx*,envoy*+Replicas:>=2")
//!     .unwrap();
//!
//! let matched = predicate.filter(&deployments);
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0].name, "web");
//! ```
//!
//! # Query Semantics
//!
//! ```text
//! query     := pair ('+' pair)*        pairs are ANDed
//! pair      := label ':' valueList     values are ORed
//! valueList := value (',' value)*
//! ```
//!
//! - Labels are resolved case-insensitively through a [`FieldSchema`]
//!   derived from `#[search(label = "...")]` annotations.
//! - A label the schema does not know matches every record.
//! - Lists and maps match if any element (or any key or value) matches.
//! - [`Query::match_linked`] requires its conditions to hold on the same
//!   element of the deepest list or map the fields share.
//!
//! # Value Syntax
//!
//! | Type | Literals |
//! |------|----------|
//! | String | `nginx` (any case), `"Nginx"` (exact), `ngin*` (glob), `r/ng.+x` (regex) |
//! | Number | `5`, `>5`, `>=5`, `<5`, `<=5` |
//! | Bool | `true`, `false` |
//! | Enum | `high`, `>=medium` (by declaration order) |
//!
//! `*` matches any present value and a leading `!` negates.

mod error;
mod matcher;
mod op;
mod parser;
mod predicate;
mod query;
mod result;
mod schema;
mod shape;
mod traits;
mod traverse;
mod value;

#[cfg(test)]
mod testing;

// Re-export public API
pub use error::{Result, SiftError};
pub use matcher::{LeafMatcher, NEGATION, REGEX_PREFIX, WILDCARD};
pub use op::Op;
pub use parser::{
    parse_autocomplete_query, parse_raw_query, parse_raw_query_or_empty, ParseOutcome, Parser,
    SkipReason, SkippedPair, LABEL_SEPARATOR, PAIR_SEPARATOR, VALUE_SEPARATOR,
};
pub use predicate::{Predicate, PredicateFactory};
pub use query::{BaseQuery, FieldMatch, Query, QueryBuilder};
pub use result::MatchResult;
pub use schema::{common_prefix_len, FieldPath, FieldSchema, FieldSchemaBuilder, Step};
pub use shape::{
    FieldShape, LeafKind, Node, RecordShape, Shape, VariantSetShape, VariantShape,
};
pub use traits::{enum_node, Inspect, Record, SearchEnum};
pub use value::{Number, Value};

#[cfg(feature = "derive")]
pub use sift_macros::{SearchEnum, Searchable};

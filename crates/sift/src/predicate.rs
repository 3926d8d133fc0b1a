//! Query compilation.
//!
//! A [`PredicateFactory`] compiles a [`Query`] against the [`FieldSchema`] of
//! one record type into a reusable [`Predicate`]:
//!
//! ```
//! use sift::{PredicateFactory, Searchable};
//!
//! #[derive(Searchable)]
//! struct Person {
//!     #[search(label = "Name")]
//!     name: String,
//!     #[search(label = "Tag")]
//!     tags: Vec<String>,
//! }
//!
//! let factory = PredicateFactory::<Person>::new();
//! let predicate = factory.compile_raw("Name:ann+Tag:vip").unwrap();
//!
//! let ann = Person { name: "Ann".into(), tags: vec!["vip".into()] };
//! let result = predicate.evaluate(&ann).unwrap();
//! assert_eq!(result.get("name"), Some(&["Ann".to_string()][..]));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SiftError};
use crate::matcher::LeafMatcher;
use crate::parser::{parse_raw_query, parse_raw_query_or_empty};
use crate::query::{BaseQuery, FieldMatch, Query};
use crate::result::MatchResult;
use crate::schema::{common_prefix_len, FieldPath, FieldSchema};
use crate::traits::Inspect;
use crate::traverse::{all_of, always, any_of, leaf, matcher, never, wrap, Matcher};

/// Compiles queries into predicates over `T`.
pub struct PredicateFactory<T> {
    schema: Arc<FieldSchema>,
    _marker: PhantomData<fn(&T)>,
}

impl<T> Clone for PredicateFactory<T> {
    fn clone(&self) -> Self {
        PredicateFactory {
            schema: Arc::clone(&self.schema),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PredicateFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFactory")
            .field("type_name", &self.schema.type_name())
            .field("labels", &self.schema.len())
            .finish()
    }
}

impl<T: Inspect + 'static> PredicateFactory<T> {
    /// Creates a factory using the cached schema of `T`.
    pub fn new() -> Self {
        PredicateFactory::with_schema(FieldSchema::of::<T>())
    }
}

impl<T: Inspect + 'static> Default for PredicateFactory<T> {
    fn default() -> Self {
        PredicateFactory::new()
    }
}

impl<T: Inspect> PredicateFactory<T> {
    /// Creates a factory using an externally built schema.
    pub fn with_schema(schema: Arc<FieldSchema>) -> Self {
        PredicateFactory {
            schema,
            _marker: PhantomData,
        }
    }

    /// The schema labels are resolved against.
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Compiles `query`.
    ///
    /// An empty query at the root matches every record.
    pub fn compile(&self, query: &Query) -> Result<Predicate<T>> {
        let matcher = match query {
            Query::Empty => always(),
            query => self.compile_node(query)?,
        };
        Ok(Predicate {
            matcher,
            _marker: PhantomData,
        })
    }

    /// Parses and compiles a raw query. An empty raw query is an error.
    pub fn compile_raw(&self, raw: &str) -> Result<Predicate<T>> {
        self.compile(&parse_raw_query(raw)?)
    }

    /// Parses and compiles a raw query. An empty raw query matches everything.
    pub fn compile_raw_or_empty(&self, raw: &str) -> Result<Predicate<T>> {
        self.compile(&parse_raw_query_or_empty(raw)?)
    }

    fn compile_node(&self, query: &Query) -> Result<Matcher> {
        match query {
            Query::Conjunction(children) => Ok(all_of(self.compile_all(children)?)),
            Query::Disjunction(children) => Ok(any_of(self.compile_all(children)?)),
            Query::Boolean { must, must_not } => {
                let must = all_of(self.compile_all(must)?);
                let must_not = any_of(self.compile_all(must_not)?);
                Ok(matcher(move |node| {
                    let result = must(node)?;
                    match must_not(node) {
                        Some(_) => None,
                        None => Some(result),
                    }
                }))
            }
            Query::Base(base) => self.compile_base(base),
            Query::Empty => Err(SiftError::UnrecognizedQuery(
                "empty query nested inside another query".to_string(),
            )),
        }
    }

    fn compile_all(&self, children: &[Query]) -> Result<Vec<Matcher>> {
        children.iter().map(|child| self.compile_node(child)).collect()
    }

    fn compile_base(&self, base: &BaseQuery) -> Result<Matcher> {
        match base {
            BaseQuery::MatchField(field) => self.compile_field(field),
            BaseQuery::MatchLinkedFields(fields) => self.compile_linked(fields),
            BaseQuery::DocIds(_) => Err(SiftError::DocIdsUnsupported),
            BaseQuery::MatchNone => Ok(never()),
        }
    }

    fn compile_field(&self, field: &FieldMatch) -> Result<Matcher> {
        let Some(path) = self.resolve(&field.label) else {
            return Ok(always());
        };
        Ok(wrap(path.steps(), compile_leaf(path, &field.value)?))
    }

    /// Linked fields must all match within the same element of their deepest
    /// shared list or map.
    fn compile_linked(&self, fields: &[FieldMatch]) -> Result<Matcher> {
        if fields.is_empty() {
            return Err(SiftError::UnrecognizedQuery(
                "linked fields query without fields".to_string(),
            ));
        }

        let mut resolved = Vec::with_capacity(fields.len());
        for field in fields {
            match self.resolve(&field.label) {
                Some(path) => resolved.push((field, path)),
                None => return Ok(always()),
            }
        }

        let paths: Vec<&FieldPath> = resolved.iter().map(|(_, path)| *path).collect();
        let prefix = common_prefix_len(&paths);

        let suffixes = resolved
            .into_iter()
            .map(|(field, path)| {
                Ok(wrap(&path.steps()[prefix..], compile_leaf(path, &field.value)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(wrap(&paths[0].steps()[..prefix], all_of(suffixes)))
    }

    fn resolve(&self, label: &str) -> Option<&FieldPath> {
        let path = self.schema.get(label);
        if path.is_none() {
            debug!(
                label,
                type_name = self.schema.type_name(),
                "unknown field label, clause matches every record"
            );
        }
        path
    }
}

/// Compiles `literal` once per leaf kind the path may end in.
fn compile_leaf(path: &FieldPath, literal: &str) -> Result<Matcher> {
    let tests = path
        .leaves()
        .iter()
        .map(|&kind| Ok((kind, LeafMatcher::compile(kind, literal)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(leaf(path, tests))
}

/// A compiled query over records of type `T`.
///
/// Predicates hold no per-evaluation state and can be shared freely between
/// threads.
pub struct Predicate<T> {
    matcher: Matcher,
    _marker: PhantomData<fn(&T)>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Predicate {
            matcher: Arc::clone(&self.matcher),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

impl<T: Inspect> Predicate<T> {
    /// Evaluates the predicate, returning the matched values on a match.
    pub fn evaluate(&self, item: &T) -> Option<MatchResult> {
        (self.matcher)(&item.node())
    }

    /// Tests if a single item matches.
    pub fn matches(&self, item: &T) -> bool {
        self.evaluate(item).is_some()
    }

    /// Filters a slice, returning references to matching items.
    pub fn filter<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }

    /// Filters and clones matching items.
    pub fn filter_cloned(&self, items: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        items
            .iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect()
    }

    /// Filters a vector in place, keeping only matching items.
    pub fn filter_mut(&self, items: &mut Vec<T>) {
        items.retain(|item| self.matches(item));
    }

    /// Counts the number of matching items.
    pub fn count(&self, items: &[T]) -> usize {
        items.iter().filter(|item| self.matches(item)).count()
    }

    /// Returns `true` if any item matches.
    pub fn any(&self, items: &[T]) -> bool {
        items.iter().any(|item| self.matches(item))
    }

    /// Returns `true` if all items match.
    pub fn all(&self, items: &[T]) -> bool {
        items.iter().all(|item| self.matches(item))
    }

    /// Returns the first matching item.
    pub fn find<'a>(&self, items: &'a [T]) -> Option<&'a T> {
        items.iter().find(|item| self.matches(item))
    }

    /// Returns the index of the first matching item.
    pub fn position(&self, items: &[T]) -> Option<usize> {
        items.iter().position(|item| self.matches(item))
    }

    /// Pairs each matching item with its match result.
    pub fn evaluate_all<'a>(&self, items: &'a [T]) -> Vec<(&'a T, MatchResult)> {
        items
            .iter()
            .filter_map(|item| self.evaluate(item).map(|result| (item, result)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryBuilder;
    use crate::schema::Step;
    use crate::shape::LeafKind;
    use crate::testing::{Container, Deployment, Person, Severity, Source, Volume};

    fn people() -> Vec<Person> {
        vec![
            Person::new("Ann", &["vip", "staff"], 34),
            Person::new("Bob", &["staff"], 51),
            Person::new("Cid", &[], 19),
        ]
    }

    fn person(raw: &str) -> Predicate<Person> {
        PredicateFactory::<Person>::new().compile_raw(raw).unwrap()
    }

    fn deployment(query: &Query) -> Predicate<Deployment> {
        PredicateFactory::<Deployment>::new().compile(query).unwrap()
    }

    fn names<'a>(items: impl IntoIterator<Item = &'a Person>) -> Vec<&'a str> {
        items.into_iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn name_and_tag_scenario() {
        let predicate = person("Name:ann+Tag:vip");
        let ann = Person::new("Ann", &["vip"], 34);

        let result = predicate.evaluate(&ann).unwrap();
        assert_eq!(result.get("name"), Some(&["Ann".to_string()][..]));
        assert_eq!(result.get("tags"), Some(&["vip".to_string()][..]));

        let bob = Person::new("Bob", &["vip"], 34);
        assert!(predicate.evaluate(&bob).is_none());
    }

    #[test]
    fn values_within_a_pair_are_alternatives() {
        let predicate = person("Name:ann,bob");
        assert_eq!(names(predicate.filter(&people())), vec!["Ann", "Bob"]);
    }

    #[test]
    fn numeric_field_comparison() {
        let predicate = person("Age:>30");
        assert_eq!(names(predicate.filter(&people())), vec!["Ann", "Bob"]);
        assert_eq!(person("Age:abc").count(&people()), 0);
    }

    #[test]
    fn labels_resolve_case_insensitively() {
        assert_eq!(person("name:cid").count(&people()), 1);
        assert_eq!(person("NAME:cid").count(&people()), 1);
    }

    #[test]
    fn unknown_label_matches_everything() {
        let predicate = person("Nickname:zed");
        assert!(predicate.all(&people()));
        assert!(predicate.evaluate(&people()[0]).unwrap().is_empty());

        // Only the unknown clause is neutralized.
        assert_eq!(person("Nickname:zed+Name:bob").count(&people()), 1);
    }

    #[test]
    fn empty_root_matches_everything() {
        let factory = PredicateFactory::<Person>::new();
        assert!(factory.compile(&Query::Empty).unwrap().all(&people()));
        assert!(factory.compile_raw_or_empty("").unwrap().all(&people()));
        assert!(matches!(
            factory.compile_raw(""),
            Err(SiftError::EmptyQuery)
        ));
    }

    #[test]
    fn nested_empty_is_rejected() {
        let factory = PredicateFactory::<Person>::new();
        let query = Query::Conjunction(vec![Query::match_field("Name", "ann"), Query::Empty]);
        assert!(matches!(
            factory.compile(&query),
            Err(SiftError::UnrecognizedQuery(_))
        ));
    }

    #[test]
    fn doc_ids_are_rejected() {
        let factory = PredicateFactory::<Person>::new();
        let query = Query::disjunction(vec![
            Query::match_field("Name", "ann"),
            Query::doc_ids(["a", "b"]),
        ]);
        assert!(matches!(
            factory.compile(&query),
            Err(SiftError::DocIdsUnsupported)
        ));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let factory = PredicateFactory::<Person>::new();
        assert!(matches!(
            factory.compile_raw("Name:r/("),
            Err(SiftError::InvalidRegex(_))
        ));
    }

    #[test]
    fn match_none_never_matches() {
        let factory = PredicateFactory::<Person>::new();
        let predicate = factory.compile(&Query::match_none()).unwrap();
        assert!(!predicate.any(&people()));
    }

    #[test]
    fn empty_disjunction_never_matches() {
        let factory = PredicateFactory::<Person>::new();
        let predicate = factory.compile(&Query::Disjunction(vec![])).unwrap();
        assert!(!predicate.any(&people()));
    }

    #[test]
    fn disjunction_reports_every_matching_child() {
        let factory = PredicateFactory::<Person>::new();
        let query = Query::disjunction(vec![
            Query::match_field("Name", "ann"),
            Query::match_field("Tag", "vip"),
            Query::match_field("Age", "<0"),
        ]);
        let result = factory
            .compile(&query)
            .unwrap()
            .evaluate(&people()[0])
            .unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.get("age").is_none());
    }

    #[test]
    fn list_results_accumulate_across_elements() {
        let predicate = person("Tag:*");
        let result = predicate.evaluate(&people()[0]).unwrap();
        assert_eq!(
            result.get("tags"),
            Some(&["vip".to_string(), "staff".to_string()][..])
        );
        // No elements, nothing to match.
        assert!(predicate.evaluate(&people()[2]).is_none());
    }

    #[test]
    fn boolean_excludes_must_not_matches() {
        let query = QueryBuilder::new()
            .add_strings("Tag", ["staff"])
            .exclude("Name", ["bob"])
            .build();
        let predicate = PredicateFactory::<Person>::new().compile(&query).unwrap();
        assert_eq!(names(predicate.filter(&people())), vec!["Ann"]);
    }

    #[test]
    fn negated_query_inverts() {
        let factory = PredicateFactory::<Person>::new();
        let predicate = factory
            .compile(&Query::negate(Query::match_field("Name", "ann")))
            .unwrap();
        assert_eq!(names(predicate.filter(&people())), vec!["Bob", "Cid"]);
    }

    #[test]
    fn nested_list_and_pointer_fields() {
        let web = Deployment::new(
            "web",
            vec![
                Container::new("nginx", "1.25", false),
                Container::new("envoy", "1.30", true),
            ],
        );
        let predicate = deployment(&Query::match_field("Image Name", "envoy"));
        let result = predicate.evaluate(&web).unwrap();
        assert_eq!(
            result.get("containers.image.name"),
            Some(&["envoy".to_string()][..])
        );
    }

    #[test]
    fn linked_fields_must_match_within_one_element() {
        let web = Deployment::new(
            "web",
            vec![
                Container::new("nginx", "1.25", false),
                Container::new("envoy", "1.30", true),
            ],
        );

        let linked = |image: &str, privileged: &str| {
            deployment(&Query::match_linked(vec![
                FieldMatch::new("Image Name", image),
                FieldMatch::new("Privileged", privileged),
            ]))
        };
        assert!(linked("envoy", "true").matches(&web));
        assert!(!linked("nginx", "true").matches(&web));

        // Unlinked, the same pair matches across different containers.
        let unlinked = deployment(&Query::conjunction(vec![
            Query::match_field("Image Name", "nginx"),
            Query::match_field("Privileged", "true"),
        ]));
        assert!(unlinked.matches(&web));
    }

    #[test]
    fn linked_fields_report_full_paths() {
        let web = Deployment::new("web", vec![Container::new("envoy", "1.30", true)]);
        let result = deployment(&Query::match_linked(vec![
            FieldMatch::new("Image Name", "envoy"),
            FieldMatch::new("Image Tag", "1.*"),
        ]))
        .evaluate(&web)
        .unwrap();
        assert_eq!(
            result.get("containers.image.tag"),
            Some(&["1.30".to_string()][..])
        );
        assert_eq!(
            result.get("containers.image.name"),
            Some(&["envoy".to_string()][..])
        );
    }

    #[test]
    fn linked_fields_with_unknown_label_match_everything() {
        let web = Deployment::new("web", vec![]);
        let predicate = deployment(&Query::match_linked(vec![
            FieldMatch::new("Image Name", "envoy"),
            FieldMatch::new("Nope", "x"),
        ]));
        assert!(predicate.matches(&web));
    }

    #[test]
    fn linked_fields_without_fields_are_rejected() {
        let factory = PredicateFactory::<Deployment>::new();
        assert!(matches!(
            factory.compile(&Query::match_linked(vec![])),
            Err(SiftError::UnrecognizedQuery(_))
        ));
    }

    #[test]
    fn map_fields_match_keys_and_values() {
        let mut web = Deployment::new("web", vec![]);
        web.labels.insert("tier".to_string(), "frontend".to_string());

        assert!(deployment(&Query::match_field("Label", "tier")).matches(&web));
        assert!(deployment(&Query::match_field("Label", "front*")).matches(&web));
        assert!(!deployment(&Query::match_field("Label", "backend")).matches(&web));
    }

    #[test]
    fn variant_fields_match_only_the_active_variant() {
        let mut web = Deployment::new("web", vec![]);
        let predicate = deployment(&Query::match_field("Volume Path", "/srv/*"));
        assert!(!predicate.matches(&web));

        web.source = Source::Volume(Box::new(Volume {
            path: "/srv/data".to_string(),
        }));
        assert!(predicate.matches(&web));

        web.source = Source::Replicas(2);
        assert!(!predicate.matches(&web));
    }

    #[test]
    fn enum_fields_by_name_and_order() {
        let mut web = Deployment::new("web", vec![]);
        web.severity = Severity::Medium;

        assert!(deployment(&Query::match_field("Severity", "medium")).matches(&web));
        assert!(deployment(&Query::match_field("Severity", ">low")).matches(&web));
        assert!(!deployment(&Query::match_field("Severity", ">=high")).matches(&web));

        let result = deployment(&Query::match_field("Severity", "medium"))
            .evaluate(&web)
            .unwrap();
        assert_eq!(result.get("severity"), Some(&["MEDIUM".to_string()][..]));
    }

    #[test]
    fn external_schema() {
        let schema = FieldSchema::builder("Person")
            .field(
                "Who",
                FieldPath::new(vec![Step::field("name")], LeafKind::String),
            )
            .build();
        let factory = PredicateFactory::<Person>::with_schema(Arc::new(schema));
        let predicate = factory.compile_raw("who:bob").unwrap();
        assert_eq!(names(predicate.filter(&people())), vec!["Bob"]);
        // Labels from the derived schema are unknown here.
        assert!(factory.compile_raw("Name:bob").unwrap().all(&people()));
    }

    #[test]
    fn collection_utilities() {
        let predicate = person("Tag:staff");
        let mut items = people();

        assert_eq!(predicate.count(&items), 2);
        assert!(predicate.any(&items));
        assert!(!predicate.all(&items));
        assert_eq!(predicate.find(&items).map(|p| p.name.as_str()), Some("Ann"));
        assert_eq!(person("Name:cid").position(&items), Some(2));
        assert_eq!(predicate.filter_cloned(&items).len(), 2);

        let evaluated = predicate.evaluate_all(&items);
        assert_eq!(evaluated.len(), 2);
        assert_eq!(evaluated[1].1.get("tags"), Some(&["staff".to_string()][..]));

        predicate.filter_mut(&mut items);
        assert_eq!(names(&items), vec!["Ann", "Bob"]);
    }

    #[test]
    fn evaluation_is_repeatable_and_leaves_input_untouched() {
        let predicate = person("Name:ann+Tag:v*");
        let items = people();
        let before = items.clone();
        let first = predicate.evaluate(&items[0]);
        let second = predicate.clone().evaluate(&items[0]);
        assert_eq!(first, second);
        assert_eq!(items, before);
    }

    #[test]
    fn predicates_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Predicate<Person>>();
        assert_send_sync::<PredicateFactory<Person>>();

        let predicate = person("Tag:vip");
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let predicate = predicate.clone();
                std::thread::spawn(move || predicate.count(&people()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}

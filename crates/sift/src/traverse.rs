//! Structural wrapping of leaf matchers.
//!
//! A compiled query is a tree of [`Matcher`] closures over [`Node`]s. A leaf
//! matcher tests one primitive; [`wrap`] lifts it through a [`FieldPath`]'s
//! steps, outward from the leaf to the record root, so that the result can be
//! applied to the root node of a record.
//!
//! All matchers are pure: they read the nodes they are given and return a
//! fresh [`MatchResult`] on success.

use std::sync::Arc;

use crate::matcher::LeafMatcher;
use crate::result::MatchResult;
use crate::schema::{FieldPath, Step};
use crate::shape::{LeafKind, Node};

/// A compiled test over a node. `Some` carries the values that matched.
pub(crate) type Matcher = Arc<dyn for<'a> Fn(&Node<'a>) -> Option<MatchResult> + Send + Sync>;

/// Boxes a closure as a [`Matcher`], fixing its higher-ranked signature.
pub(crate) fn matcher<F>(f: F) -> Matcher
where
    F: for<'a> Fn(&Node<'a>) -> Option<MatchResult> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Matches everything without recording anything.
pub(crate) fn always() -> Matcher {
    matcher(|_| Some(MatchResult::new()))
}

/// Matches nothing.
pub(crate) fn never() -> Matcher {
    matcher(|_| None)
}

/// Tests a leaf node, recording its value under the path's wire path.
///
/// `tests` holds one matcher per leaf kind the path may end in; a value is
/// tested by the matcher of its own kind, or by the first one if none fits.
pub(crate) fn leaf(path: &FieldPath, tests: Vec<(LeafKind, LeafMatcher)>) -> Matcher {
    let key = path.wire_path();
    matcher(move |node| {
        let Node::Leaf(value) = node else {
            return None;
        };
        let (_, test) = tests
            .iter()
            .find(|(kind, _)| kind.accepts(value))
            .or(tests.first())?;
        if !test.matches(value) {
            return None;
        }
        let mut result = MatchResult::new();
        result.record(&key, value.to_string());
        Some(result)
    })
}

/// Lifts `inner` through `steps`, innermost step last.
pub(crate) fn wrap(steps: &[Step], inner: Matcher) -> Matcher {
    steps
        .iter()
        .rev()
        .fold(inner, |child, step| wrap_step(step, child))
}

/// Matches iff every child matches; stops at the first that does not.
pub(crate) fn all_of(children: Vec<Matcher>) -> Matcher {
    matcher(move |node| {
        let mut result = MatchResult::new();
        for child in &children {
            result.merge(child(node)?);
        }
        Some(result)
    })
}

/// Matches iff some child matches, collecting every matching child's values.
pub(crate) fn any_of(children: Vec<Matcher>) -> Matcher {
    matcher(move |node| {
        let mut matched: Option<MatchResult> = None;
        for child in &children {
            if let Some(result) = child(node) {
                matched.get_or_insert_with(MatchResult::new).merge(result);
            }
        }
        matched
    })
}

fn wrap_step(step: &Step, child: Matcher) -> Matcher {
    match step.clone() {
        Step::Field(name) => matcher(move |node| match node {
            Node::Record(record) => match record.field(&name) {
                Node::Absent => None,
                value => child(&value),
            },
            _ => None,
        }),
        Step::Pointer => matcher(move |node| match node {
            Node::Pointer(Some(inner)) => child(&**inner),
            _ => None,
        }),
        Step::List => matcher(move |node| match node {
            Node::List(items) => any_node(items.iter(), &child),
            _ => None,
        }),
        // The schema may place the leaf in either the key or the value.
        Step::Map => matcher(move |node| match node {
            Node::Map(entries) => any_node(entries.iter().flat_map(|(k, v)| [k, v]), &child),
            _ => None,
        }),
        Step::Variant(name) => matcher(move |node| match node {
            Node::Variant {
                name: active,
                payload: Some(payload),
            } if *active == name => {
                let payload = match &**payload {
                    Node::Pointer(Some(inner)) => &**inner,
                    other => other,
                };
                // Only structured payloads can be looked inside.
                match payload {
                    Node::Record(_) => child(payload),
                    _ => None,
                }
            }
            _ => None,
        }),
    }
}

/// Existential match over `nodes`, accumulating every match.
fn any_node<'n, 'a: 'n>(
    nodes: impl Iterator<Item = &'n Node<'a>>,
    child: &Matcher,
) -> Option<MatchResult> {
    let mut matched: Option<MatchResult> = None;
    for node in nodes {
        if let Some(result) = child(node) {
            matched.get_or_insert_with(MatchResult::new).merge(result);
        }
    }
    matched
}

//! Field schema registry.
//!
//! A [`FieldSchema`] maps logical labels (`"Image Name"`) to the
//! [`FieldPath`] that reaches the labeled leaf from a record's root. It is
//! built once per type by walking the type's [`Shape`], then cached for the
//! life of the process and never modified.

use std::any::{type_name, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::shape::{LeafKind, RecordShape, Shape, VariantSetShape};
use crate::traits::Inspect;

/// One step from a value to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Access a named struct field.
    Field(String),
    /// Follow an indirection.
    Pointer,
    /// Enter every element of a sequence.
    List,
    /// Enter the key and the value of every map entry.
    Map,
    /// Enter the payload of the named enum variant.
    Variant(String),
}

impl Step {
    /// Shorthand for [`Step::Field`].
    pub fn field(name: impl Into<String>) -> Step {
        Step::Field(name.into())
    }

    /// Shorthand for [`Step::Variant`].
    pub fn variant(name: impl Into<String>) -> Step {
        Step::Variant(name.into())
    }
}

/// Structural path from a record's root to one leaf.
///
/// A map labeled as a whole ends in both its key and its value, so a path
/// may end in leaves of more than one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    steps: Vec<Step>,
    leaves: Vec<LeafKind>,
}

impl FieldPath {
    /// Creates a path ending in a leaf of kind `leaf`.
    pub fn new(steps: Vec<Step>, leaf: LeafKind) -> Self {
        FieldPath {
            steps,
            leaves: vec![leaf],
        }
    }

    /// Adds another kind the path may end in. Known kinds are ignored.
    pub fn or_leaf(mut self, leaf: LeafKind) -> Self {
        self.push_leaf(leaf);
        self
    }

    fn push_leaf(&mut self, leaf: LeafKind) {
        if !self.leaves.contains(&leaf) {
            self.leaves.push(leaf);
        }
    }

    /// The steps, root first.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Kind of the leaf at the end of the path; the first registered one
    /// when there are several.
    pub fn leaf(&self) -> LeafKind {
        self.leaves[0]
    }

    /// Every kind the path may end in, in registration order.
    pub fn leaves(&self) -> &[LeafKind] {
        &self.leaves
    }

    /// Dotted field and variant names, e.g. `containers.image.name`.
    ///
    /// Match results are keyed by this string.
    pub fn wire_path(&self) -> String {
        self.steps
            .iter()
            .filter_map(|step| match step {
                Step::Field(name) | Step::Variant(name) => Some(name.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self.leaves.iter().map(|kind| kind.as_str()).collect();
        write!(f, "{} ({})", self.wire_path(), kinds.join("|"))
    }
}

/// Length of the longest step prefix shared by every path.
pub fn common_prefix_len(paths: &[&FieldPath]) -> usize {
    let Some((first, rest)) = paths.split_first() else {
        return 0;
    };
    first
        .steps
        .iter()
        .enumerate()
        .take_while(|(i, step)| rest.iter().all(|p| p.steps.get(*i) == Some(*step)))
        .count()
}

#[derive(Debug, Clone)]
struct Entry {
    label: String,
    path: FieldPath,
}

/// Immutable map from case-insensitive label to [`FieldPath`].
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    type_name: String,
    fields: BTreeMap<String, Entry>,
}

static SCHEMAS: Lazy<RwLock<HashMap<TypeId, Arc<FieldSchema>>>> = Lazy::new(Default::default);

impl FieldSchema {
    /// Returns the process-wide schema of `T`, building it on first use.
    ///
    /// Concurrent first calls may each build the schema; the first one
    /// stored wins and every caller receives it.
    pub fn of<T: Inspect + 'static>() -> Arc<FieldSchema> {
        let key = TypeId::of::<T>();
        if let Some(schema) = SCHEMAS
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(schema);
        }

        let built = Arc::new(FieldSchema::from_shape(type_name::<T>(), &T::shape()));
        let mut schemas = SCHEMAS.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(schemas.entry(key).or_insert(built))
    }

    /// Builds a schema by walking `shape`.
    pub fn from_shape(type_name: &str, shape: &Shape) -> FieldSchema {
        let mut walker = Walker {
            schema: FieldSchema {
                type_name: type_name.to_string(),
                fields: BTreeMap::new(),
            },
            steps: Vec::new(),
            visiting: Vec::new(),
        };
        walker.walk(shape, None);
        tracing::trace!(
            type_name,
            fields = walker.schema.fields.len(),
            "built field schema"
        );
        walker.schema
    }

    /// Starts a schema assembled by hand.
    pub fn builder(type_name: impl Into<String>) -> FieldSchemaBuilder {
        FieldSchemaBuilder {
            schema: FieldSchema {
                type_name: type_name.into(),
                fields: BTreeMap::new(),
            },
        }
    }

    /// Name of the type this schema describes.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Looks up a label, ignoring case.
    pub fn get(&self, label: &str) -> Option<&FieldPath> {
        self.fields
            .get(&label.to_lowercase())
            .map(|entry| &entry.path)
    }

    /// Registered labels, as first written, in case-insensitive order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(|entry| entry.label.as_str())
    }

    /// Number of registered labels.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no label is registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Registers `label`; the first registration of a label wins.
    ///
    /// Registering the same steps again with a new leaf kind extends the
    /// existing path instead.
    fn insert(&mut self, label: &str, path: FieldPath) {
        let key = label.to_lowercase();
        match self.fields.get_mut(&key) {
            Some(existing) if existing.path.steps == path.steps => {
                for kind in path.leaves {
                    existing.path.push_leaf(kind);
                }
            }
            Some(existing) => {
                tracing::warn!(
                    type_name = %self.type_name,
                    label,
                    kept = %existing.path,
                    ignored = %path,
                    "label registered at more than one path"
                );
            }
            None => {
                self.fields.insert(
                    key,
                    Entry {
                        label: label.to_string(),
                        path,
                    },
                );
            }
        }
    }
}

/// Builder for schemas supplied by an external introspection step.
///
/// ```
/// use sift::{FieldPath, FieldSchema, LeafKind, Step};
///
/// let schema = FieldSchema::builder("Person")
///     .field("Name", FieldPath::new(vec![Step::field("name")], LeafKind::String))
///     .build();
/// assert!(schema.get("name").is_some());
/// ```
#[derive(Debug)]
pub struct FieldSchemaBuilder {
    schema: FieldSchema,
}

impl FieldSchemaBuilder {
    /// Registers `label` at `path`. The first registration of a label wins.
    pub fn field(mut self, label: &str, path: FieldPath) -> Self {
        self.schema.insert(label, path);
        self
    }

    /// Finalizes the schema.
    pub fn build(self) -> FieldSchema {
        self.schema
    }
}

struct Walker {
    schema: FieldSchema,
    steps: Vec<Step>,
    visiting: Vec<&'static str>,
}

impl Walker {
    fn walk(&mut self, shape: &Shape, label: Option<&'static str>) {
        match shape {
            Shape::Leaf(kind) => {
                if let Some(label) = label {
                    let path = FieldPath::new(self.steps.clone(), *kind);
                    self.schema.insert(label, path);
                }
            }
            Shape::Pointer(inner) => self.nested(Step::Pointer, |w| w.walk(inner, label)),
            Shape::List(inner) => self.nested(Step::List, |w| w.walk(inner, label)),
            Shape::Map(key, value) => self.nested(Step::Map, |w| {
                w.walk(key, label);
                w.walk(value, label);
            }),
            Shape::Record(record) => {
                self.ignore_label(label);
                self.record(record);
            }
            Shape::Variant(variants) => {
                self.ignore_label(label);
                self.variants(variants);
            }
            Shape::Opaque => {}
        }
    }

    fn record(&mut self, record: &RecordShape) {
        if self.visiting.contains(&record.type_name) {
            return;
        }
        self.visiting.push(record.type_name);
        for field in (record.fields)() {
            self.nested(Step::field(field.name), |w| w.walk(&field.shape, field.label));
        }
        self.visiting.pop();
    }

    fn variants(&mut self, variants: &VariantSetShape) {
        if self.visiting.contains(&variants.type_name) {
            return;
        }
        self.visiting.push(variants.type_name);
        for variant in (variants.variants)() {
            // One level of indirection is unwrapped during traversal.
            let payload = match variant.payload {
                Some(Shape::Pointer(inner)) => *inner,
                Some(shape) => shape,
                None => continue,
            };
            match payload {
                Shape::Record(record) => {
                    self.nested(Step::variant(variant.name), |w| w.record(&record))
                }
                _ => tracing::debug!(
                    variant = variant.name,
                    "variant payload is not a record; its contents are not searchable"
                ),
            }
        }
        self.visiting.pop();
    }

    fn nested(&mut self, step: Step, f: impl FnOnce(&mut Walker)) {
        self.steps.push(step);
        f(self);
        self.steps.pop();
    }

    fn ignore_label(&self, label: Option<&'static str>) {
        if let Some(label) = label {
            tracing::debug!(label, "label on a non-leaf field is ignored");
        }
    }
}

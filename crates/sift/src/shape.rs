//! Static and runtime views of record types.
//!
//! [`Shape`] describes a type once: which fields it has, which of them are
//! labeled leaves, and what containers sit in between. The field schema is
//! built from it. [`Node`] is the matching runtime view of one value,
//! produced on demand while a predicate walks a record.
//!
//! Both are normally produced by `#[derive(Searchable)]`; see
//! [`crate::Inspect`].

use crate::value::Value;

/// Static description of a type.
#[derive(Debug, Clone)]
pub enum Shape {
    /// A primitive the leaf matchers understand.
    Leaf(LeafKind),
    /// A struct with named fields.
    Record(RecordShape),
    /// `Option`, `Box` and other single indirections.
    Pointer(Box<Shape>),
    /// `Vec`, arrays and slices.
    List(Box<Shape>),
    /// Maps; keys and values are both searchable.
    Map(Box<Shape>, Box<Shape>),
    /// An enum whose variants carry payloads.
    Variant(VariantSetShape),
    /// Anything the engine cannot look inside.
    Opaque,
}

/// Kind of a leaf value, selecting the leaf matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    String,
    Bool,
    Number,
    /// Symbolic names with their discriminants.
    Enum(&'static [(&'static str, i64)]),
}

impl LeafKind {
    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            LeafKind::String => "string",
            LeafKind::Bool => "bool",
            LeafKind::Number => "number",
            LeafKind::Enum(_) => "enum",
        }
    }

    /// Returns `true` if `value` is a leaf of this kind.
    pub fn accepts(self, value: &Value<'_>) -> bool {
        match self {
            LeafKind::String => value.is_string(),
            LeafKind::Bool => value.is_bool(),
            LeafKind::Number => value.is_number(),
            LeafKind::Enum(_) => value.is_enum(),
        }
    }
}

/// Static description of a struct.
///
/// Fields are produced lazily so that self-referential types can be
/// described without recursing forever.
#[derive(Debug, Clone, Copy)]
pub struct RecordShape {
    /// Rust type name, used to detect cycles.
    pub type_name: &'static str,
    /// Produces the field descriptions.
    pub fields: fn() -> Vec<FieldShape>,
}

/// Static description of one struct field.
#[derive(Debug, Clone)]
pub struct FieldShape {
    /// Wire name of the field; also the name [`crate::Record::field`] answers to.
    pub name: &'static str,
    /// Logical search label, if the field is a labeled leaf.
    pub label: Option<&'static str>,
    /// Shape of the field's type.
    pub shape: Shape,
}

/// Static description of a payload-carrying enum.
#[derive(Debug, Clone, Copy)]
pub struct VariantSetShape {
    /// Rust type name, used to detect cycles.
    pub type_name: &'static str,
    /// Produces the variant descriptions.
    pub variants: fn() -> Vec<VariantShape>,
}

/// Static description of one enum variant.
#[derive(Debug, Clone)]
pub struct VariantShape {
    /// Wire name of the variant.
    pub name: &'static str,
    /// Shape of the payload; `None` for unit variants.
    pub payload: Option<Shape>,
}

/// Runtime view of a value reachable from a record.
///
/// Nodes borrow from the record and never modify it.
pub enum Node<'a> {
    /// The field does not exist on this record.
    Absent,
    /// A primitive value.
    Leaf(Value<'a>),
    /// A struct.
    Record(&'a dyn crate::Record),
    /// An indirection; `None` when unset.
    Pointer(Option<Box<Node<'a>>>),
    /// The active variant of an enum and its payload, if any.
    Variant {
        name: &'static str,
        payload: Option<Box<Node<'a>>>,
    },
    /// Elements of a sequence.
    List(Vec<Node<'a>>),
    /// Key/value pairs of a map.
    Map(Vec<(Node<'a>, Node<'a>)>),
}

impl<'a> Node<'a> {
    /// Returns `true` for [`Node::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Absent)
    }

    /// Returns the leaf value, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&Value<'a>> {
        match self {
            Node::Leaf(value) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Absent => f.write_str("Absent"),
            Node::Leaf(value) => f.debug_tuple("Leaf").field(value).finish(),
            Node::Record(_) => f.write_str("Record(..)"),
            Node::Pointer(inner) => f.debug_tuple("Pointer").field(inner).finish(),
            Node::Variant { name, payload } => f
                .debug_struct("Variant")
                .field("name", name)
                .field("payload", payload)
                .finish(),
            Node::List(items) => f.debug_tuple("List").field(items).finish(),
            Node::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
        }
    }
}

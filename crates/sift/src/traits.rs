//! Traits connecting Rust types to the query engine.
//!
//! [`Inspect`] is implemented for every type that can appear in a searchable
//! record: primitives, common containers, and anything deriving
//! `Searchable` or `SearchEnum`. Structs additionally implement [`Record`]
//! so their fields can be reached by name.
//!
//! # Derive Usage
//!
//! ```
//! use sift::{Searchable, SearchEnum};
//!
//! #[derive(SearchEnum)]
//! enum Severity {
//!     Low = 1,
//!     High = 3,
//! }
//!
//! #[derive(Searchable)]
//! struct Finding {
//!     #[search(label = "Rule")]
//!     rule: String,
//!     #[search(label = "Severity")]
//!     severity: Severity,
//!     // Unlabeled fields are walked through but not searchable themselves.
//!     notes: Vec<String>,
//! }
//! ```
//!
//! # Manual Implementation
//!
//! ```
//! use sift::{FieldShape, Inspect, LeafKind, Node, Record, RecordShape, Shape, Value};
//!
//! struct Task {
//!     name: String,
//! }
//!
//! impl Record for Task {
//!     fn field(&self, name: &str) -> Node<'_> {
//!         match name {
//!             "name" => Node::Leaf(Value::String(&self.name)),
//!             _ => Node::Absent,
//!         }
//!     }
//! }
//!
//! impl Inspect for Task {
//!     fn shape() -> Shape {
//!         Shape::Record(RecordShape {
//!             type_name: "Task",
//!             fields: || {
//!                 vec![FieldShape {
//!                     name: "name",
//!                     label: Some("Task Name"),
//!                     shape: Shape::Leaf(LeafKind::String),
//!                 }]
//!             },
//!         })
//!     }
//!
//!     fn node(&self) -> Node<'_> {
//!         Node::Record(self)
//!     }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use crate::shape::{LeafKind, Node, Shape};
use crate::value::{Number, Value};

/// A type the query engine can describe and look inside.
pub trait Inspect {
    /// Static description of the type, used to build its field schema.
    fn shape() -> Shape
    where
        Self: Sized;

    /// Runtime view of this value.
    fn node(&self) -> Node<'_>;
}

/// A struct whose fields can be reached by wire name.
pub trait Record {
    /// Returns the named field, or [`Node::Absent`] if there is none.
    fn field(&self, name: &str) -> Node<'_>;
}

/// A fieldless enum searchable by its symbolic names.
///
/// Usually derived with `#[derive(SearchEnum)]`. Discriminants give the
/// order used by `<`/`>` comparisons.
///
/// # Example
///
/// ```
/// use sift::SearchEnum;
///
/// #[derive(Clone, Copy)]
/// enum Status {
///     Pending,
///     Active,
/// }
///
/// impl SearchEnum for Status {
///     const VARIANTS: &'static [(&'static str, i64)] = &[("Pending", 0), ("Active", 1)];
///
///     fn variant_name(&self) -> &'static str {
///         match self {
///             Status::Pending => "Pending",
///             Status::Active => "Active",
///         }
///     }
///
///     fn discriminant(&self) -> i64 {
///         *self as i64
///     }
/// }
/// ```
pub trait SearchEnum {
    /// Every variant name with its discriminant.
    const VARIANTS: &'static [(&'static str, i64)];

    /// Name of this variant.
    fn variant_name(&self) -> &'static str;

    /// Discriminant of this variant.
    fn discriminant(&self) -> i64;
}

/// Leaf node for a [`SearchEnum`] value.
pub fn enum_node<E: SearchEnum>(value: &E) -> Node<'_> {
    Node::Leaf(Value::Enum {
        name: value.variant_name(),
        discriminant: value.discriminant(),
    })
}

impl Inspect for String {
    fn shape() -> Shape {
        Shape::Leaf(LeafKind::String)
    }

    fn node(&self) -> Node<'_> {
        Node::Leaf(Value::String(self))
    }
}

impl Inspect for &str {
    fn shape() -> Shape {
        Shape::Leaf(LeafKind::String)
    }

    fn node(&self) -> Node<'_> {
        Node::Leaf(Value::String(self))
    }
}

impl Inspect for bool {
    fn shape() -> Shape {
        Shape::Leaf(LeafKind::Bool)
    }

    fn node(&self) -> Node<'_> {
        Node::Leaf(Value::Bool(*self))
    }
}

macro_rules! inspect_number {
    ($($t:ty),*) => {
        $(
            impl Inspect for $t {
                fn shape() -> Shape {
                    Shape::Leaf(LeafKind::Number)
                }

                fn node(&self) -> Node<'_> {
                    Node::Leaf(Value::Number(Number::from(*self)))
                }
            }
        )*
    };
}

inspect_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: Inspect> Inspect for Option<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }

    fn node(&self) -> Node<'_> {
        Node::Pointer(self.as_ref().map(|inner| Box::new(inner.node())))
    }
}

macro_rules! inspect_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Inspect> Inspect for $ptr<T> {
                fn shape() -> Shape {
                    Shape::Pointer(Box::new(T::shape()))
                }

                fn node(&self) -> Node<'_> {
                    Node::Pointer(Some(Box::new((**self).node())))
                }
            }
        )*
    };
}

inspect_pointer!(Box, Rc, Arc);

macro_rules! inspect_list {
    ($($list:ident),*) => {
        $(
            impl<T: Inspect> Inspect for $list<T> {
                fn shape() -> Shape {
                    Shape::List(Box::new(T::shape()))
                }

                fn node(&self) -> Node<'_> {
                    Node::List(self.iter().map(Inspect::node).collect())
                }
            }
        )*
    };
}

inspect_list!(Vec, VecDeque, BTreeSet);

impl<T: Inspect, S> Inspect for HashSet<T, S> {
    fn shape() -> Shape {
        Shape::List(Box::new(T::shape()))
    }

    fn node(&self) -> Node<'_> {
        Node::List(self.iter().map(Inspect::node).collect())
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn shape() -> Shape {
        Shape::List(Box::new(T::shape()))
    }

    fn node(&self) -> Node<'_> {
        Node::List(self.iter().map(Inspect::node).collect())
    }
}

impl<K: Inspect, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Map(Box::new(K::shape()), Box::new(V::shape()))
    }

    fn node(&self) -> Node<'_> {
        Node::Map(self.iter().map(|(k, v)| (k.node(), v.node())).collect())
    }
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Map(Box::new(K::shape()), Box::new(V::shape()))
    }

    fn node(&self) -> Node<'_> {
        Node::Map(self.iter().map(|(k, v)| (k.node(), v.node())).collect())
    }
}

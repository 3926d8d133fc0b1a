//! Hand-written record types shared by unit tests.

use std::collections::BTreeMap;

use crate::shape::{
    FieldShape, LeafKind, Node, RecordShape, Shape, VariantSetShape, VariantShape,
};
use crate::traits::{enum_node, Inspect, Record, SearchEnum};

fn leaf(name: &'static str, label: &'static str, kind: LeafKind) -> FieldShape {
    FieldShape {
        name,
        label: Some(label),
        shape: Shape::Leaf(kind),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub tags: Vec<String>,
    pub age: u32,
}

impl Person {
    pub fn new(name: &str, tags: &[&str], age: u32) -> Self {
        Person {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            age,
        }
    }
}

impl Record for Person {
    fn field(&self, name: &str) -> Node<'_> {
        match name {
            "name" => self.name.node(),
            "tags" => self.tags.node(),
            "age" => self.age.node(),
            _ => Node::Absent,
        }
    }
}

impl Inspect for Person {
    fn shape() -> Shape {
        Shape::Record(RecordShape {
            type_name: "Person",
            fields: || {
                vec![
                    leaf("name", "Name", LeafKind::String),
                    FieldShape {
                        name: "tags",
                        label: Some("Tag"),
                        shape: Vec::<String>::shape(),
                    },
                    leaf("age", "Age", LeafKind::Number),
                ]
            },
        })
    }

    fn node(&self) -> Node<'_> {
        Node::Record(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl SearchEnum for Severity {
    const VARIANTS: &'static [(&'static str, i64)] = &[("LOW", 1), ("MEDIUM", 2), ("HIGH", 3)];

    fn variant_name(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }

    fn discriminant(&self) -> i64 {
        *self as i64
    }
}

impl Inspect for Severity {
    fn shape() -> Shape {
        Shape::Leaf(LeafKind::Enum(Self::VARIANTS))
    }

    fn node(&self) -> Node<'_> {
        enum_node(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub name: String,
    pub tag: String,
}

impl Record for Image {
    fn field(&self, name: &str) -> Node<'_> {
        match name {
            "name" => self.name.node(),
            "tag" => self.tag.node(),
            _ => Node::Absent,
        }
    }
}

impl Inspect for Image {
    fn shape() -> Shape {
        Shape::Record(RecordShape {
            type_name: "Image",
            fields: || {
                vec![
                    leaf("name", "Image Name", LeafKind::String),
                    leaf("tag", "Image Tag", LeafKind::String),
                ]
            },
        })
    }

    fn node(&self) -> Node<'_> {
        Node::Record(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub image: Option<Image>,
    pub privileged: bool,
    pub ports: Vec<u16>,
}

impl Container {
    pub fn new(image: &str, tag: &str, privileged: bool) -> Self {
        Container {
            image: Some(Image {
                name: image.to_string(),
                tag: tag.to_string(),
            }),
            privileged,
            ports: Vec::new(),
        }
    }
}

impl Record for Container {
    fn field(&self, name: &str) -> Node<'_> {
        match name {
            "image" => self.image.node(),
            "privileged" => self.privileged.node(),
            "ports" => self.ports.node(),
            _ => Node::Absent,
        }
    }
}

impl Inspect for Container {
    fn shape() -> Shape {
        Shape::Record(RecordShape {
            type_name: "Container",
            fields: || {
                vec![
                    FieldShape {
                        name: "image",
                        label: None,
                        shape: Option::<Image>::shape(),
                    },
                    leaf("privileged", "Privileged", LeafKind::Bool),
                    FieldShape {
                        name: "ports",
                        label: Some("Port"),
                        shape: Vec::<u16>::shape(),
                    },
                ]
            },
        })
    }

    fn node(&self) -> Node<'_> {
        Node::Record(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub path: String,
}

impl Record for Volume {
    fn field(&self, name: &str) -> Node<'_> {
        match name {
            "path" => self.path.node(),
            _ => Node::Absent,
        }
    }
}

impl Inspect for Volume {
    fn shape() -> Shape {
        Shape::Record(RecordShape {
            type_name: "Volume",
            fields: || vec![leaf("path", "Volume Path", LeafKind::String)],
        })
    }

    fn node(&self) -> Node<'_> {
        Node::Record(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Unset,
    Volume(Box<Volume>),
    Replicas(u32),
}

impl Inspect for Source {
    fn shape() -> Shape {
        Shape::Variant(VariantSetShape {
            type_name: "Source",
            variants: || {
                vec![
                    VariantShape {
                        name: "unset",
                        payload: None,
                    },
                    VariantShape {
                        name: "volume",
                        payload: Some(Box::<Volume>::shape()),
                    },
                    VariantShape {
                        name: "replicas",
                        payload: Some(u32::shape()),
                    },
                ]
            },
        })
    }

    fn node(&self) -> Node<'_> {
        match self {
            Source::Unset => Node::Variant {
                name: "unset",
                payload: None,
            },
            Source::Volume(volume) => Node::Variant {
                name: "volume",
                payload: Some(Box::new(volume.node())),
            },
            Source::Replicas(n) => Node::Variant {
                name: "replicas",
                payload: Some(Box::new(n.node())),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub name: String,
    pub severity: Severity,
    pub containers: Vec<Container>,
    pub labels: BTreeMap<String, String>,
    pub source: Source,
    pub parent: Option<Box<Deployment>>,
}

impl Deployment {
    pub fn new(name: &str, containers: Vec<Container>) -> Self {
        Deployment {
            name: name.to_string(),
            severity: Severity::Low,
            containers,
            labels: BTreeMap::new(),
            source: Source::Unset,
            parent: None,
        }
    }
}

impl Record for Deployment {
    fn field(&self, name: &str) -> Node<'_> {
        match name {
            "name" => self.name.node(),
            "severity" => self.severity.node(),
            "containers" => self.containers.node(),
            "labels" => self.labels.node(),
            "source" => self.source.node(),
            "parent" => self.parent.node(),
            _ => Node::Absent,
        }
    }
}

impl Inspect for Deployment {
    fn shape() -> Shape {
        Shape::Record(RecordShape {
            type_name: "Deployment",
            fields: || {
                vec![
                    leaf("name", "Deployment", LeafKind::String),
                    FieldShape {
                        name: "severity",
                        label: Some("Severity"),
                        shape: Severity::shape(),
                    },
                    FieldShape {
                        name: "containers",
                        label: None,
                        shape: Vec::<Container>::shape(),
                    },
                    FieldShape {
                        name: "labels",
                        label: Some("Label"),
                        shape: BTreeMap::<String, String>::shape(),
                    },
                    FieldShape {
                        name: "source",
                        label: None,
                        shape: Source::shape(),
                    },
                    FieldShape {
                        name: "parent",
                        label: None,
                        shape: Option::<Box<Deployment>>::shape(),
                    },
                ]
            },
        })
    }

    fn node(&self) -> Node<'_> {
        Node::Record(self)
    }
}


//! Effective Shapes
//!
//! An [`EffectiveShape`] is the flattened description of a type that the
//! codec walks: ordered attribute slots and ordered element slots with
//! inheritance, group references and element references already expanded.
//! Shapes live in a [`ShapeArena`] and refer to each other through
//! [`ShapeId`] handles, so recursive and diamond-shaped type graphs are
//! resolved once.

pub mod resolver;

pub use resolver::ShapeResolver;

use serde::Serialize;
use std::ops::Index;

use crate::namespaces::QName;
use crate::schema::{Facets, Occurs, ScalarKind};

/// Handle of a shape inside a [`ShapeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ShapeId(pub usize);

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A scalar value space: kind, the builtin it bottoms out in, and facets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarType {
    /// Conversion kind
    pub kind: ScalarKind,
    /// Built-in type the restriction chain ends in
    pub base: QName,
    /// Accumulated facets (white_space is always set)
    #[serde(skip_serializing_if = "Facets::is_empty")]
    pub facets: Facets,
}

impl ScalarType {
    /// Plain scalar of the given kind
    pub fn new(kind: ScalarKind, base: QName) -> Self {
        Self {
            kind,
            base,
            facets: Facets::default(),
        }
    }
}

/// An attribute of a shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSlot {
    /// Qualified attribute name
    pub name: QName,
    /// Record key
    pub key: String,
    /// Value space
    pub scalar: ScalarType,
    /// `use="required"`
    pub required: bool,
    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Fixed value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
    /// Declaring document
    pub origin: String,
}

/// What an element slot holds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotContent {
    /// Text converted to a scalar
    Scalar(ScalarType),
    /// A nested shape
    Complex(ShapeId),
}

/// A child element of a shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSlot {
    /// Qualified element name
    pub name: QName,
    /// Record key
    pub key: String,
    /// Scalar or nested shape
    pub content: SlotContent,
    /// Effective occurrence bounds
    pub occurs: Occurs,
    /// Whether xsi:nil is accepted
    pub nillable: bool,
    /// Default text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Declaring document
    pub origin: String,
}

impl ElementSlot {
    /// Whether the slot maps to a sequence in records
    pub fn is_repeated(&self) -> bool {
        self.occurs.max != Some(1)
    }

    /// Whether at least one occurrence is required
    pub fn is_required(&self) -> bool {
        self.occurs.min > 0
    }
}

/// The flattened description of a type
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EffectiveShape {
    /// Type name (None for anonymous types)
    pub name: Option<QName>,
    /// Shape of the base type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<ShapeId>,
    /// Attribute slots, inherited first
    pub attributes: Vec<AttributeSlot>,
    /// Element slots, inherited first
    pub elements: Vec<ElementSlot>,
    /// Text content of simple-content types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<ScalarType>,
    /// Mixed content
    pub mixed: bool,
    /// Keep children no slot matches
    pub preserve_unknown: bool,
    /// Abstract type
    #[serde(rename = "abstract")]
    pub abstract_type: bool,
    /// Preferred prefixes (prefix, namespace) of the declaring documents
    pub namespaces: Vec<(String, String)>,
    /// Declaring document
    pub origin: String,
}

impl EffectiveShape {
    /// Attribute slot by record key
    pub fn attribute(&self, key: &str) -> Option<&AttributeSlot> {
        self.attributes.iter().find(|slot| slot.key == key)
    }

    /// Element slot by record key
    pub fn element(&self, key: &str) -> Option<&ElementSlot> {
        self.elements.iter().find(|slot| slot.key == key)
    }

    /// Element slot by qualified name
    pub fn element_named(&self, name: &QName) -> Option<&ElementSlot> {
        self.elements.iter().find(|slot| slot.name == *name)
    }

    /// Preferred prefix for a namespace
    pub fn preferred_prefix(&self, namespace: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(_, uri)| uri == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }
}

/// Storage for resolved shapes
#[derive(Debug, Clone, Default)]
pub struct ShapeArena {
    shapes: Vec<EffectiveShape>,
}

impl ShapeArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Shape behind a handle
    pub fn get(&self, id: ShapeId) -> Option<&EffectiveShape> {
        self.shapes.get(id.0)
    }

    /// Number of shapes
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterate over all shapes with their handles
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &EffectiveShape)> {
        self.shapes.iter().enumerate().map(|(i, s)| (ShapeId(i), s))
    }

    /// Handles of `root` and every shape reachable from it, in discovery order
    pub fn reachable(&self, root: ShapeId) -> Vec<ShapeId> {
        let mut seen = vec![root];
        let mut next = 0;
        while next < seen.len() {
            if let Some(shape) = self.get(seen[next]) {
                for slot in &shape.elements {
                    if let SlotContent::Complex(id) = slot.content {
                        if !seen.contains(&id) {
                            seen.push(id);
                        }
                    }
                }
            }
            next += 1;
        }
        seen
    }

    pub(crate) fn reserve(&mut self) -> ShapeId {
        self.shapes.push(EffectiveShape::default());
        ShapeId(self.shapes.len() - 1)
    }

    pub(crate) fn set(&mut self, id: ShapeId, shape: EffectiveShape) {
        self.shapes[id.0] = shape;
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.shapes.truncate(len);
    }
}

impl Index<ShapeId> for ShapeArena {
    type Output = EffectiveShape;

    fn index(&self, id: ShapeId) -> &EffectiveShape {
        &self.shapes[id.0]
    }
}

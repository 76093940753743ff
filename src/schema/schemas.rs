//! Schema documents
//!
//! A [`SchemaDocument`] is the immutable result of parsing one XSD file:
//! its target namespace, prefix bindings, form defaults, top-level
//! components and the import/include/redefine directives that connect it to
//! other documents.

use indexmap::IndexMap;

use crate::namespaces::{NamespaceContext, QName};

use super::attributes::{AttributeDef, AttributeGroupDef};
use super::complex_types::ComplexTypeDef;
use super::elements::ElementDef;
use super::groups::GroupDef;
use super::simple_types::SimpleTypeDef;

/// Form default for local elements and attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormDefault {
    /// Local names are in the target namespace
    Qualified,
    /// Local names are in no namespace
    #[default]
    Unqualified,
}

impl FormDefault {
    /// Parse from the attribute value
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }
}

/// A named type: simple or complex
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    /// Complex type
    Complex(ComplexTypeDef),
    /// Simple type
    Simple(SimpleTypeDef),
}

impl TypeDef {
    /// Base type named by this definition's derivation, if any
    pub fn base_name(&self) -> Option<&QName> {
        match self {
            TypeDef::Complex(ct) => ct.content.base(),
            TypeDef::Simple(st) => match &st.variety {
                super::simple_types::SimpleVariety::Restriction {
                    base: super::simple_types::SimpleBase::Named(name),
                    ..
                } => Some(name),
                _ => None,
            },
        }
    }

    pub(crate) fn rehome(&mut self, namespace: &str) {
        match self {
            TypeDef::Complex(ct) => ct.rehome(namespace),
            TypeDef::Simple(st) => st.rehome(namespace),
        }
    }
}

/// Top-level components of a document (or of a redefine/override block)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    /// Global element declarations by local name
    pub elements: IndexMap<String, ElementDef>,
    /// Global attribute declarations by local name
    pub attributes: IndexMap<String, AttributeDef>,
    /// Named simple and complex types by local name
    pub types: IndexMap<String, TypeDef>,
    /// Named model groups by local name
    pub groups: IndexMap<String, GroupDef>,
    /// Named attribute groups by local name
    pub attribute_groups: IndexMap<String, AttributeGroupDef>,
}

impl Components {
    /// Total number of components
    pub fn len(&self) -> usize {
        self.elements.len()
            + self.attributes.len()
            + self.types.len()
            + self.groups.len()
            + self.attribute_groups.len()
    }

    /// Whether no component is defined
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn rehome(&mut self, namespace: &str) {
        for element in self.elements.values_mut() {
            element.rehome(namespace);
        }
        for attribute in self.attributes.values_mut() {
            attribute.rehome(namespace);
        }
        for type_def in self.types.values_mut() {
            type_def.rehome(namespace);
        }
        for group in self.groups.values_mut() {
            group.content.rehome(namespace);
        }
        for group in self.attribute_groups.values_mut() {
            group.attributes.rehome(namespace);
        }
    }
}

/// Kind of a composition directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Same-namespace inclusion
    Include,
    /// Cross-namespace import
    Import,
    /// Inclusion with redefined components (XSD 1.0)
    Redefine,
    /// Inclusion with overridden components (XSD 1.1)
    Override,
}

impl std::fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Include => write!(f, "include"),
            Self::Import => write!(f, "import"),
            Self::Redefine => write!(f, "redefine"),
            Self::Override => write!(f, "override"),
        }
    }
}

/// An import, include, redefine or override directive
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDirective {
    /// Directive kind
    pub kind: DirectiveKind,
    /// Imported namespace (imports only)
    pub namespace: Option<String>,
    /// Declared schemaLocation
    pub schema_location: Option<String>,
    /// Replacement components (redefine/override only)
    pub components: Components,
}

impl SchemaDirective {
    /// Import directive
    pub fn import(namespace: Option<String>, schema_location: Option<String>) -> Self {
        Self {
            kind: DirectiveKind::Import,
            namespace,
            schema_location,
            components: Components::default(),
        }
    }

    /// Include directive
    pub fn include(schema_location: impl Into<String>) -> Self {
        Self {
            kind: DirectiveKind::Include,
            namespace: None,
            schema_location: Some(schema_location.into()),
            components: Components::default(),
        }
    }
}

/// A parsed schema document
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    /// Identity of the document (its location as supplied by the caller)
    pub id: String,
    /// Target namespace
    pub target_namespace: Option<String>,
    /// Prefix bindings declared on the schema element
    pub namespaces: NamespaceContext,
    /// Form default for local elements
    pub element_form_default: FormDefault,
    /// Form default for local attributes
    pub attribute_form_default: FormDefault,
    /// Top-level components
    pub components: Components,
    /// Composition directives in document order
    pub directives: Vec<SchemaDirective>,
}

impl SchemaDocument {
    /// Create an empty document
    pub fn new(id: impl Into<String>, target_namespace: Option<String>) -> Self {
        Self {
            id: id.into(),
            target_namespace,
            namespaces: NamespaceContext::new(),
            element_form_default: FormDefault::default(),
            attribute_form_default: FormDefault::default(),
            components: Components::default(),
            directives: Vec::new(),
        }
    }

    /// Qualified name of a top-level component of this document
    pub fn qualify(&self, local_name: &str) -> QName {
        QName::new(self.target_namespace.clone(), local_name)
    }

    /// Copy of this document adopted into `namespace` by a chameleon include
    pub fn with_chameleon_namespace(&self, namespace: &str) -> SchemaDocument {
        let mut adopted = self.clone();
        adopted.target_namespace = Some(namespace.to_string());
        adopted.components.rehome(namespace);
        for directive in &mut adopted.directives {
            directive.components.rehome(namespace);
        }
        adopted
    }
}

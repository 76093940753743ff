//! Schema Document Model
//!
//! Immutable data structures for parsed XSD documents and the merged
//! registry that connects them:
//!
//! - [`schemas`]: one parsed document with its directives
//! - [`elements`], [`attributes`], [`complex_types`], [`simple_types`]:
//!   declarations and definitions
//! - [`particles`], [`groups`], [`wildcards`]: content models
//! - [`builtins`]: the XSD built-in datatypes
//! - [`parsing`]: XSD text to [`SchemaDocument`]
//! - [`globals`]: the namespace-qualified registry built by the loader

pub mod attributes;
pub mod builtins;
pub mod complex_types;
pub mod elements;
pub mod globals;
pub mod groups;
pub mod parsing;
pub mod particles;
pub mod schemas;
pub mod simple_types;
pub mod wildcards;

pub use attributes::{
    AttributeDecls, AttributeDef, AttributeGroupDef, AttributeTarget, AttributeType, AttributeUse,
};
pub use builtins::{builtin_kind, ScalarKind, XSD_ANY_SIMPLE_TYPE, XSD_ANY_TYPE};
pub use complex_types::{ComplexContent, ComplexTypeDef, DerivationMethod};
pub use elements::{ElementDef, ElementTarget, ElementType};
pub use globals::{Global, GlobalMaps, Origin, SchemaRegistry};
pub use groups::{GroupDef, ModelGroup, ModelType};
pub use particles::{parse_occurs, GroupRef, Occurs, Particle};
pub use schemas::{
    Components, DirectiveKind, FormDefault, SchemaDirective, SchemaDocument, TypeDef,
};
pub use simple_types::{Facets, SimpleBase, SimpleTypeDef, SimpleVariety, WhiteSpace};
pub use wildcards::{ProcessContents, Wildcard};

use crate::namespaces::QName;

/// Move a no-namespace reference into `namespace` (chameleon include)
pub(crate) fn rehome_qname(name: &mut QName, namespace: &str) {
    if name.namespace.is_none() {
        name.namespace = Some(namespace.to_string());
    }
}

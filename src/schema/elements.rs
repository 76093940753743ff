//! XSD Element declarations
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cElement_Declarations

use crate::namespaces::QName;

use super::complex_types::ComplexTypeDef;
use super::particles::Occurs;
use super::schemas::FormDefault;
use super::simple_types::SimpleTypeDef;

/// Name or reference of an element declaration (mutually exclusive)
#[derive(Debug, Clone, PartialEq)]
pub enum ElementTarget {
    /// Declared here under this local name
    Name(String),
    /// Reference to a global element
    Ref(QName),
}

/// The type of an element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    /// Reference to a named type (or builtin)
    Named(QName),
    /// Anonymous complex type
    Complex(Box<ComplexTypeDef>),
    /// Anonymous simple type
    Simple(Box<SimpleTypeDef>),
}

/// Element declaration (global or local) or element reference
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    /// Name or reference
    pub target: ElementTarget,
    /// Declared type (None = anyType)
    pub type_def: Option<ElementType>,
    /// Occurrence bounds (meaningful for local declarations and references)
    pub occurs: Occurs,
    /// Whether xsi:nil is allowed
    pub nillable: bool,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
    /// Explicit form of a local declaration
    pub form: Option<FormDefault>,
    /// Abstract flag
    pub abstract_element: bool,
    /// Substitution group head (recorded, not checked)
    pub substitution_group: Option<QName>,
}

impl ElementDef {
    /// Declaration with a named type
    pub fn named(name: impl Into<String>, type_name: QName) -> Self {
        Self {
            target: ElementTarget::Name(name.into()),
            type_def: Some(ElementType::Named(type_name)),
            occurs: Occurs::once(),
            nillable: false,
            default: None,
            fixed: None,
            form: None,
            abstract_element: false,
            substitution_group: None,
        }
    }

    /// Reference to a global element
    pub fn reference(name: QName) -> Self {
        Self {
            target: ElementTarget::Ref(name),
            type_def: None,
            occurs: Occurs::once(),
            nillable: false,
            default: None,
            fixed: None,
            form: None,
            abstract_element: false,
            substitution_group: None,
        }
    }

    /// Set the occurrence bounds
    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    /// Readable name for diagnostics
    pub fn display_name(&self) -> String {
        match &self.target {
            ElementTarget::Name(name) => name.clone(),
            ElementTarget::Ref(qname) => qname.to_string(),
        }
    }

    pub(crate) fn rehome(&mut self, namespace: &str) {
        if let ElementTarget::Ref(name) = &mut self.target {
            super::rehome_qname(name, namespace);
        }
        if let Some(head) = &mut self.substitution_group {
            super::rehome_qname(head, namespace);
        }
        match &mut self.type_def {
            Some(ElementType::Named(name)) => super::rehome_qname(name, namespace),
            Some(ElementType::Complex(def)) => def.rehome(namespace),
            Some(ElementType::Simple(def)) => def.rehome(namespace),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_builders() {
        let el = ElementDef::named("item", QName::local("ItemType")).with_occurs(Occurs::zero_or_more());
        assert_eq!(el.target, ElementTarget::Name("item".to_string()));
        assert!(el.occurs.is_multiple());
        assert_eq!(el.display_name(), "item");

        let r = ElementDef::reference(QName::namespaced("urn:atom", "link"));
        assert_eq!(r.display_name(), "{urn:atom}link");
        assert!(r.type_def.is_none());
    }

    #[test]
    fn test_rehome_element() {
        let mut el = ElementDef::named("item", QName::local("ItemType"));
        el.rehome("urn:orders");
        assert_eq!(
            el.type_def,
            Some(ElementType::Named(QName::namespaced("urn:orders", "ItemType")))
        );
    }
}

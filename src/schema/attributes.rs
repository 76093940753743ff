//! XSD Attribute declarations and attribute groups
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cAttribute_Declarations

use crate::namespaces::QName;

use super::schemas::FormDefault;
use super::simple_types::SimpleTypeDef;
use super::wildcards::Wildcard;

/// Attribute use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// May be absent
    #[default]
    Optional,
    /// Must be present
    Required,
    /// Must be absent; removes an inherited attribute in a restriction
    Prohibited,
}

impl AttributeUse {
    /// Parse from the `use` attribute value
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "optional" => Some(Self::Optional),
            "required" => Some(Self::Required),
            "prohibited" => Some(Self::Prohibited),
            _ => None,
        }
    }
}

/// Name or reference of an attribute declaration (mutually exclusive)
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeTarget {
    /// Declared here under this local name
    Name(String),
    /// Reference to a global attribute
    Ref(QName),
}

/// Type of an attribute: named or inline simple type
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    /// Reference to a named simple type
    Named(QName),
    /// Anonymous simple type
    Inline(Box<SimpleTypeDef>),
}

/// Attribute declaration (global or local) or reference
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDef {
    /// Name or reference
    pub target: AttributeTarget,
    /// Declared type (None = anySimpleType)
    pub type_def: Option<AttributeType>,
    /// Use
    pub use_: AttributeUse,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
    /// Explicit form of a local declaration
    pub form: Option<FormDefault>,
}

impl AttributeDef {
    /// Local declaration with a named type
    pub fn named(name: impl Into<String>, type_name: QName) -> Self {
        Self {
            target: AttributeTarget::Name(name.into()),
            type_def: Some(AttributeType::Named(type_name)),
            use_: AttributeUse::Optional,
            default: None,
            fixed: None,
            form: None,
        }
    }

    /// Reference to a global attribute
    pub fn reference(name: QName) -> Self {
        Self {
            target: AttributeTarget::Ref(name),
            type_def: None,
            use_: AttributeUse::Optional,
            default: None,
            fixed: None,
            form: None,
        }
    }

    /// Set the use
    pub fn with_use(mut self, use_: AttributeUse) -> Self {
        self.use_ = use_;
        self
    }

    pub(crate) fn rehome(&mut self, namespace: &str) {
        if let AttributeTarget::Ref(name) = &mut self.target {
            super::rehome_qname(name, namespace);
        }
        match &mut self.type_def {
            Some(AttributeType::Named(name)) => super::rehome_qname(name, namespace),
            Some(AttributeType::Inline(def)) => def.rehome(namespace),
            None => {}
        }
    }
}

/// The attribute part of a complex type or attribute group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeDecls {
    /// Attribute declarations and references in document order
    pub attributes: Vec<AttributeDef>,
    /// Referenced attribute groups in document order
    pub groups: Vec<QName>,
    /// Attribute wildcard
    pub any_attribute: Option<Wildcard>,
}

impl AttributeDecls {
    /// Whether nothing is declared
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.groups.is_empty() && self.any_attribute.is_none()
    }

    pub(crate) fn rehome(&mut self, namespace: &str) {
        for attr in &mut self.attributes {
            attr.rehome(namespace);
        }
        for group in &mut self.groups {
            super::rehome_qname(group, namespace);
        }
    }
}

/// Named attribute group definition
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeGroupDef {
    /// Local name
    pub name: String,
    /// Contents
    pub attributes: AttributeDecls,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_use() {
        assert_eq!(AttributeUse::from_str("required"), Some(AttributeUse::Required));
        assert_eq!(AttributeUse::from_str("prohibited"), Some(AttributeUse::Prohibited));
        assert_eq!(AttributeUse::default(), AttributeUse::Optional);
        assert_eq!(AttributeUse::from_str("sometimes"), None);
    }

    #[test]
    fn test_rehome_only_touches_unqualified_refs() {
        let mut attr = AttributeDef::reference(QName::local("lang"));
        attr.rehome("urn:a");
        assert_eq!(attr.target, AttributeTarget::Ref(QName::namespaced("urn:a", "lang")));

        let mut typed = AttributeDef::named("id", QName::namespaced(crate::XSD_NAMESPACE, "string"));
        typed.rehome("urn:a");
        assert_eq!(
            typed.type_def,
            Some(AttributeType::Named(QName::namespaced(crate::XSD_NAMESPACE, "string")))
        );
    }
}

//! Error types for xmlschema-codec
//!
//! This module defines all error types used throughout the library.
//! Errors fall into three families that follow the lifecycle of the engine:
//! structural errors raised while resolving schemas, decode errors raised
//! while reading an instance document, and encode errors raised while
//! writing one. Each carries the qualified name involved and the identity
//! of the schema document that declared it.

use std::fmt;
use thiserror::Error;

use crate::namespaces::QName;

/// Result type alias using xmlschema-codec Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xmlschema-codec operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema parsing error (malformed XSD text)
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Schema resolution error (registry or shape building)
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    /// Decoding error (XML to record conversion)
    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),

    /// Encoding error (record to XML conversion)
    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// A schema document needed by the loader was not supplied
    #[error("resource error: {0}")]
    Resource(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON conversion error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kind of a top-level schema definition, used as part of registry keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum DefinitionKind {
    /// Global element declaration
    Element,
    /// Global attribute declaration
    Attribute,
    /// Named simple or complex type definition
    Type,
    /// Named model group definition
    Group,
    /// Named attribute group definition
    AttributeGroup,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => write!(f, "element"),
            Self::Attribute => write!(f, "attribute"),
            Self::Type => write!(f, "type"),
            Self::Group => write!(f, "group"),
            Self::AttributeGroup => write!(f, "attributeGroup"),
        }
    }
}

/// Errors raised while merging documents or resolving shapes.
///
/// Always fatal to the resolution that raised them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    /// Two documents define the same component with different bodies
    #[error("duplicate {kind} definition {name} in '{document}' (already defined in '{previous}')")]
    DuplicateDefinition {
        /// Kind of the clashing definition
        kind: DefinitionKind,
        /// Qualified name of the clashing definition
        name: QName,
        /// Document that supplied the second definition
        document: String,
        /// Document that supplied the first definition
        previous: String,
    },

    /// A reference names a component that is not in the merged registry
    #[error("unresolved {kind} reference {name} declared in '{document}'")]
    UnresolvedReference {
        /// Kind of the component that was looked up
        kind: DefinitionKind,
        /// Qualified name that failed to resolve
        name: QName,
        /// Document holding the reference
        document: String,
    },

    /// A type derives (directly or transitively) from itself
    #[error("cyclic type derivation {} declared in '{document}'", format_chain(.chain))]
    CyclicInheritance {
        /// Type at which the cycle was detected
        name: QName,
        /// Derivation chain, closing on `name`
        chain: Vec<QName>,
        /// Document that declared `name`
        document: String,
    },

    /// A model or attribute group references itself
    #[error("cyclic group reference {} declared in '{document}'", format_chain(.chain))]
    CyclicGroup {
        /// Group at which the cycle was detected
        name: QName,
        /// Reference chain, closing on `name`
        chain: Vec<QName>,
        /// Document that declared `name`
        document: String,
    },

    /// A particle declares maxOccurs smaller than minOccurs
    #[error("maxOccurs {max} is less than minOccurs {min} for {name} in '{document}'")]
    ConflictingOccurs {
        /// Particle name (element or group)
        name: QName,
        /// Declared minOccurs
        min: u32,
        /// Declared maxOccurs
        max: u32,
        /// Document that declared the particle
        document: String,
    },
}

fn format_chain(chain: &[QName]) -> String {
    chain
        .iter()
        .map(|q| q.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors raised by a single decode call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A `use="required"` attribute is absent
    #[error("missing required attribute {name} (declared in '{document}')")]
    MissingRequiredAttribute {
        /// Attribute name
        name: QName,
        /// Document that declared the attribute
        document: String,
    },

    /// A child element with minOccurs > 0 is absent
    #[error("missing required element {name} (declared in '{document}')")]
    MissingRequiredElement {
        /// Element name
        name: QName,
        /// Document that declared the element
        document: String,
    },

    /// Text could not be converted to the slot's scalar kind
    #[error("invalid {kind} value '{value}' for {name} (declared in '{document}'): {reason}")]
    InvalidScalarValue {
        /// Slot name
        name: QName,
        /// Scalar kind label
        kind: String,
        /// Offending text
        value: String,
        /// Why conversion failed
        reason: String,
        /// Document that declared the slot
        document: String,
    },

    /// The instance holds an element the shape cannot place
    #[error("unexpected value for {name} (declared in '{document}'): {reason}")]
    UnexpectedValue {
        /// Element name
        name: QName,
        /// Why the element does not fit
        reason: String,
        /// Document that declared the enclosing shape
        document: String,
    },
}

/// Errors raised by a single encode call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// A required attribute is absent from the record
    #[error("missing required attribute {name} (declared in '{document}')")]
    MissingRequiredAttribute {
        /// Attribute name
        name: QName,
        /// Document that declared the attribute
        document: String,
    },

    /// A required element is absent from the record
    #[error("missing required element {name} (declared in '{document}')")]
    MissingRequiredElement {
        /// Element name
        name: QName,
        /// Document that declared the element
        document: String,
    },

    /// The record holds a value whose structure does not fit the slot
    #[error("unexpected value for {name} (declared in '{document}'): {reason}")]
    UnexpectedValue {
        /// Slot name
        name: QName,
        /// Why the value does not fit
        reason: String,
        /// Document that declared the slot
        document: String,
    },
}

/// XML Schema parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema (element path)
    pub location: Option<String>,
    /// Identity of the schema document being parsed
    pub document: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            document: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the originating document
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref doc) = self.document {
            write!(f, "\n\nDocument: {}", doc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("Invalid schema syntax")
            .with_location("schema/complexType[2]")
            .with_document("adtcore.xsd");

        let msg = format!("{}", err);
        assert!(msg.contains("Invalid schema syntax"));
        assert!(msg.contains("Location:"));
        assert!(msg.contains("Document: adtcore.xsd"));
    }

    #[test]
    fn test_cycle_display_shows_chain() {
        let a = QName::namespaced("urn:a", "A");
        let b = QName::namespaced("urn:a", "B");
        let err = StructuralError::CyclicInheritance {
            name: a.clone(),
            chain: vec![a.clone(), b, a],
            document: "a.xsd".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("{urn:a}A -> {urn:a}B -> {urn:a}A"));
        assert!(msg.contains("a.xsd"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = DecodeError::MissingRequiredAttribute {
            name: QName::local("name"),
            document: "person.xsd".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().contains("missing required attribute name"));
    }
}

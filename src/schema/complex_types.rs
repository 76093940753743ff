//! XSD Complex Type definitions
//!
//! A complex type has one of three content models: simple content derived
//! from a scalar (or simple-content) base, complex content derived from a
//! complex base, or a plain particle tree with its own attributes.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Complex_Type_Definitions

use crate::namespaces::QName;

use super::attributes::AttributeDecls;
use super::particles::Particle;
use super::simple_types::{Facets, SimpleTypeDef};

/// Derivation method for complex types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DerivationMethod {
    /// Type derived by restriction
    #[default]
    Restriction,
    /// Type derived by extension
    Extension,
}

impl DerivationMethod {
    /// Parse from the element local name
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "restriction" => Some(Self::Restriction),
            "extension" => Some(Self::Extension),
            _ => None,
        }
    }
}

impl std::fmt::Display for DerivationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restriction => write!(f, "restriction"),
            Self::Extension => write!(f, "extension"),
        }
    }
}

/// The content of a complex type
#[derive(Debug, Clone, PartialEq)]
pub enum ComplexContent {
    /// `xs:simpleContent`: text of a scalar type plus attributes
    Simple {
        /// Extension or restriction
        method: DerivationMethod,
        /// Base type
        base: QName,
        /// Inline simple type of a restriction
        inline: Option<Box<SimpleTypeDef>>,
        /// Facets of a restriction
        facets: Facets,
        /// Attributes declared by this step
        attributes: AttributeDecls,
    },
    /// `xs:complexContent`: particles derived from a complex base
    Complex {
        /// Extension or restriction
        method: DerivationMethod,
        /// Base type
        base: QName,
        /// Particles declared by this step
        particle: Option<Particle>,
        /// Attributes declared by this step
        attributes: AttributeDecls,
    },
    /// Implicit restriction of anyType: own particles and attributes
    Particles {
        /// Content model (None = empty)
        particle: Option<Particle>,
        /// Attributes
        attributes: AttributeDecls,
    },
}

impl ComplexContent {
    /// Base type named by an explicit derivation
    pub fn base(&self) -> Option<&QName> {
        match self {
            ComplexContent::Simple { base, .. } | ComplexContent::Complex { base, .. } => Some(base),
            ComplexContent::Particles { .. } => None,
        }
    }

    /// Attributes declared by this step
    pub fn attributes(&self) -> &AttributeDecls {
        match self {
            ComplexContent::Simple { attributes, .. }
            | ComplexContent::Complex { attributes, .. }
            | ComplexContent::Particles { attributes, .. } => attributes,
        }
    }

    /// Particle declared by this step
    pub fn particle(&self) -> Option<&Particle> {
        match self {
            ComplexContent::Simple { .. } => None,
            ComplexContent::Complex { particle, .. } | ComplexContent::Particles { particle, .. } => {
                particle.as_ref()
            }
        }
    }
}

/// Complex type definition
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexTypeDef {
    /// Local name (None for anonymous types)
    pub name: Option<String>,
    /// Content model
    pub content: ComplexContent,
    /// Mixed content flag
    pub mixed: bool,
    /// Abstract flag
    pub abstract_type: bool,
}

impl ComplexTypeDef {
    /// Complex type with a plain particle tree
    pub fn with_particles(name: Option<String>, particle: Option<Particle>, attributes: AttributeDecls) -> Self {
        Self {
            name,
            content: ComplexContent::Particles {
                particle,
                attributes,
            },
            mixed: false,
            abstract_type: false,
        }
    }

    /// Complex type extending `base`
    pub fn extension(name: Option<String>, base: QName, particle: Option<Particle>, attributes: AttributeDecls) -> Self {
        Self {
            name,
            content: ComplexContent::Complex {
                method: DerivationMethod::Extension,
                base,
                particle,
                attributes,
            },
            mixed: false,
            abstract_type: false,
        }
    }

    pub(crate) fn rehome(&mut self, namespace: &str) {
        match &mut self.content {
            ComplexContent::Simple {
                base,
                inline,
                attributes,
                ..
            } => {
                super::rehome_qname(base, namespace);
                if let Some(inline) = inline {
                    inline.rehome(namespace);
                }
                attributes.rehome(namespace);
            }
            ComplexContent::Complex {
                base,
                particle,
                attributes,
                ..
            } => {
                super::rehome_qname(base, namespace);
                if let Some(particle) = particle {
                    particle.rehome(namespace);
                }
                attributes.rehome(namespace);
            }
            ComplexContent::Particles {
                particle,
                attributes,
            } => {
                if let Some(particle) = particle {
                    particle.rehome(namespace);
                }
                attributes.rehome(namespace);
            }
        }
    }
}

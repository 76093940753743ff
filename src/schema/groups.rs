//! XSD Model Groups
//!
//! Model groups are the sequence/choice/all containers of a content model,
//! and named model group definitions (`xs:group name="..."`) that other
//! content models reference.

use super::particles::{Occurs, Particle};

/// Compositor of a model group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    /// Ordered content
    Sequence,
    /// Exactly one of the branches
    Choice,
    /// All children in any order
    All,
}

impl ModelType {
    /// Map a compositor element's local name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Choice => write!(f, "choice"),
            Self::All => write!(f, "all"),
        }
    }
}

/// A sequence, choice or all container with ordered child particles
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGroup {
    /// Compositor
    pub model: ModelType,
    /// Child particles in document order
    pub particles: Vec<Particle>,
    /// Occurrence bounds of the container
    pub occurs: Occurs,
}

impl ModelGroup {
    /// Create an empty group
    pub fn new(model: ModelType) -> Self {
        Self {
            model,
            particles: Vec::new(),
            occurs: Occurs::once(),
        }
    }

    /// Set the occurrence bounds
    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    /// Add a child particle
    pub fn with_particle(mut self, particle: Particle) -> Self {
        self.particles.push(particle);
        self
    }

    pub(crate) fn rehome(&mut self, namespace: &str) {
        for particle in &mut self.particles {
            particle.rehome(namespace);
        }
    }
}

/// Named model group definition
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDef {
    /// Local name of the group
    pub name: String,
    /// The group's content
    pub content: ModelGroup,
}

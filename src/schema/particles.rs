//! XSD Particle Schema Components
//!
//! This module implements the particle model for XSD content: elements,
//! group references, wildcards and model group containers, each with its
//! own occurrence constraints (minOccurs, maxOccurs).
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#p

use serde::Serialize;

use crate::error::{ParseError, Result};
use crate::namespaces::QName;

use super::elements::ElementDef;
use super::groups::ModelGroup;
use super::wildcards::Wildcard;

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// One or more (1, unbounded)
    pub fn one_or_more() -> Self {
        Self { min: 1, max: None }
    }

    /// Check if this particle can be empty (minOccurs == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if this particle is empty (maxOccurs == 0)
    pub fn is_empty(&self) -> bool {
        self.max == Some(0)
    }

    /// Check if particle has maxOccurs == 1
    pub fn is_single(&self) -> bool {
        self.max == Some(1)
    }

    /// Check if particle can have multiple occurrences
    pub fn is_multiple(&self) -> bool {
        !self.is_empty() && !self.is_single()
    }

    /// Check if maxOccurs is smaller than minOccurs
    pub fn is_conflicting(&self) -> bool {
        matches!(self.max, Some(max) if max < self.min)
    }

    /// Effective bounds of this particle nested in a container with bounds `outer`.
    ///
    /// Both bounds multiply; unbounded on either level stays unbounded.
    pub fn within(&self, outer: Occurs) -> Occurs {
        let max = match (self.max, outer.max) {
            (Some(inner), Some(outer)) => Some(inner.saturating_mul(outer)),
            _ => None,
        };
        Occurs {
            min: self.min.saturating_mul(outer.min),
            max,
        }
    }

    /// Bounds of one name that appears twice in the same content model
    pub fn merged(&self, other: Occurs) -> Occurs {
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.saturating_add(b)),
            _ => None,
        };
        Occurs {
            min: self.min.saturating_add(other.min),
            max,
        }
    }

    /// Same bounds with minOccurs forced to zero (choice branches)
    pub fn relaxed(&self) -> Occurs {
        Occurs { min: 0, max: self.max }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

/// Parse minOccurs/maxOccurs from XML attribute values
pub fn parse_occurs(min_occurs: Option<&str>, max_occurs: Option<&str>) -> Result<Occurs> {
    let mut occurs = Occurs::once();

    if let Some(min_str) = min_occurs {
        occurs.min = min_str.trim().parse::<u32>().map_err(|_| {
            ParseError::new(format!(
                "minOccurs value '{}' is not a valid non-negative integer",
                min_str
            ))
        })?;
    }

    if let Some(max_str) = max_occurs {
        let max_str = max_str.trim();
        if max_str == "unbounded" {
            occurs.max = None;
        } else {
            occurs.max = Some(max_str.parse::<u32>().map_err(|_| {
                ParseError::new(format!(
                    "maxOccurs value '{}' must be a non-negative integer or 'unbounded'",
                    max_str
                ))
            })?);
        }
    }

    Ok(occurs)
}

/// Reference to a named model group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRef {
    /// Referenced group name
    pub name: QName,
    /// Occurrence bounds of the reference
    pub occurs: Occurs,
}

/// A content model building block
#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    /// Local element declaration or element reference
    Element(ElementDef),
    /// Reference to a named model group
    GroupRef(GroupRef),
    /// Element wildcard (xs:any)
    Wildcard(Wildcard),
    /// Sequence, choice or all container
    Container(ModelGroup),
}

impl Particle {
    /// Occurrence bounds declared on the particle itself
    pub fn occurs(&self) -> Occurs {
        match self {
            Particle::Element(e) => e.occurs,
            Particle::GroupRef(g) => g.occurs,
            Particle::Wildcard(w) => w.occurs,
            Particle::Container(c) => c.occurs,
        }
    }

    /// Re-home every reference that has no namespace into `namespace`
    pub(crate) fn rehome(&mut self, namespace: &str) {
        match self {
            Particle::Element(e) => e.rehome(namespace),
            Particle::GroupRef(g) => super::rehome_qname(&mut g.name, namespace),
            Particle::Wildcard(_) => {}
            Particle::Container(c) => c.rehome(namespace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_occurs_defaults() {
        let occurs = parse_occurs(None, None).unwrap();
        assert_eq!(occurs, Occurs::once());
    }

    #[test]
    fn test_parse_occurs_unbounded() {
        let occurs = parse_occurs(Some("0"), Some("unbounded")).unwrap();
        assert_eq!(occurs, Occurs::zero_or_more());
        assert!(occurs.is_multiple());
        assert!(occurs.is_emptiable());
    }

    #[test]
    fn test_parse_occurs_invalid() {
        assert!(parse_occurs(Some("-1"), None).is_err());
        assert!(parse_occurs(None, Some("many")).is_err());
    }

    #[test]
    fn test_conflicting_is_detected_not_rejected() {
        let occurs = parse_occurs(Some("3"), Some("2")).unwrap();
        assert!(occurs.is_conflicting());
        assert!(!Occurs::once().is_conflicting());
    }

    #[test]
    fn test_within_multiplies_bounds() {
        let inner = Occurs::new(2, Some(3));
        assert_eq!(inner.within(Occurs::new(2, Some(2))), Occurs::new(4, Some(6)));
        assert_eq!(inner.within(Occurs::optional()), Occurs::new(0, Some(3)));
        assert_eq!(inner.within(Occurs::one_or_more()), Occurs::new(2, None));
        assert_eq!(Occurs::zero_or_more().within(Occurs::once()), Occurs::zero_or_more());
    }

    #[test]
    fn test_merged_adds_bounds() {
        assert_eq!(Occurs::once().merged(Occurs::optional()), Occurs::new(1, Some(2)));
        assert_eq!(Occurs::once().merged(Occurs::zero_or_more()), Occurs::new(1, None));
    }
}

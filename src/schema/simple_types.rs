//! XSD Simple Type definitions
//!
//! Simple types are derived by restriction (a base plus constraining
//! facets), by list (whitespace-separated items of one type) or by union
//! (the value matches one of several member types).
//!
//! Reference: https://www.w3.org/TR/xmlschema11-2/

use serde::Serialize;

use crate::namespaces::QName;

/// Whitespace handling facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteSpace {
    /// Keep all whitespace
    Preserve,
    /// Replace tabs and newlines with spaces
    Replace,
    /// Replace, then collapse runs of spaces and trim
    Collapse,
}

impl WhiteSpace {
    /// Parse from the facet value
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "preserve" => Some(Self::Preserve),
            "replace" => Some(Self::Replace),
            "collapse" => Some(Self::Collapse),
            _ => None,
        }
    }

    /// Apply the whitespace rule to a value
    pub fn normalize(&self, s: &str) -> String {
        match self {
            Self::Preserve => s.to_string(),
            Self::Replace => s.replace(['\t', '\n', '\r'], " "),
            Self::Collapse => s.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

/// Constraining facets of a restriction.
///
/// Numeric bounds are kept lexically; they are handed to consumers of the
/// shape and not evaluated by the codec.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Facets {
    /// Allowed literal values (empty = unrestricted)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,
    /// Patterns; every entry must match (one entry per derivation step)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    /// Exact length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Minimum length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Inclusive lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_inclusive: Option<String>,
    /// Inclusive upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_inclusive: Option<String>,
    /// Exclusive lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_exclusive: Option<String>,
    /// Exclusive upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_exclusive: Option<String>,
    /// Maximum number of digits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_digits: Option<u32>,
    /// Maximum number of fraction digits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraction_digits: Option<u32>,
    /// Whitespace rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_space: Option<WhiteSpace>,
}

impl Facets {
    /// Whether no facet is set
    pub fn is_empty(&self) -> bool {
        self == &Facets::default()
    }

    /// Layer a derived type's facets over this (base) set.
    ///
    /// Set facets of the derived type win; patterns accumulate because each
    /// derivation step must still hold.
    pub fn restricted_by(&self, derived: &Facets) -> Facets {
        let mut merged = self.clone();
        if !derived.enumeration.is_empty() {
            merged.enumeration = derived.enumeration.clone();
        }
        merged.patterns.extend(derived.patterns.iter().cloned());
        merged.length = derived.length.or(merged.length);
        merged.min_length = derived.min_length.or(merged.min_length);
        merged.max_length = derived.max_length.or(merged.max_length);
        merged.min_inclusive = derived.min_inclusive.clone().or(merged.min_inclusive);
        merged.max_inclusive = derived.max_inclusive.clone().or(merged.max_inclusive);
        merged.min_exclusive = derived.min_exclusive.clone().or(merged.min_exclusive);
        merged.max_exclusive = derived.max_exclusive.clone().or(merged.max_exclusive);
        merged.total_digits = derived.total_digits.or(merged.total_digits);
        merged.fraction_digits = derived.fraction_digits.or(merged.fraction_digits);
        merged.white_space = derived.white_space.or(merged.white_space);
        merged
    }
}

/// Base or item/member type of a simple type: named or inline
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleBase {
    /// Reference to a named simple type (or builtin)
    Named(QName),
    /// Anonymous nested simple type
    Inline(Box<SimpleTypeDef>),
}

/// Derivation variety of a simple type
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleVariety {
    /// Restriction of a base type by facets
    Restriction {
        /// Base type
        base: SimpleBase,
        /// Facets added by this step
        facets: Facets,
    },
    /// Whitespace-separated list of items
    List {
        /// Item type
        item: SimpleBase,
    },
    /// One of several member types
    Union {
        /// Member types in declaration order
        members: Vec<SimpleBase>,
    },
}

/// Simple type definition
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleTypeDef {
    /// Local name (None for anonymous types)
    pub name: Option<String>,
    /// Variety
    pub variety: SimpleVariety,
}

impl SimpleTypeDef {
    /// Restriction of a named base with facets
    pub fn restriction(name: Option<String>, base: QName, facets: Facets) -> Self {
        Self {
            name,
            variety: SimpleVariety::Restriction {
                base: SimpleBase::Named(base),
                facets,
            },
        }
    }

    pub(crate) fn rehome(&mut self, namespace: &str) {
        fn rehome_base(base: &mut SimpleBase, namespace: &str) {
            match base {
                SimpleBase::Named(name) => super::rehome_qname(name, namespace),
                SimpleBase::Inline(def) => def.rehome(namespace),
            }
        }
        match &mut self.variety {
            SimpleVariety::Restriction { base, .. } => rehome_base(base, namespace),
            SimpleVariety::List { item } => rehome_base(item, namespace),
            SimpleVariety::Union { members } => {
                for member in members {
                    rehome_base(member, namespace);
                }
            }
        }
    }
}

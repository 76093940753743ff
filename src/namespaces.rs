//! XML namespace handling
//!
//! This module provides utilities for working with XML namespaces,
//! qualified names (QNames), and namespace prefix mappings.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Prefix that is always bound to the XML namespace
pub const XML_PREFIX: &str = "xml";

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Namespace URI as a string slice
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether this name lives in the given namespace
    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

/// Clark notation: `{uri}local` or just `local`
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Parse Clark notation back into a name
impl std::str::FromStr for QName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = match s.strip_prefix('{') {
            Some(rest) => {
                let (namespace, local) = rest
                    .split_once('}')
                    .ok_or_else(|| Error::Name(format!("Unterminated namespace in '{}'", s)))?;
                QName::namespaced(namespace, local)
            }
            None => QName::local(s),
        };
        crate::names::validate_ncname(&name.local_name)?;
        Ok(name)
    }
}

/// Namespace context for resolving prefixes
///
/// Holds the bindings in scope at one point of a document. Child scopes are
/// built with [`NamespaceContext::child`] so inner declarations shadow outer
/// ones without mutating the parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: IndexMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a child scope that starts with all of this scope's bindings
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace. An empty URI undeclares it.
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.default_namespace = if namespace.is_empty() {
            None
        } else {
            Some(namespace)
        };
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == XML_PREFIX {
            return Some(crate::XML_NAMESPACE);
        }
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Find a prefix bound to the given namespace
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, uri)| uri.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Iterate over prefixed bindings in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Resolve a prefixed name to a QName.
    ///
    /// Unprefixed names take the default namespace, which is the rule for
    /// QName-valued attributes in schema documents.
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }

    /// Resolve an element name (prefix or default namespace applies)
    pub fn resolve_element_name(&self, raw: &str) -> Result<QName> {
        self.resolve(raw)
    }

    /// Resolve an attribute name (unprefixed attributes are in no namespace)
    pub fn resolve_attribute_name(&self, raw: &str) -> Result<QName> {
        if raw.contains(':') {
            self.resolve(raw)
        } else {
            Ok(QName::local(raw))
        }
    }
}

//! Limits and constraints for schema resolution and XML transcoding
//!
//! This module defines limits that bound the work done on caller-supplied
//! input: instance document size and depth, the number of schema documents
//! merged into one registry, and the length of type derivation chains.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting depth of an instance document
    pub max_xml_depth: usize,

    /// Maximum instance document size in bytes
    pub max_xml_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,

    /// Maximum number of schema documents in one registry
    pub max_schema_documents: usize,

    /// Maximum length of an extension/restriction chain
    pub max_derivation_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_xml_size: 100 * 1024 * 1024, // 100 MB
            max_attributes: 1000,
            max_schema_documents: 1000,
            max_derivation_depth: 100,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_xml_size: 10 * 1024 * 1024, // 10 MB
            max_attributes: 100,
            max_schema_documents: 100,
            max_derivation_depth: 20,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10000,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 10000,
            max_schema_documents: 100000,
            max_derivation_depth: 1000,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of attributes is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "Attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of schema documents is within limits
    pub fn check_schema_documents(&self, count: usize) -> Result<()> {
        if count > self.max_schema_documents {
            Err(Error::LimitExceeded(format!(
                "Schema document count {} exceeds maximum {}",
                count, self.max_schema_documents
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a derivation chain is within limits
    pub fn check_derivation_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_derivation_depth {
            Err(Error::LimitExceeded(format!(
                "Derivation depth {} exceeds maximum {}",
                depth, self.max_derivation_depth
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_xml_depth, 1000);
        assert!(limits.check_xml_depth(500).is_ok());
        assert!(limits.check_xml_depth(1500).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_xml_depth < Limits::default().max_xml_depth);
        assert!(limits.check_xml_depth(150).is_err());
        assert!(limits.check_derivation_depth(21).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_xml_depth > Limits::default().max_xml_depth);
        assert!(limits.check_xml_depth(5000).is_ok());
    }

    #[test]
    fn test_check_xml_size() {
        let limits = Limits::default();
        assert!(limits.check_xml_size(1024).is_ok());
        assert!(limits.check_xml_size(200 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_check_schema_documents() {
        let limits = Limits::strict();
        assert!(limits.check_schema_documents(100).is_ok());
        assert!(limits.check_schema_documents(101).is_err());
    }
}

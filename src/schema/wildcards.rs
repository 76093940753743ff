//! XSD Wildcards
//!
//! `xs:any` and `xs:anyAttribute`. Wildcards are not expanded into slots;
//! a content model containing one marks its shape as preserving unknown
//! content.

use super::particles::Occurs;

/// How wildcard-matched content is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessContents {
    /// Validate against a declaration, which must exist
    #[default]
    Strict,
    /// Validate if a declaration exists
    Lax,
    /// Accept anything
    Skip,
}

impl ProcessContents {
    /// Parse from the attribute value
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "strict" => Some(Self::Strict),
            "lax" => Some(Self::Lax),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// An element or attribute wildcard
#[derive(Debug, Clone, PartialEq)]
pub struct Wildcard {
    /// Raw namespace constraint (`##any`, `##other`, list of URIs, ...)
    pub namespace: String,
    /// Processing mode
    pub process_contents: ProcessContents,
    /// Occurrence bounds (element wildcards only)
    pub occurs: Occurs,
}

impl Default for Wildcard {
    fn default() -> Self {
        Self {
            namespace: "##any".to_string(),
            process_contents: ProcessContents::default(),
            occurs: Occurs::once(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_contents() {
        assert_eq!(ProcessContents::from_str("lax"), Some(ProcessContents::Lax));
        assert_eq!(ProcessContents::from_str("skip"), Some(ProcessContents::Skip));
        assert_eq!(ProcessContents::from_str("bogus"), None);
        assert_eq!(Wildcard::default().namespace, "##any");
    }
}

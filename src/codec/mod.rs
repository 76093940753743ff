//! XML Codec
//!
//! Shape-driven transcoding between XML text and [`Record`]s:
//!
//! - [`Decoder`]: XML text + shape → record
//! - [`Encoder`]: record + shape → XML text, the exact inverse
//! - [`json`]: record ⇄ JSON
//!
//! Both directions read a finished [`ShapeArena`](crate::shapes::ShapeArena)
//! and never mutate it, so one arena can serve any number of calls.

pub mod decoder;
pub mod encoder;
pub mod json;
pub mod values;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use json::JsonBridge;
pub use values::{Record, ScalarValue, Value};

use crate::limits::Limits;

/// Default key for text content
pub const TEXT_KEY: &str = "$";

/// Default key for preserved unknown content
pub const UNKNOWN_KEY: &str = "$any";

/// Configuration for decoding
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Key used for text content
    text_key: String,
    /// Key used for children no slot matches
    unknown_key: String,
    /// Input limits
    limits: Limits,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            text_key: TEXT_KEY.to_string(),
            unknown_key: UNKNOWN_KEY.to_string(),
            limits: Limits::default(),
        }
    }
}

impl DecoderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the text key
    pub fn text_key(&self) -> &str {
        &self.text_key
    }

    /// Get the unknown-content key
    pub fn unknown_key(&self) -> &str {
        &self.unknown_key
    }

    /// Get the input limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Set text key
    pub fn with_text_key(mut self, key: impl Into<String>) -> Self {
        self.text_key = key.into();
        self
    }

    /// Set unknown-content key
    pub fn with_unknown_key(mut self, key: impl Into<String>) -> Self {
        self.unknown_key = key.into();
        self
    }

    /// Set input limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

/// Configuration for encoding
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Key used for text content
    text_key: String,
    /// Key used for preserved unknown content
    unknown_key: String,
    /// Encoding label of the XML declaration (None = no declaration)
    encoding: Option<String>,
    /// Indentation for XML output
    indent: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            text_key: TEXT_KEY.to_string(),
            unknown_key: UNKNOWN_KEY.to_string(),
            encoding: None,
            indent: 0,
        }
    }
}

impl EncoderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the text key
    pub fn text_key(&self) -> &str {
        &self.text_key
    }

    /// Get the unknown-content key
    pub fn unknown_key(&self) -> &str {
        &self.unknown_key
    }

    /// Get the declaration encoding label
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Get indentation level
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Set text key
    pub fn with_text_key(mut self, key: impl Into<String>) -> Self {
        self.text_key = key.into();
        self
    }

    /// Set unknown-content key
    pub fn with_unknown_key(mut self, key: impl Into<String>) -> Self {
        self.unknown_key = key.into();
        self
    }

    /// Emit an XML declaration with this encoding label
    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set indentation
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let decoder = DecoderConfig::new();
        assert_eq!(decoder.text_key(), "$");
        assert_eq!(decoder.unknown_key(), "$any");

        let encoder = EncoderConfig::new()
            .with_text_key("#text")
            .with_encoding(Some("UTF-8".to_string()))
            .with_indent(2);
        assert_eq!(encoder.text_key(), "#text");
        assert_eq!(encoder.unknown_key(), "$any");
        assert_eq!(encoder.encoding(), Some("UTF-8"));
        assert_eq!(encoder.indent(), 2);
    }
}

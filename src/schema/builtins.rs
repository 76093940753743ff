//! XSD built-in types
//!
//! Maps the built-in datatypes of the XSD namespace onto the scalar kinds
//! the codec knows how to convert. Derived builtins map to the kind of the
//! primitive they are restricted from.

use serde::Serialize;
use std::fmt;

use crate::namespaces::QName;

/// XSD 1.0 Namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// anyType local name
pub const XSD_ANY_TYPE: &str = "anyType";
/// anySimpleType local name
pub const XSD_ANY_SIMPLE_TYPE: &str = "anySimpleType";

/// Value space a scalar slot converts text into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarKind {
    /// Text passthrough
    String,
    /// `true`/`false`/`1`/`0`
    Boolean,
    /// Whole numbers (`i64`)
    Integer,
    /// Arbitrary precision decimal
    Decimal,
    /// IEEE double (xs:float and xs:double)
    Double,
    /// ISO-8601 calendar date
    Date,
    /// ISO-8601 time of day
    Time,
    /// ISO-8601 date and time
    DateTime,
    /// Base64 encoded bytes
    Base64Binary,
    /// Hex encoded bytes
    HexBinary,
    /// Whitespace-separated sequence of the item kind
    List(Box<ScalarKind>),
    /// First member kind that accepts the text
    Union(Vec<ScalarKind>),
}

impl ScalarKind {
    /// Short label used in diagnostics
    pub fn label(&self) -> String {
        match self {
            ScalarKind::String => "string".to_string(),
            ScalarKind::Boolean => "boolean".to_string(),
            ScalarKind::Integer => "integer".to_string(),
            ScalarKind::Decimal => "decimal".to_string(),
            ScalarKind::Double => "double".to_string(),
            ScalarKind::Date => "date".to_string(),
            ScalarKind::Time => "time".to_string(),
            ScalarKind::DateTime => "dateTime".to_string(),
            ScalarKind::Base64Binary => "base64Binary".to_string(),
            ScalarKind::HexBinary => "hexBinary".to_string(),
            ScalarKind::List(item) => format!("list({})", item.label()),
            ScalarKind::Union(members) => format!(
                "union({})",
                members.iter().map(|m| m.label()).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Whether a name is in the XSD namespace
pub fn is_xsd_name(name: &QName) -> bool {
    name.is_in(XSD_NAMESPACE)
}

/// Scalar kind of a built-in simple type, by local name
pub fn builtin_kind(local_name: &str) -> Option<ScalarKind> {
    let kind = match local_name {
        "string" | "normalizedString" | "token" | "language" | "Name" | "NCName" | "ID"
        | "IDREF" | "ENTITY" | "NMTOKEN" | "anyURI" | "QName" | "NOTATION" | "duration"
        | "gYearMonth" | "gYear" | "gMonthDay" | "gDay" | "gMonth" | "dayTimeDuration"
        | "yearMonthDuration" | XSD_ANY_SIMPLE_TYPE | "anyAtomicType" => ScalarKind::String,
        "IDREFS" | "ENTITIES" | "NMTOKENS" => ScalarKind::List(Box::new(ScalarKind::String)),
        "boolean" => ScalarKind::Boolean,
        "integer" | "long" | "int" | "short" | "byte" | "nonNegativeInteger"
        | "positiveInteger" | "unsignedLong" | "unsignedInt" | "unsignedShort"
        | "unsignedByte" | "nonPositiveInteger" | "negativeInteger" => ScalarKind::Integer,
        "decimal" => ScalarKind::Decimal,
        "float" | "double" => ScalarKind::Double,
        "date" => ScalarKind::Date,
        "time" => ScalarKind::Time,
        "dateTime" | "dateTimeStamp" => ScalarKind::DateTime,
        "base64Binary" => ScalarKind::Base64Binary,
        "hexBinary" => ScalarKind::HexBinary,
        _ => return None,
    };
    Some(kind)
}

/// Whether the builtin collapses whitespace before conversion
pub fn builtin_collapses_whitespace(local_name: &str) -> bool {
    !matches!(local_name, "string" | "normalizedString" | XSD_ANY_SIMPLE_TYPE)
}

//! Record values and scalar conversions
//!
//! Decoding turns normalized text into a [`ScalarValue`] of the slot's
//! [`ScalarKind`]; encoding writes the exact lexical form that decoding reads
//! back, so `parse(kind, format(kind, v)) == v` for every value the decoder
//! can produce.

use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use indexmap::IndexMap;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt;

use crate::schema::{Facets, ScalarKind, WhiteSpace};

/// Decoded attributes and children of one element, keyed by slot key
pub type Record = IndexMap<String, Value>;

/// A decoded value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `xsi:nil="true"`
    Null,
    /// Text converted to a scalar
    Scalar(ScalarValue),
    /// A nested element
    Record(Record),
    /// Occurrences of a repeated slot, in document order
    List(Vec<Value>),
}

impl Value {
    /// The record inside, if any
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The items inside, if any
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The scalar inside, if any
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }
}

impl From<ScalarValue> for Value {
    fn from(value: ScalarValue) -> Self {
        Value::Scalar(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(ScalarValue::String(s.to_string()))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(ScalarValue::Integer(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(ScalarValue::Boolean(b))
    }
}

/// A typed scalar
#[derive(Debug, Clone)]
pub enum ScalarValue {
    /// String-like kinds
    String(String),
    /// xs:boolean
    Boolean(bool),
    /// Integer-derived kinds
    Integer(i64),
    /// xs:decimal
    Decimal(Decimal),
    /// xs:float and xs:double
    Double(f64),
    /// xs:date with its optional offset
    Date(NaiveDate, Option<FixedOffset>),
    /// xs:time with its optional offset
    Time(NaiveTime, Option<FixedOffset>),
    /// xs:dateTime with an offset
    DateTime(DateTime<FixedOffset>),
    /// xs:dateTime without an offset
    LocalDateTime(NaiveDateTime),
    /// Decoded base64Binary or hexBinary
    Binary(Vec<u8>),
    /// Items of a list type
    List(Vec<ScalarValue>),
}

/// Doubles compare NaN equal to NaN, since `NaN` decodes back to NaN
impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarValue::String(a), ScalarValue::String(b)) => a == b,
            (ScalarValue::Boolean(a), ScalarValue::Boolean(b)) => a == b,
            (ScalarValue::Integer(a), ScalarValue::Integer(b)) => a == b,
            (ScalarValue::Decimal(a), ScalarValue::Decimal(b)) => a == b,
            (ScalarValue::Double(a), ScalarValue::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (ScalarValue::Date(a, x), ScalarValue::Date(b, y)) => a == b && x == y,
            (ScalarValue::Time(a, x), ScalarValue::Time(b, y)) => a == b && x == y,
            (ScalarValue::DateTime(a), ScalarValue::DateTime(b)) => a == b,
            (ScalarValue::LocalDateTime(a), ScalarValue::LocalDateTime(b)) => a == b,
            (ScalarValue::Binary(a), ScalarValue::Binary(b)) => a == b,
            (ScalarValue::List(a), ScalarValue::List(b)) => a == b,
            _ => false,
        }
    }
}

/// Lexical form independent of a slot kind (binary as base64)
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(s) => write!(f, "{}", s),
            ScalarValue::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Decimal(d) => write!(f, "{}", d),
            ScalarValue::Double(v) => write!(f, "{}", format_double(*v)),
            ScalarValue::Date(date, offset) => {
                write!(f, "{}{}", date.format("%Y-%m-%d"), format_offset(*offset))
            }
            ScalarValue::Time(time, offset) => {
                write!(f, "{}{}", time.format("%H:%M:%S%.3f"), format_offset(*offset))
            }
            ScalarValue::DateTime(dt) => write!(
                f,
                "{}{}",
                dt.naive_local().format("%Y-%m-%dT%H:%M:%S%.3f"),
                format_offset(Some(*dt.offset()))
            ),
            ScalarValue::LocalDateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3f")),
            ScalarValue::Binary(bytes) => {
                write!(f, "{}", base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            ScalarValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
        }
    }
}

/// Convert whitespace-normalized text into a value of `kind`
pub fn parse_scalar(kind: &ScalarKind, text: &str) -> Result<ScalarValue, String> {
    match kind {
        ScalarKind::String => Ok(ScalarValue::String(text.to_string())),
        ScalarKind::Boolean => match text {
            "true" | "1" => Ok(ScalarValue::Boolean(true)),
            "false" | "0" => Ok(ScalarValue::Boolean(false)),
            _ => Err("expected true, false, 1 or 0".to_string()),
        },
        ScalarKind::Integer => parse_integer(text),
        ScalarKind::Decimal => parse_decimal(text).map(ScalarValue::Decimal),
        ScalarKind::Double => parse_double(text).map(ScalarValue::Double),
        ScalarKind::Date => {
            let (body, offset) = split_offset(text)?;
            NaiveDate::parse_from_str(body, "%Y-%m-%d")
                .map(|date| ScalarValue::Date(date, offset))
                .map_err(|e| e.to_string())
        }
        ScalarKind::Time => {
            let (body, offset) = split_offset(text)?;
            NaiveTime::parse_from_str(body, "%H:%M:%S%.f")
                .map(|time| ScalarValue::Time(truncate_millis(time), offset))
                .map_err(|e| e.to_string())
        }
        ScalarKind::DateTime => {
            let (body, offset) = split_offset(text)?;
            let naive = NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f").map_err(|e| e.to_string())?;
            let naive = naive.date().and_time(truncate_millis(naive.time()));
            match offset {
                Some(offset) => offset
                    .from_local_datetime(&naive)
                    .single()
                    .map(ScalarValue::DateTime)
                    .ok_or_else(|| "ambiguous local time".to_string()),
                None => Ok(ScalarValue::LocalDateTime(naive)),
            }
        }
        ScalarKind::Base64Binary => {
            let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            base64::engine::general_purpose::STANDARD
                .decode(cleaned)
                .map(ScalarValue::Binary)
                .map_err(|e| e.to_string())
        }
        ScalarKind::HexBinary => parse_hex(text).map(ScalarValue::Binary),
        ScalarKind::List(item) => text
            .split_whitespace()
            .map(|part| parse_scalar(item, part))
            .collect::<Result<Vec<_>, _>>()
            .map(ScalarValue::List),
        ScalarKind::Union(members) => members
            .iter()
            .find_map(|member| parse_scalar(member, text).ok())
            .ok_or_else(|| "no member type accepts the value".to_string()),
    }
}

/// Lexical form of `value` for a slot of `kind`
pub fn format_scalar(kind: &ScalarKind, value: &ScalarValue) -> Result<String, String> {
    match (kind, value) {
        (ScalarKind::String, ScalarValue::List(_)) => Err("expected a single value, found a list".to_string()),
        (ScalarKind::String, other) => Ok(other.to_string()),
        (ScalarKind::Boolean, ScalarValue::Boolean(_))
        | (ScalarKind::Integer, ScalarValue::Integer(_))
        | (ScalarKind::Decimal, ScalarValue::Decimal(_) | ScalarValue::Integer(_))
        | (ScalarKind::Double, ScalarValue::Double(_) | ScalarValue::Integer(_))
        | (ScalarKind::Date, ScalarValue::Date(..))
        | (ScalarKind::Time, ScalarValue::Time(..))
        | (ScalarKind::DateTime, ScalarValue::DateTime(_) | ScalarValue::LocalDateTime(_))
        | (ScalarKind::Base64Binary, ScalarValue::Binary(_)) => Ok(value.to_string()),
        (ScalarKind::HexBinary, ScalarValue::Binary(bytes)) => {
            Ok(bytes.iter().map(|b| format!("{:02X}", b)).collect())
        }
        (ScalarKind::List(item), ScalarValue::List(items)) => {
            let parts = items
                .iter()
                .map(|i| format_scalar(item, i))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts.join(" "))
        }
        (ScalarKind::Integer, ScalarValue::Decimal(d)) if d.scale() == 0 && i64::try_from(*d).is_err() => {
            Ok(d.to_string())
        }
        (ScalarKind::Union(_), ScalarValue::List(_)) => Err("expected a single value, found a list".to_string()),
        // The first member that reads the text back wins on decode
        (ScalarKind::Union(members), other) => members
            .iter()
            .filter_map(|member| format_scalar(member, other).ok())
            .find(|text| parse_scalar(kind, text).is_ok_and(|back| back == *other))
            .ok_or_else(|| {
                format!(
                    "{} value {} would decode as a different member of {}",
                    variant_label(other),
                    other,
                    kind
                )
            }),
        (kind, other) => Err(format!("{} value {} does not fit a {} slot", variant_label(other), other, kind)),
    }
}

/// Check enumeration, pattern, length and bound facets against a decoded value
pub fn check_facets(facets: &Facets, text: &str, value: &ScalarValue) -> Result<(), String> {
    let white_space = facets.white_space.unwrap_or(WhiteSpace::Preserve);
    if !facets.enumeration.is_empty() && !facets.enumeration.iter().any(|e| white_space.normalize(e) == text) {
        return Err(format!("not one of [{}]", facets.enumeration.join(", ")));
    }

    for pattern in &facets.patterns {
        match Regex::new(&format!("^(?:{})$", pattern)) {
            Ok(re) if !re.is_match(text) => return Err(format!("does not match pattern '{}'", pattern)),
            Ok(_) => {}
            Err(e) => tracing::trace!(pattern = %pattern, error = %e, "pattern not supported, skipped"),
        }
    }

    let length = match value {
        ScalarValue::String(s) => Some(s.chars().count()),
        ScalarValue::Binary(bytes) => Some(bytes.len()),
        ScalarValue::List(items) => Some(items.len()),
        _ => None,
    };
    if let Some(length) = length {
        if facets.length.is_some_and(|l| length != l) {
            return Err(format!("length {} is not {}", length, facets.length.unwrap_or_default()));
        }
        if facets.min_length.is_some_and(|l| length < l) {
            return Err(format!("length {} is below the minimum", length));
        }
        if facets.max_length.is_some_and(|l| length > l) {
            return Err(format!("length {} is above the maximum", length));
        }
    }

    let number = match value {
        ScalarValue::Integer(i) => Some(Decimal::from(*i)),
        ScalarValue::Decimal(d) => Some(*d),
        ScalarValue::Double(v) => Decimal::from_f64(*v),
        _ => None,
    };
    if let Some(number) = number {
        check_bound(&facets.min_inclusive, |b| number >= b, "below minInclusive")?;
        check_bound(&facets.max_inclusive, |b| number <= b, "above maxInclusive")?;
        check_bound(&facets.min_exclusive, |b| number > b, "not above minExclusive")?;
        check_bound(&facets.max_exclusive, |b| number < b, "not below maxExclusive")?;

        let normalized = number.normalize();
        if let Some(total) = facets.total_digits {
            let digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
            if digits > total {
                return Err(format!("{} digits exceed totalDigits {}", digits, total));
            }
        }
        if let Some(fraction) = facets.fraction_digits {
            if normalized.scale() > fraction {
                return Err(format!("{} fraction digits exceed {}", normalized.scale(), fraction));
            }
        }
    }

    Ok(())
}

fn check_bound(bound: &Option<String>, holds: impl Fn(Decimal) -> bool, message: &str) -> Result<(), String> {
    match bound.as_deref().map(parse_decimal) {
        Some(Ok(b)) if !holds(b) => Err(format!("{} {}", message, b)),
        _ => Ok(()),
    }
}

/// xs:integer lexical form; values outside `i64` become decimals
fn parse_integer(text: &str) -> Result<ScalarValue, String> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("not a valid integer".to_string());
    }
    if let Ok(i) = text.parse::<i64>() {
        return Ok(ScalarValue::Integer(i));
    }
    let magnitude = digits.parse::<Decimal>().map_err(|e| e.to_string())?;
    Ok(ScalarValue::Decimal(if negative { -magnitude } else { magnitude }))
}

fn parse_decimal(text: &str) -> Result<Decimal, String> {
    if text.contains(['e', 'E']) {
        return Err("exponent notation is not a decimal".to_string());
    }
    text.parse::<Decimal>().map_err(|e| e.to_string())
}

fn parse_double(text: &str) -> Result<f64, String> {
    match text {
        "INF" | "+INF" => Ok(f64::INFINITY),
        "-INF" => Ok(f64::NEG_INFINITY),
        "NaN" => Ok(f64::NAN),
        _ if text.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => {
            Err("not a valid double".to_string())
        }
        _ => text.parse::<f64>().map_err(|e| e.to_string()),
    }
}

fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "INF".to_string()
    } else if value == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        value.to_string()
    }
}

fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    if text.len() % 2 != 0 || !text.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("not a valid hexadecimal encoding".to_string());
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}

/// Split a trailing `Z` or `±hh:mm` off a temporal literal
fn split_offset(text: &str) -> Result<(&str, Option<FixedOffset>), String> {
    if let Some(body) = text.strip_suffix('Z') {
        return Ok((body, FixedOffset::east_opt(0)));
    }
    let bytes = text.as_bytes();
    if bytes.len() > 6 && matches!(bytes[bytes.len() - 6], b'+' | b'-') && bytes[bytes.len() - 3] == b':' {
        let (body, zone) = text.split_at(text.len() - 6);
        let hours: i32 = zone[1..3].parse().map_err(|_| format!("invalid offset '{}'", zone))?;
        let minutes: i32 = zone[4..6].parse().map_err(|_| format!("invalid offset '{}'", zone))?;
        let seconds = (hours * 60 + minutes) * 60;
        let offset = if zone.starts_with('-') {
            FixedOffset::west_opt(seconds)
        } else {
            FixedOffset::east_opt(seconds)
        };
        return offset
            .map(|o| (body, Some(o)))
            .ok_or_else(|| format!("offset '{}' out of range", zone));
    }
    Ok((text, None))
}

fn format_offset(offset: Option<FixedOffset>) -> String {
    match offset {
        None => String::new(),
        Some(o) if o.local_minus_utc() == 0 => "Z".to_string(),
        Some(o) => o.to_string(),
    }
}

fn truncate_millis(time: NaiveTime) -> NaiveTime {
    let millis = time.nanosecond() / 1_000_000 * 1_000_000;
    time.with_nanosecond(millis).unwrap_or(time)
}

fn variant_label(value: &ScalarValue) -> &'static str {
    match value {
        ScalarValue::String(_) => "string",
        ScalarValue::Boolean(_) => "boolean",
        ScalarValue::Integer(_) => "integer",
        ScalarValue::Decimal(_) => "decimal",
        ScalarValue::Double(_) => "double",
        ScalarValue::Date(..) => "date",
        ScalarValue::Time(..) => "time",
        ScalarValue::DateTime(_) | ScalarValue::LocalDateTime(_) => "dateTime",
        ScalarValue::Binary(_) => "binary",
        ScalarValue::List(_) => "list",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trip(kind: &ScalarKind, text: &str) -> String {
        let value = parse_scalar(kind, text).unwrap();
        format_scalar(kind, &value).unwrap()
    }

    #[test]
    fn test_booleans() {
        assert_eq!(parse_scalar(&ScalarKind::Boolean, "1"), Ok(ScalarValue::Boolean(true)));
        assert_eq!(parse_scalar(&ScalarKind::Boolean, "false"), Ok(ScalarValue::Boolean(false)));
        assert!(parse_scalar(&ScalarKind::Boolean, "yes").is_err());
        assert_eq!(round_trip(&ScalarKind::Boolean, "0"), "false");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_scalar(&ScalarKind::Integer, "25"), Ok(ScalarValue::Integer(25)));
        assert!(parse_scalar(&ScalarKind::Integer, "2.5").is_err());
        assert!(parse_scalar(&ScalarKind::Integer, "1e20").is_err());
        assert!(parse_scalar(&ScalarKind::Integer, "-").is_err());
        assert_eq!(round_trip(&ScalarKind::Decimal, "1.50"), "1.50");
        assert!(parse_scalar(&ScalarKind::Decimal, "1e3").is_err());
        assert_eq!(round_trip(&ScalarKind::Double, "INF"), "INF");
        assert_eq!(round_trip(&ScalarKind::Double, "-INF"), "-INF");
        assert_eq!(round_trip(&ScalarKind::Double, "2.5"), "2.5");
        assert!(parse_scalar(&ScalarKind::Double, "infinity").is_err());
    }

    #[test]
    fn test_temporal_values_keep_milliseconds() {
        assert_eq!(
            round_trip(&ScalarKind::DateTime, "2024-03-01T10:15:30.123456Z"),
            "2024-03-01T10:15:30.123Z"
        );
        assert_eq!(
            round_trip(&ScalarKind::DateTime, "2024-03-01T10:15:30+02:00"),
            "2024-03-01T10:15:30.000+02:00"
        );
        assert_eq!(
            round_trip(&ScalarKind::DateTime, "2024-03-01T10:15:30"),
            "2024-03-01T10:15:30.000"
        );
        assert_eq!(round_trip(&ScalarKind::Date, "2024-03-01-05:00"), "2024-03-01-05:00");
        assert_eq!(round_trip(&ScalarKind::Time, "23:59:01"), "23:59:01.000");
        assert!(parse_scalar(&ScalarKind::Date, "2024-13-01").is_err());
    }

    #[test]
    fn test_binary_lists_and_unions() {
        assert_eq!(round_trip(&ScalarKind::HexBinary, "0fB7"), "0FB7");
        assert_eq!(
            parse_scalar(&ScalarKind::Base64Binary, "aGVs\nbG8="),
            Ok(ScalarValue::Binary(b"hello".to_vec()))
        );
        let list = ScalarKind::List(Box::new(ScalarKind::Integer));
        assert_eq!(
            parse_scalar(&list, "1 2  3"),
            Ok(ScalarValue::List(vec![
                ScalarValue::Integer(1),
                ScalarValue::Integer(2),
                ScalarValue::Integer(3)
            ]))
        );
        let union = ScalarKind::Union(vec![ScalarKind::Integer, ScalarKind::String]);
        assert_eq!(parse_scalar(&union, "7"), Ok(ScalarValue::Integer(7)));
        assert_eq!(parse_scalar(&union, "seven"), Ok(ScalarValue::String("seven".into())));
        assert_eq!(format_scalar(&union, &ScalarValue::Integer(7)), Ok("7".to_string()));
        assert_eq!(format_scalar(&union, &ScalarValue::String("seven".into())), Ok("seven".to_string()));
    }

    #[test]
    fn test_union_rejects_values_read_back_as_another_member() {
        let union = ScalarKind::Union(vec![ScalarKind::Integer, ScalarKind::String]);
        let err = format_scalar(&union, &ScalarValue::String("7".into())).unwrap_err();
        assert!(err.contains("different member"), "{}", err);

        let dates_first = ScalarKind::Union(vec![ScalarKind::Date, ScalarKind::String]);
        assert!(format_scalar(&dates_first, &ScalarValue::String("2024-01-01".into())).is_err());
        assert_eq!(
            format_scalar(&dates_first, &ScalarValue::String("soon".into())),
            Ok("soon".to_string())
        );
    }

    #[test]
    fn test_integers_beyond_i64_become_decimals() {
        let max = "18446744073709551615";
        let value = parse_scalar(&ScalarKind::Integer, max).unwrap();
        assert_eq!(value, ScalarValue::Decimal(max.parse().unwrap()));
        assert_eq!(format_scalar(&ScalarKind::Integer, &value), Ok(max.to_string()));

        assert_eq!(
            parse_scalar(&ScalarKind::Integer, "-100000000000000000000"),
            Ok(ScalarValue::Decimal("-100000000000000000000".parse().unwrap()))
        );
        assert_eq!(parse_scalar(&ScalarKind::Integer, "+42"), Ok(ScalarValue::Integer(42)));
        // In-range decimals would decode as integers
        assert!(format_scalar(&ScalarKind::Integer, &ScalarValue::Decimal(Decimal::from(5))).is_err());
    }

    #[test]
    fn test_nan_equals_nan() {
        let nan = parse_scalar(&ScalarKind::Double, "NaN").unwrap();
        assert_eq!(nan, ScalarValue::Double(f64::NAN));
        assert_eq!(format_scalar(&ScalarKind::Double, &nan), Ok("NaN".to_string()));
        assert_ne!(ScalarValue::Double(f64::NAN), ScalarValue::Double(1.0));
        assert_eq!(ScalarValue::Double(0.0), ScalarValue::Double(-0.0));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        assert!(format_scalar(&ScalarKind::Integer, &ScalarValue::String("x".into())).is_err());
        assert_eq!(format_scalar(&ScalarKind::String, &ScalarValue::Integer(4)), Ok("4".to_string()));
        assert_eq!(format_scalar(&ScalarKind::Decimal, &ScalarValue::Integer(4)), Ok("4".to_string()));
    }

    #[test]
    fn test_facets() {
        let facets = Facets {
            enumeration: vec!["A".into(), "B".into()],
            ..Facets::default()
        };
        assert!(check_facets(&facets, "A", &ScalarValue::String("A".into())).is_ok());
        assert!(check_facets(&facets, "C", &ScalarValue::String("C".into())).is_err());

        let facets = Facets {
            patterns: vec![r"[A-Z]{2}\d".into()],
            max_length: Some(3),
            ..Facets::default()
        };
        assert!(check_facets(&facets, "AB1", &ScalarValue::String("AB1".into())).is_ok());
        assert!(check_facets(&facets, "AB12", &ScalarValue::String("AB12".into())).is_err());

        let facets = Facets {
            min_inclusive: Some("0".into()),
            max_exclusive: Some("100".into()),
            fraction_digits: Some(1),
            ..Facets::default()
        };
        let d = |s: &str| ScalarValue::Decimal(s.parse().unwrap());
        assert!(check_facets(&facets, "99.5", &d("99.5")).is_ok());
        assert!(check_facets(&facets, "100", &d("100")).is_err());
        assert!(check_facets(&facets, "-1", &ScalarValue::Integer(-1)).is_err());
        assert!(check_facets(&facets, "1.25", &d("1.25")).is_err());
    }
}

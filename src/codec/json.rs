//! Records ⇄ JSON
//!
//! Booleans, integers and doubles become JSON booleans and numbers; every
//! other scalar is written in its XML lexical form so the conversion back,
//! guided by the same shape, restores the exact value.

use serde_json::{Map, Number, Value as JsonValue};

use super::values::{format_scalar, parse_scalar, Record, ScalarValue, Value};
use super::{TEXT_KEY, UNKNOWN_KEY};
use crate::error::{EncodeError, Error, Result};
use crate::namespaces::QName;
use crate::schema::ScalarKind;
use crate::shapes::{EffectiveShape, ElementSlot, ScalarType, ShapeArena, ShapeId, SlotContent};

/// Converts records of one shape arena to and from JSON
#[derive(Debug, Clone)]
pub struct JsonBridge<'a> {
    shapes: &'a ShapeArena,
    text_key: String,
    unknown_key: String,
}

impl<'a> JsonBridge<'a> {
    /// Create a bridge using the default record keys
    pub fn new(shapes: &'a ShapeArena) -> Self {
        Self {
            shapes,
            text_key: TEXT_KEY.to_string(),
            unknown_key: UNKNOWN_KEY.to_string(),
        }
    }

    /// Use custom text and unknown-content keys
    pub fn with_keys(mut self, text_key: impl Into<String>, unknown_key: impl Into<String>) -> Self {
        self.text_key = text_key.into();
        self.unknown_key = unknown_key.into();
        self
    }

    /// JSON form of a record of the given shape
    pub fn record_to_json(&self, shape: ShapeId, record: &Record) -> Result<JsonValue> {
        let shape = self.shape(shape)?;
        let mut object = Map::new();
        for (key, value) in record {
            let json = if let Some(slot) = shape.attribute(key) {
                scalar_json(&slot.name, &slot.scalar, value, &slot.origin)?
            } else if let Some(slot) = shape.element(key) {
                self.slot_json(slot, value)?
            } else if *key == self.text_key {
                match &shape.text {
                    Some(text_type) => scalar_json(&owner(shape), text_type, value, &shape.origin)?,
                    None => plain_json(value),
                }
            } else if *key == self.unknown_key {
                plain_json(value)
            } else {
                return Err(unexpected(&owner(shape), format!("no slot for key '{}'", key), &shape.origin));
            };
            object.insert(key.clone(), json);
        }
        Ok(JsonValue::Object(object))
    }

    /// JSON form of a global element's value
    pub fn value_to_json(&self, slot: &ElementSlot, value: &Value) -> Result<JsonValue> {
        match value {
            Value::List(_) => Err(unexpected(&slot.name, "nested lists are not allowed", &slot.origin)),
            _ => self.single_json(slot, value),
        }
    }

    /// Record of the given shape from its JSON form
    pub fn record_from_json(&self, shape: ShapeId, json: &JsonValue) -> Result<Record> {
        let shape = self.shape(shape)?;
        let object = json
            .as_object()
            .ok_or_else(|| unexpected(&owner(shape), "expected a JSON object", &shape.origin))?;

        let mut record = Record::new();
        for (key, json) in object {
            let value = if let Some(slot) = shape.attribute(key) {
                Value::Scalar(scalar_from_json(&slot.name, &slot.scalar, json, &slot.origin)?)
            } else if let Some(slot) = shape.element(key) {
                self.slot_from_json(slot, json)?
            } else if *key == self.text_key {
                let text_type = shape.text.clone().unwrap_or_else(|| {
                    ScalarType::new(ScalarKind::String, QName::namespaced(crate::XSD_NAMESPACE, "string"))
                });
                Value::Scalar(scalar_from_json(&owner(shape), &text_type, json, &shape.origin)?)
            } else if *key == self.unknown_key {
                let fragments = json
                    .as_array()
                    .ok_or_else(|| unexpected(&owner(shape), "unknown content must be an array", &shape.origin))?;
                Value::List(
                    fragments
                        .iter()
                        .map(|f| match f.as_str() {
                            Some(xml) => Ok(Value::Scalar(ScalarValue::String(xml.to_string()))),
                            None => Err(unexpected(&owner(shape), "unknown content must be XML text", &shape.origin)),
                        })
                        .collect::<Result<_>>()?,
                )
            } else {
                return Err(unexpected(&owner(shape), format!("no slot for key '{}'", key), &shape.origin));
            };
            record.insert(key.clone(), value);
        }
        Ok(record)
    }

    /// Value of a global element from its JSON form
    pub fn value_from_json(&self, slot: &ElementSlot, json: &JsonValue) -> Result<Value> {
        self.single_from_json(slot, json)
    }

    fn shape(&self, id: ShapeId) -> Result<&'a EffectiveShape> {
        self.shapes
            .get(id)
            .ok_or_else(|| Error::Resource(format!("unknown shape {}", id)))
    }

    fn slot_json(&self, slot: &ElementSlot, value: &Value) -> Result<JsonValue> {
        match value {
            Value::List(items) if slot.is_repeated() => Ok(JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.single_json(slot, item))
                    .collect::<Result<_>>()?,
            )),
            _ => self.single_json(slot, value),
        }
    }

    fn single_json(&self, slot: &ElementSlot, value: &Value) -> Result<JsonValue> {
        match (value, &slot.content) {
            (Value::Null, _) => Ok(JsonValue::Null),
            (Value::Record(record), SlotContent::Complex(id)) => self.record_to_json(*id, record),
            (_, SlotContent::Scalar(scalar_type)) => scalar_json(&slot.name, scalar_type, value, &slot.origin),
            _ => Err(unexpected(&slot.name, "expected a record", &slot.origin)),
        }
    }

    fn slot_from_json(&self, slot: &ElementSlot, json: &JsonValue) -> Result<Value> {
        match json {
            JsonValue::Array(items) if slot.is_repeated() => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.single_from_json(slot, item))
                    .collect::<Result<_>>()?,
            )),
            _ if slot.is_repeated() => Err(unexpected(&slot.name, "repeated element expects an array", &slot.origin)),
            _ => self.single_from_json(slot, json),
        }
    }

    fn single_from_json(&self, slot: &ElementSlot, json: &JsonValue) -> Result<Value> {
        match (json, &slot.content) {
            (JsonValue::Null, _) => Ok(Value::Null),
            (_, SlotContent::Complex(id)) => Ok(Value::Record(self.record_from_json(*id, json)?)),
            (_, SlotContent::Scalar(scalar_type)) => Ok(Value::Scalar(scalar_from_json(
                &slot.name,
                scalar_type,
                json,
                &slot.origin,
            )?)),
        }
    }
}

fn owner(shape: &EffectiveShape) -> QName {
    shape.name.clone().unwrap_or_else(|| QName::local("(anonymous)"))
}

fn scalar_json(name: &QName, scalar_type: &ScalarType, value: &Value, document: &str) -> Result<JsonValue> {
    let scalar = match value {
        Value::Scalar(scalar) => scalar,
        Value::Null => return Ok(JsonValue::Null),
        _ => return Err(unexpected(name, "expected a scalar", document)),
    };
    match scalar {
        ScalarValue::Boolean(b) => Ok(JsonValue::Bool(*b)),
        ScalarValue::Integer(i) => Ok(JsonValue::Number((*i).into())),
        ScalarValue::Double(v) => match Number::from_f64(*v) {
            Some(n) => Ok(JsonValue::Number(n)),
            None => Ok(JsonValue::String(scalar.to_string())),
        },
        _ => format_scalar(&scalar_type.kind, scalar)
            .map(JsonValue::String)
            .map_err(|reason| unexpected(name, reason, document)),
    }
}

fn scalar_from_json(name: &QName, scalar_type: &ScalarType, json: &JsonValue, document: &str) -> Result<ScalarValue> {
    let parsed = match (json, &scalar_type.kind) {
        (JsonValue::Bool(b), ScalarKind::Boolean | ScalarKind::Union(_)) => Ok(ScalarValue::Boolean(*b)),
        (JsonValue::Number(n), ScalarKind::Integer | ScalarKind::Union(_)) if n.is_i64() => {
            Ok(ScalarValue::Integer(n.as_i64().unwrap_or_default()))
        }
        (JsonValue::Number(n), ScalarKind::Double | ScalarKind::Union(_)) => {
            n.as_f64().map(ScalarValue::Double).ok_or_else(|| "number out of range".to_string())
        }
        (JsonValue::Number(n), kind) => parse_scalar(kind, &n.to_string()),
        (JsonValue::String(s), kind) => parse_scalar(kind, s),
        (JsonValue::Bool(b), ScalarKind::String) => Ok(ScalarValue::String(b.to_string())),
        (other, kind) => Err(format!("JSON {} does not fit a {} slot", other, kind)),
    };
    parsed.map_err(|reason| unexpected(name, reason, document))
}

/// JSON without shape guidance: text and fragments
fn plain_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Scalar(scalar) => JsonValue::String(scalar.to_string()),
        Value::Record(record) => JsonValue::Object(record.iter().map(|(k, v)| (k.clone(), plain_json(v))).collect()),
        Value::List(items) => JsonValue::Array(items.iter().map(plain_json).collect()),
    }
}

fn unexpected(name: &QName, reason: impl Into<String>, document: &str) -> Error {
    EncodeError::UnexpectedValue {
        name: name.clone(),
        reason: reason.into(),
        document: document.to_string(),
    }
    .into()
}

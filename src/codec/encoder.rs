//! XML Encoder
//!
//! Writes a record back as XML following the slot order of its shape.
//! Prefixes for every namespace the reachable shapes use are chosen once and
//! declared on the root element: the prefix the declaring schema document
//! used when it is free, a generated `nsN` otherwise.

use indexmap::IndexMap;

use super::values::{format_scalar, Record, ScalarValue, Value};
use super::EncoderConfig;
use crate::documents::{Document, Element};
use crate::error::{EncodeError, Error, Result};
use crate::namespaces::{QName, XML_PREFIX};
use crate::shapes::{EffectiveShape, ElementSlot, ScalarType, ShapeArena, ShapeId, SlotContent};

/// Namespace to prefix assignment of one encode call
#[derive(Debug, Default)]
struct Prefixes {
    by_namespace: IndexMap<String, String>,
}

impl Prefixes {
    fn prefix_for(&self, name: &QName) -> Option<String> {
        match name.namespace() {
            Some(crate::XML_NAMESPACE) => Some(XML_PREFIX.to_string()),
            Some(ns) => self.by_namespace.get(ns).cloned(),
            None => None,
        }
    }

    fn assign(&mut self, namespace: &str, preferred: Option<&str>) {
        if namespace == crate::XML_NAMESPACE || self.by_namespace.contains_key(namespace) {
            return;
        }
        let taken = |p: &str| self.by_namespace.values().any(|v| v == p);
        let prefix = match preferred {
            Some(p) if !p.is_empty() && !p.starts_with("xml") && !taken(p) => p.to_string(),
            _ => {
                let mut n = self.by_namespace.len();
                loop {
                    let candidate = format!("ns{}", n);
                    if !taken(&candidate) {
                        break candidate;
                    }
                    n += 1;
                }
            }
        };
        self.by_namespace.insert(namespace.to_string(), prefix);
    }
}

/// Encodes records into XML text
#[derive(Debug, Clone)]
pub struct Encoder<'a> {
    shapes: &'a ShapeArena,
    config: EncoderConfig,
}

impl<'a> Encoder<'a> {
    /// Create an encoder with default configuration
    pub fn new(shapes: &'a ShapeArena) -> Self {
        Self::with_config(shapes, EncoderConfig::default())
    }

    /// Create an encoder with the given configuration
    pub fn with_config(shapes: &'a ShapeArena, config: EncoderConfig) -> Self {
        Self { shapes, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode a record as an element named `tag` with the given shape
    pub fn encode(&self, tag: &QName, shape: ShapeId, record: &Record) -> Result<String> {
        let root = self.encode_tree(tag, shape, record)?;
        self.serialize(root)
    }

    /// Encode the value of a global element
    pub fn encode_element(&self, slot: &ElementSlot, value: &Value) -> Result<String> {
        let prefixes = self.prefixes(slot);
        let mut root = self.child(slot, value, &prefixes)?;
        declare(&mut root, &prefixes);
        self.serialize(root)
    }

    /// Build the element tree without serializing it
    pub fn encode_tree(&self, tag: &QName, shape: ShapeId, record: &Record) -> Result<Element> {
        let root = ElementSlot {
            name: tag.clone(),
            key: tag.local_name.clone(),
            content: SlotContent::Complex(shape),
            occurs: Default::default(),
            nillable: false,
            default: None,
            origin: self.shape(shape)?.origin.clone(),
        };
        let prefixes = self.prefixes(&root);
        let mut element = self.element(tag, shape, record, &prefixes)?;
        declare(&mut element, &prefixes);
        Ok(element)
    }

    fn serialize(&self, root: Element) -> Result<String> {
        let document = Document { root: Some(root) };
        document.to_xml(self.config.encoding(), self.config.indent())
    }

    fn shape(&self, id: ShapeId) -> Result<&'a EffectiveShape> {
        self.shapes
            .get(id)
            .ok_or_else(|| Error::Resource(format!("unknown shape {}", id)))
    }

    /// Prefixes for the root tag and every name reachable from it
    fn prefixes(&self, root: &ElementSlot) -> Prefixes {
        let reachable = match root.content {
            SlotContent::Complex(id) => self.shapes.reachable(id),
            SlotContent::Scalar(_) => Vec::new(),
        };
        let shapes: Vec<&EffectiveShape> = reachable.iter().filter_map(|id| self.shapes.get(*id)).collect();
        let preferred = |namespace: &str| shapes.iter().find_map(|s| s.preferred_prefix(namespace).filter(|p| !p.is_empty()));

        let mut prefixes = Prefixes::default();
        let mut nillable = root.nillable;
        if let Some(ns) = root.name.namespace() {
            prefixes.assign(ns, preferred(ns));
        }
        for shape in &shapes {
            for slot in &shape.attributes {
                if let Some(ns) = slot.name.namespace() {
                    prefixes.assign(ns, preferred(ns));
                }
            }
            for slot in &shape.elements {
                nillable |= slot.nillable;
                if let Some(ns) = slot.name.namespace() {
                    prefixes.assign(ns, preferred(ns));
                }
            }
        }
        if nillable {
            prefixes.assign(crate::XSI_NAMESPACE, Some("xsi"));
        }
        prefixes
    }

    fn element(&self, tag: &QName, id: ShapeId, record: &Record, prefixes: &Prefixes) -> Result<Element> {
        let shape = self.shape(id)?;
        let mut element = Element::new(tag.clone()).with_prefix(prefixes.prefix_for(tag));

        for key in record.keys() {
            let known = key == self.config.text_key()
                || key == self.config.unknown_key()
                || shape.attribute(key).is_some()
                || shape.element(key).is_some();
            if !known {
                return Err(unexpected(tag, format!("no slot for key '{}'", key), &shape.origin));
            }
        }

        for slot in &shape.attributes {
            match record.get(&slot.key) {
                Some(Value::Scalar(value)) => {
                    let text = self.format(&slot.name, &slot.scalar, value, &slot.origin)?;
                    element.set_attribute(slot.name.clone(), prefixes.prefix_for(&slot.name), text);
                }
                None if slot.required => {
                    return Err(EncodeError::MissingRequiredAttribute {
                        name: slot.name.clone(),
                        document: slot.origin.clone(),
                    }
                    .into())
                }
                None => {}
                Some(_) => return Err(unexpected(&slot.name, "expected a scalar", &slot.origin)),
            }
        }

        match record.get(self.config.text_key()) {
            None => {}
            Some(Value::Scalar(value)) => match &shape.text {
                Some(text_type) => element.set_text(self.format(tag, text_type, value, &shape.origin)?),
                None if shape.mixed => element.set_text(value.to_string()),
                None => return Err(unexpected(tag, "shape has no text content", &shape.origin)),
            },
            Some(_) => return Err(unexpected(tag, "text content must be a scalar", &shape.origin)),
        }

        for slot in &shape.elements {
            match record.get(&slot.key) {
                None if slot.is_required() => return Err(missing_element(slot)),
                None => {}
                Some(Value::List(items)) if slot.is_repeated() => {
                    if items.is_empty() && slot.is_required() {
                        return Err(missing_element(slot));
                    }
                    for item in items {
                        element.add_child(self.child(slot, item, prefixes)?);
                    }
                }
                Some(_) if slot.is_repeated() => {
                    return Err(unexpected(&slot.name, "repeated element expects a list", &slot.origin))
                }
                Some(value) => element.add_child(self.child(slot, value, prefixes)?),
            }
        }

        match record.get(self.config.unknown_key()) {
            None => {}
            Some(Value::List(fragments)) if shape.preserve_unknown => {
                for fragment in fragments {
                    match fragment {
                        Value::Scalar(ScalarValue::String(xml)) => element.raw_content.push(xml.clone()),
                        _ => return Err(unexpected(tag, "unknown content must be XML text", &shape.origin)),
                    }
                }
            }
            Some(_) => return Err(unexpected(tag, "shape does not accept unknown content", &shape.origin)),
        }

        Ok(element)
    }

    fn child(&self, slot: &ElementSlot, value: &Value, prefixes: &Prefixes) -> Result<Element> {
        match (value, &slot.content) {
            (Value::Null, _) if slot.nillable => {
                let mut element = Element::new(slot.name.clone()).with_prefix(prefixes.prefix_for(&slot.name));
                let nil = QName::namespaced(crate::XSI_NAMESPACE, "nil");
                let prefix = prefixes.prefix_for(&nil);
                element.set_attribute(nil, prefix, "true");
                Ok(element)
            }
            (Value::Null, _) => Err(unexpected(&slot.name, "element is not nillable", &slot.origin)),
            (Value::Scalar(scalar), SlotContent::Scalar(scalar_type)) => {
                let mut element = Element::new(slot.name.clone()).with_prefix(prefixes.prefix_for(&slot.name));
                element.set_text(self.format(&slot.name, scalar_type, scalar, &slot.origin)?);
                Ok(element)
            }
            (Value::Record(record), SlotContent::Complex(id)) => self.element(&slot.name, *id, record, prefixes),
            (Value::List(_), _) => Err(unexpected(&slot.name, "nested lists are not allowed", &slot.origin)),
            (_, SlotContent::Scalar(_)) => Err(unexpected(&slot.name, "expected a scalar", &slot.origin)),
            (_, SlotContent::Complex(_)) => Err(unexpected(&slot.name, "expected a record", &slot.origin)),
        }
    }

    fn format(&self, name: &QName, scalar_type: &ScalarType, value: &ScalarValue, document: &str) -> Result<String> {
        format_scalar(&scalar_type.kind, value).map_err(|reason| unexpected(name, reason, document))
    }
}

fn declare(root: &mut Element, prefixes: &Prefixes) {
    for (namespace, prefix) in &prefixes.by_namespace {
        root.declare(prefix.clone(), namespace.clone());
    }
}

fn missing_element(slot: &ElementSlot) -> Error {
    EncodeError::MissingRequiredElement {
        name: slot.name.clone(),
        document: slot.origin.clone(),
    }
    .into()
}

fn unexpected(name: &QName, reason: impl Into<String>, document: &str) -> Error {
    EncodeError::UnexpectedValue {
        name: name.clone(),
        reason: reason.into(),
        document: document.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Decoder;
    use crate::loaders::SchemaLoader;
    use crate::shapes::ShapeResolver;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:o="urn:orders"
                   targetNamespace="urn:orders" elementFormDefault="qualified">
            <xs:complexType name="Item">
                <xs:sequence><xs:element name="sku" type="xs:string"/></xs:sequence>
            </xs:complexType>
            <xs:complexType name="Order">
                <xs:sequence>
                    <xs:element name="item" type="o:Item" maxOccurs="unbounded"/>
                    <xs:element name="shipped" type="xs:dateTime" minOccurs="0" nillable="true"/>
                </xs:sequence>
                <xs:attribute name="orderId" type="xs:string" use="required"/>
                <xs:attribute name="rush" type="xs:boolean"/>
            </xs:complexType>
        </xs:schema>"#;

    fn resolve() -> (ShapeArena, ShapeId) {
        let mut loader = SchemaLoader::new();
        loader.add_source("orders.xsd", SCHEMA).unwrap();
        let registry = loader.load("orders.xsd").unwrap();
        let mut resolver = ShapeResolver::new(&registry);
        let id = resolver.resolve(&QName::namespaced("urn:orders", "Order")).unwrap();
        (resolver.into_shapes(), id)
    }

    fn item(sku: &str) -> Value {
        let mut record = Record::new();
        record.insert("sku".to_string(), Value::from(sku));
        Value::Record(record)
    }

    #[test]
    fn test_encode_repeated_in_order() {
        let (shapes, order) = resolve();
        let mut record = Record::new();
        record.insert("orderId".to_string(), Value::from("O1"));
        record.insert("item".to_string(), Value::List(vec![item("A"), item("B")]));

        let tag = QName::namespaced("urn:orders", "order");
        let xml = Encoder::new(&shapes).encode(&tag, order, &record).unwrap();
        assert_eq!(
            xml,
            r#"<o:order xmlns:o="urn:orders" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" orderId="O1"><o:item><o:sku>A</o:sku></o:item><o:item><o:sku>B</o:sku></o:item></o:order>"#
        );

        let decoded = Decoder::new(&shapes).decode(order, &xml).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_nil_and_declaration() {
        let (shapes, order) = resolve();
        let mut record = Record::new();
        record.insert("orderId".to_string(), Value::from("O2"));
        record.insert("rush".to_string(), Value::from(true));
        record.insert("item".to_string(), Value::List(vec![item("A")]));
        record.insert("shipped".to_string(), Value::Null);

        let encoder = Encoder::with_config(&shapes, EncoderConfig::new().with_encoding(Some("UTF-8".to_string())));
        let xml = encoder
            .encode(&QName::namespaced("urn:orders", "order"), order, &record)
            .unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"rush="true""#));
        assert!(xml.contains(r#"<o:shipped xsi:nil="true"/>"#));

        let decoded = Decoder::new(&shapes).decode(order, &xml).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_missing_required_attribute() {
        let (shapes, order) = resolve();
        let mut record = Record::new();
        record.insert("item".to_string(), Value::List(vec![item("A")]));
        let err = Encoder::new(&shapes)
            .encode(&QName::namespaced("urn:orders", "order"), order, &record)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Encode(EncodeError::MissingRequiredAttribute { ref name, ref document })
                if name == &QName::local("orderId") && document == "orders.xsd"
        ));
    }

    #[test]
    fn test_values_that_do_not_fit() {
        let (shapes, order) = resolve();
        let encoder = Encoder::new(&shapes);
        let tag = QName::namespaced("urn:orders", "order");

        let mut record = Record::new();
        record.insert("orderId".to_string(), Value::from("O3"));
        record.insert("item".to_string(), item("A"));
        assert!(matches!(
            encoder.encode(&tag, order, &record),
            Err(Error::Encode(EncodeError::UnexpectedValue { .. }))
        ));

        record.insert("item".to_string(), Value::List(vec![item("A")]));
        record.insert("rush".to_string(), Value::from("maybe"));
        assert!(matches!(
            encoder.encode(&tag, order, &record),
            Err(Error::Encode(EncodeError::UnexpectedValue { .. }))
        ));

        record.shift_remove("rush");
        record.insert("colour".to_string(), Value::from("red"));
        assert!(matches!(
            encoder.encode(&tag, order, &record),
            Err(Error::Encode(EncodeError::UnexpectedValue { .. }))
        ));
    }

    #[test]
    fn test_prefix_conflicts_get_generated_names() {
        let mut prefixes = Prefixes::default();
        prefixes.assign("urn:a", Some("p"));
        prefixes.assign("urn:b", Some("p"));
        prefixes.assign("urn:c", None);
        prefixes.assign("urn:a", Some("q"));
        assert_eq!(prefixes.prefix_for(&QName::namespaced("urn:a", "x")), Some("p".to_string()));
        assert_eq!(prefixes.prefix_for(&QName::namespaced("urn:b", "x")), Some("ns1".to_string()));
        assert_eq!(prefixes.prefix_for(&QName::namespaced("urn:c", "x")), Some("ns2".to_string()));
        assert_eq!(prefixes.prefix_for(&QName::local("x")), None);
        assert_eq!(
            prefixes.prefix_for(&QName::namespaced(crate::XML_NAMESPACE, "lang")),
            Some("xml".to_string())
        );
    }
}

//! XML Decoder
//!
//! Walks an instance tree against an [`EffectiveShape`]: attribute slots are
//! matched by qualified name, element slots in shape order. Single slots bind
//! the first matching child, repeated slots always yield a list.

use super::values::{check_facets, parse_scalar, Record, ScalarValue, Value};
use super::DecoderConfig;
use crate::documents::{Document, Element};
use crate::error::{DecodeError, Error, Result};
use crate::namespaces::QName;
use crate::shapes::{EffectiveShape, ElementSlot, ScalarType, ShapeArena, ShapeId, SlotContent};
use crate::schema::WhiteSpace;

/// Decodes XML text into records
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    shapes: &'a ShapeArena,
    config: DecoderConfig,
}

impl<'a> Decoder<'a> {
    /// Create a decoder with default configuration
    pub fn new(shapes: &'a ShapeArena) -> Self {
        Self::with_config(shapes, DecoderConfig::default())
    }

    /// Create a decoder with the given configuration
    pub fn with_config(shapes: &'a ShapeArena, config: DecoderConfig) -> Self {
        Self { shapes, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a document whose root element has the given shape.
    ///
    /// The root tag itself is not checked.
    pub fn decode(&self, shape: ShapeId, xml: &str) -> Result<Record> {
        let root = self.parse(xml)?;
        self.decode_tree(shape, &root)
    }

    /// Decode a document rooted at a global element
    pub fn decode_element(&self, slot: &ElementSlot, xml: &str) -> Result<Value> {
        let root = self.parse(xml)?;
        if root.qname != slot.name {
            return Err(DecodeError::UnexpectedValue {
                name: root.qname.clone(),
                reason: format!("expected root element {}", slot.name),
                document: slot.origin.clone(),
            }
            .into());
        }
        self.child_value(slot, &root, true)?
            .ok_or_else(|| {
                DecodeError::MissingRequiredElement {
                    name: slot.name.clone(),
                    document: slot.origin.clone(),
                }
                .into()
            })
    }

    /// Decode an already parsed element
    pub fn decode_tree(&self, shape: ShapeId, element: &Element) -> Result<Record> {
        let shape = self.shape(shape)?;
        let mut record = Record::new();

        for slot in &shape.attributes {
            match element.attributes.iter().find(|a| a.qname == slot.name) {
                Some(attr) => {
                    if let Some(value) = self.scalar(&slot.name, &slot.scalar, &attr.value, slot.required, &slot.origin)? {
                        record.insert(slot.key.clone(), Value::Scalar(value));
                    }
                }
                None if slot.required => {
                    return Err(DecodeError::MissingRequiredAttribute {
                        name: slot.name.clone(),
                        document: slot.origin.clone(),
                    }
                    .into())
                }
                None => {}
            }
        }

        self.decode_text(shape, element, &mut record)?;

        let mut claimed = vec![false; element.children.len()];
        for slot in &shape.elements {
            let mut matches = Vec::new();
            for (i, child) in element.children.iter().enumerate() {
                if child.qname == slot.name {
                    claimed[i] = true;
                    matches.push(child);
                }
            }

            if slot.is_repeated() {
                if matches.is_empty() && slot.is_required() {
                    return Err(missing_element(slot));
                }
                let mut items = Vec::with_capacity(matches.len());
                for child in matches {
                    if let Some(value) = self.child_value(slot, child, slot.is_required())? {
                        items.push(value);
                    }
                }
                record.insert(slot.key.clone(), Value::List(items));
                continue;
            }

            match matches.first() {
                Some(child) => {
                    if matches.len() > 1 {
                        tracing::warn!(
                            element = %slot.name,
                            count = matches.len(),
                            "single-occurrence slot matched several children, keeping the first"
                        );
                    }
                    if let Some(value) = self.child_value(slot, child, slot.is_required())? {
                        record.insert(slot.key.clone(), value);
                    }
                }
                None if slot.is_required() => return Err(missing_element(slot)),
                None => {}
            }
        }

        let unknown: Vec<&Element> = element
            .children
            .iter()
            .zip(&claimed)
            .filter(|(_, claimed)| !**claimed)
            .map(|(child, _)| child)
            .collect();
        if !unknown.is_empty() {
            if shape.preserve_unknown {
                let mut fragments = Vec::with_capacity(unknown.len());
                for child in unknown {
                    fragments.push(Value::Scalar(ScalarValue::String(child.to_fragment()?)));
                }
                record.insert(self.config.unknown_key().to_string(), Value::List(fragments));
            } else {
                tracing::debug!(
                    element = %element.qname,
                    skipped = unknown.len(),
                    "ignoring children without a slot"
                );
            }
        }

        Ok(record)
    }

    fn parse(&self, xml: &str) -> Result<Element> {
        Document::parse_with_limits(xml, self.config.limits())?
            .root
            .ok_or_else(|| Error::Xml("Document has no root element".to_string()))
    }

    fn shape(&self, id: ShapeId) -> Result<&'a EffectiveShape> {
        self.shapes
            .get(id)
            .ok_or_else(|| Error::Resource(format!("unknown shape {}", id)))
    }

    fn decode_text(&self, shape: &EffectiveShape, element: &Element, record: &mut Record) -> Result<()> {
        let raw = element.text.as_deref().unwrap_or("");
        if let Some(text_type) = &shape.text {
            // `<a/>` has no text, `<a></a>` has an empty one
            let Some(raw) = element.text.as_deref() else {
                return Ok(());
            };
            let owner = shape.name.clone().unwrap_or_else(|| element.qname.clone());
            if let Some(value) = self.scalar(&owner, text_type, raw, !raw.trim().is_empty(), &shape.origin)? {
                record.insert(self.config.text_key().to_string(), Value::Scalar(value));
            }
        } else if shape.mixed && !raw.is_empty() {
            record.insert(
                self.config.text_key().to_string(),
                Value::Scalar(ScalarValue::String(raw.to_string())),
            );
        }
        Ok(())
    }

    fn child_value(&self, slot: &ElementSlot, child: &Element, required: bool) -> Result<Option<Value>> {
        if slot.nillable && is_nil(child) {
            return Ok(Some(Value::Null));
        }
        match &slot.content {
            SlotContent::Scalar(scalar) => {
                let text = child.text.as_deref().unwrap_or("");
                Ok(self
                    .scalar(&slot.name, scalar, text, required, &slot.origin)?
                    .map(Value::Scalar))
            }
            SlotContent::Complex(id) => Ok(Some(Value::Record(self.decode_tree(*id, child)?))),
        }
    }

    /// Convert text of a slot; invalid text of an optional slot is dropped
    fn scalar(
        &self,
        name: &QName,
        scalar: &ScalarType,
        raw: &str,
        required: bool,
        document: &str,
    ) -> Result<Option<ScalarValue>> {
        let text = scalar.facets.white_space.unwrap_or(WhiteSpace::Preserve).normalize(raw);
        let converted = parse_scalar(&scalar.kind, &text)
            .and_then(|value| check_facets(&scalar.facets, &text, &value).map(|_| value));
        match converted {
            Ok(value) => Ok(Some(value)),
            Err(reason) if required => Err(DecodeError::InvalidScalarValue {
                name: name.clone(),
                kind: scalar.kind.label(),
                value: text,
                reason,
                document: document.to_string(),
            }
            .into()),
            Err(reason) => {
                tracing::warn!(
                    slot = %name,
                    value = %text,
                    reason = %reason,
                    "dropping invalid value of an optional slot"
                );
                Ok(None)
            }
        }
    }
}

fn missing_element(slot: &ElementSlot) -> Error {
    DecodeError::MissingRequiredElement {
        name: slot.name.clone(),
        document: slot.origin.clone(),
    }
    .into()
}

fn is_nil(element: &Element) -> bool {
    let nil = QName::namespaced(crate::XSI_NAMESPACE, "nil");
    matches!(element.get_attribute_qname(&nil).map(str::trim), Some("true" | "1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::SchemaLoader;
    use crate::shapes::ShapeResolver;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:t="urn:t"
                   targetNamespace="urn:t" elementFormDefault="qualified">
            <xs:complexType name="Item">
                <xs:sequence>
                    <xs:element name="sku" type="xs:string"/>
                    <xs:element name="qty" type="xs:int" minOccurs="0"/>
                    <xs:element name="note" type="xs:string" nillable="true" minOccurs="0"/>
                </xs:sequence>
                <xs:attribute name="line" type="xs:positiveInteger" use="required"/>
            </xs:complexType>
            <xs:complexType name="Price">
                <xs:simpleContent>
                    <xs:extension base="xs:decimal">
                        <xs:attribute name="currency" type="xs:string"/>
                    </xs:extension>
                </xs:simpleContent>
            </xs:complexType>
            <xs:complexType name="Order">
                <xs:sequence>
                    <xs:element name="item" type="t:Item" maxOccurs="unbounded"/>
                    <xs:element name="total" type="t:Price" minOccurs="0"/>
                    <xs:any processContents="lax" minOccurs="0" maxOccurs="unbounded"/>
                </xs:sequence>
            </xs:complexType>
            <xs:element name="order" type="t:Order"/>
        </xs:schema>"#;

    fn resolve(name: &str) -> (ShapeArena, ShapeId) {
        let mut loader = SchemaLoader::new();
        loader.add_source("t.xsd", SCHEMA).unwrap();
        let registry = loader.load("t.xsd").unwrap();
        let mut resolver = ShapeResolver::new(&registry);
        let id = resolver.resolve(&QName::namespaced("urn:t", name)).unwrap();
        (resolver.into_shapes(), id)
    }

    #[test]
    fn test_decode_nested_and_repeated() {
        let (shapes, order) = resolve("Order");
        let xml = r#"<t:order xmlns:t="urn:t">
            <t:item line="1"><t:sku>A</t:sku><t:qty>2</t:qty></t:item>
            <t:item line="2"><t:sku>B</t:sku><t:note xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true"/></t:item>
            <t:total currency="EUR">12.50</t:total>
        </t:order>"#;
        let record = Decoder::new(&shapes).decode(order, xml).unwrap();

        let items = record["item"].as_list().unwrap();
        assert_eq!(items.len(), 2);
        let first = items[0].as_record().unwrap();
        assert_eq!(first["line"], Value::from(1i64));
        assert_eq!(first["sku"], Value::from("A"));
        assert_eq!(first["qty"], Value::from(2i64));
        let second = items[1].as_record().unwrap();
        assert_eq!(second.get("qty"), None);
        assert_eq!(second["note"], Value::Null);

        let total = record["total"].as_record().unwrap();
        assert_eq!(total["$"], Value::Scalar(ScalarValue::Decimal("12.50".parse().unwrap())));
        assert_eq!(total["currency"], Value::from("EUR"));
        assert!(record.get("$any").is_none());
    }

    #[test]
    fn test_repeated_slot_is_always_a_list() {
        let (shapes, order) = resolve("Order");
        let xml = r#"<t:order xmlns:t="urn:t"><t:item line="1"><t:sku>A</t:sku></t:item></t:order>"#;
        let record = Decoder::new(&shapes).decode(order, xml).unwrap();
        assert_eq!(record["item"].as_list().map(|l| l.len()), Some(1));
    }

    #[test]
    fn test_missing_required_parts() {
        let (shapes, order) = resolve("Order");
        let decoder = Decoder::new(&shapes);

        let err = decoder
            .decode(order, r#"<t:order xmlns:t="urn:t"><t:item><t:sku>A</t:sku></t:item></t:order>"#)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::MissingRequiredAttribute { ref name, .. }) if name.local_name == "line"
        ));

        let err = decoder.decode(order, r#"<t:order xmlns:t="urn:t"/>"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::MissingRequiredElement { ref name, ref document })
                if name == &QName::namespaced("urn:t", "item") && document == "t.xsd"
        ));
    }

    #[test]
    fn test_invalid_scalars() {
        let (shapes, item) = resolve("Item");
        let decoder = Decoder::new(&shapes);

        // optional slot: dropped
        let record = decoder
            .decode(item, r#"<t:item xmlns:t="urn:t" line="3"><t:sku>A</t:sku><t:qty>many</t:qty></t:item>"#)
            .unwrap();
        assert_eq!(record.get("qty"), None);

        // required attribute: fatal
        let err = decoder
            .decode(item, r#"<t:item xmlns:t="urn:t" line="zero"><t:sku>A</t:sku></t:item>"#)
            .unwrap_err();
        match err {
            Error::Decode(DecodeError::InvalidScalarValue { name, value, .. }) => {
                assert_eq!(name, QName::local("line"));
                assert_eq!(value, "zero");
            }
            other => panic!("expected invalid scalar, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_children_are_preserved_verbatim() {
        let (shapes, order) = resolve("Order");
        let xml = r#"<t:order xmlns:t="urn:t" xmlns:x="urn:x"><t:item line="1"><t:sku>A</t:sku></t:item><x:extra a="1">hi</x:extra></t:order>"#;
        let record = Decoder::new(&shapes).decode(order, xml).unwrap();
        assert_eq!(
            record["$any"],
            Value::List(vec![Value::from(r#"<x:extra xmlns:x="urn:x" a="1">hi</x:extra>"#)])
        );
    }

    #[test]
    fn test_decode_element_checks_root() {
        let mut loader = SchemaLoader::new();
        loader.add_source("t.xsd", SCHEMA).unwrap();
        let registry = loader.load("t.xsd").unwrap();
        let mut resolver = ShapeResolver::new(&registry);
        let root = resolver.resolve_element(&QName::namespaced("urn:t", "order")).unwrap();
        let shapes = resolver.into_shapes();
        let decoder = Decoder::with_config(&shapes, DecoderConfig::new().with_unknown_key("#other"));

        let value = decoder
            .decode_element(&root, r#"<order xmlns="urn:t"><item line="1"><sku>A</sku></item><foo/></order>"#)
            .unwrap();
        let record = value.as_record().unwrap();
        assert!(record.contains_key("#other"));

        assert!(matches!(
            decoder.decode_element(&root, r#"<item xmlns="urn:t"/>"#),
            Err(Error::Decode(DecodeError::UnexpectedValue { .. }))
        ));
    }
}

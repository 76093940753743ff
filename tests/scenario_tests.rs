//! End-to-end scenarios
//!
//! Each test loads inline schema documents, resolves a shape and drives the
//! codec through the public API only.

mod common;

use pretty_assertions::assert_eq;
use xmlschema_codec::shapes::SlotContent;
use xmlschema_codec::{Decoder, Encoder, QName, Record, Value};

// =============================================================================
// Attributes with an optional member
// =============================================================================

const PERSON_XSD: &str = r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="person">
        <xs:complexType>
            <xs:attribute name="name" type="xs:string" use="required"/>
            <xs:attribute name="age" type="xs:integer"/>
        </xs:complexType>
    </xs:element>
</xs:schema>"#;

#[test]
fn test_person_with_age() {
    let registry = common::load(&[("person.xsd", PERSON_XSD)]);
    let (shapes, slot) = common::resolve_element(&registry, &QName::local("person"));

    let value = Decoder::new(&shapes)
        .decode_element(&slot, r#"<person name="Bob" age="25"/>"#)
        .unwrap();

    let mut expected = Record::new();
    expected.insert("name".to_string(), Value::from("Bob"));
    expected.insert("age".to_string(), Value::from(25i64));
    assert_eq!(value, Value::Record(expected));
}

#[test]
fn test_person_without_age() {
    let registry = common::load(&[("person.xsd", PERSON_XSD)]);
    let (shapes, slot) = common::resolve_element(&registry, &QName::local("person"));

    let value = Decoder::new(&shapes)
        .decode_element(&slot, r#"<person name="Bob"/>"#)
        .unwrap();
    let record = value.as_record().unwrap();
    assert_eq!(record.len(), 1);
    assert!(!record.contains_key("age"));

    let xml = Encoder::new(&shapes).encode_element(&slot, &value).unwrap();
    assert_eq!(xml, r#"<person name="Bob"/>"#);
}

// =============================================================================
// Inherited element reference into a namespace the leaf never imports
// =============================================================================

const ATOM_XSD: &str = r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="http://www.w3.org/2005/Atom" elementFormDefault="qualified">
    <xs:element name="link">
        <xs:complexType>
            <xs:attribute name="href" type="xs:string" use="required"/>
            <xs:attribute name="rel" type="xs:string"/>
        </xs:complexType>
    </xs:element>
</xs:schema>"#;

const ADTCORE_XSD: &str = r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:adtcore="http://www.sap.com/adt/core"
           xmlns:atom="http://www.w3.org/2005/Atom"
           targetNamespace="http://www.sap.com/adt/core" elementFormDefault="qualified">
    <xs:import namespace="http://www.w3.org/2005/Atom" schemaLocation="atom.xsd"/>
    <xs:complexType name="AdtObject">
        <xs:sequence>
            <xs:element ref="atom:link" minOccurs="0" maxOccurs="unbounded"/>
        </xs:sequence>
        <xs:attribute name="name" type="xs:string" use="required"/>
    </xs:complexType>
    <xs:complexType name="AdtMainObject">
        <xs:complexContent>
            <xs:extension base="adtcore:AdtObject">
                <xs:attribute name="responsible" type="xs:string"/>
            </xs:extension>
        </xs:complexContent>
    </xs:complexType>
</xs:schema>"#;

const ABAPSOURCE_XSD: &str = r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:adtcore="http://www.sap.com/adt/core"
           targetNamespace="http://www.sap.com/adt/abapsource" elementFormDefault="qualified">
    <xs:import namespace="http://www.sap.com/adt/core" schemaLocation="adtcore.xsd"/>
    <xs:complexType name="AbapSourceMainObject">
        <xs:complexContent>
            <xs:extension base="adtcore:AdtMainObject">
                <xs:attribute name="sourceUri" type="xs:string"/>
            </xs:extension>
        </xs:complexContent>
    </xs:complexType>
</xs:schema>"#;

const INTERFACES_XSD: &str = r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:abapsource="http://www.sap.com/adt/abapsource"
           xmlns:intf="http://www.sap.com/adt/oo/interfaces"
           targetNamespace="http://www.sap.com/adt/oo/interfaces" elementFormDefault="qualified">
    <xs:import namespace="http://www.sap.com/adt/abapsource" schemaLocation="abapsource.xsd"/>
    <xs:complexType name="Interface">
        <xs:complexContent>
            <xs:extension base="abapsource:AbapSourceMainObject">
                <xs:attribute name="modeled" type="xs:boolean"/>
            </xs:extension>
        </xs:complexContent>
    </xs:complexType>
    <xs:element name="abapInterface" type="intf:Interface"/>
</xs:schema>"#;

const INTERFACES_NS: &str = "http://www.sap.com/adt/oo/interfaces";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

fn interface_sources() -> [(&'static str, &'static str); 4] {
    [
        ("interfaces.xsd", INTERFACES_XSD),
        ("abapsource.xsd", ABAPSOURCE_XSD),
        ("adtcore.xsd", ADTCORE_XSD),
        ("atom.xsd", ATOM_XSD),
    ]
}

fn link(href: &str, rel: &str) -> Value {
    let mut record = Record::new();
    record.insert("href".to_string(), Value::from(href));
    record.insert("rel".to_string(), Value::from(rel));
    Value::Record(record)
}

#[test]
fn test_interface_shape_carries_inherited_link() {
    let registry = common::load(&interface_sources());
    let (shapes, id) = common::resolve_type(&registry, &QName::namespaced(INTERFACES_NS, "Interface"));
    let shape = shapes.get(id).unwrap();

    let attributes: Vec<&str> = shape.attributes.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(attributes, vec!["name", "responsible", "sourceUri", "modeled"]);

    let link = shape.element("link").unwrap();
    assert_eq!(link.name, QName::namespaced(ATOM_NS, "link"));
    assert!(link.is_repeated());
    assert!(!link.is_required());
    assert!(matches!(link.content, SlotContent::Complex(_)));
}

#[test]
fn test_interface_decodes_two_links() {
    let registry = common::load(&interface_sources());
    let (shapes, slot) = common::resolve_element(&registry, &QName::namespaced(INTERFACES_NS, "abapInterface"));

    let xml = r#"
        <intf:abapInterface xmlns:intf="http://www.sap.com/adt/oo/interfaces"
                            xmlns:atom="http://www.w3.org/2005/Atom"
                            name="ZIF_DEMO" responsible="DEVELOPER" sourceUri="source/main" modeled="false">
            <atom:link href="source/main" rel="source"/>
            <atom:link href="versions" rel="versions"/>
        </intf:abapInterface>"#;
    let value = Decoder::new(&shapes).decode_element(&slot, xml).unwrap();
    let record = value.as_record().unwrap();

    assert_eq!(record.get("name"), Some(&Value::from("ZIF_DEMO")));
    assert_eq!(record.get("modeled"), Some(&Value::from(false)));
    assert_eq!(
        record.get("link"),
        Some(&Value::List(vec![link("source/main", "source"), link("versions", "versions")]))
    );
}

#[test]
fn test_interface_without_links_has_empty_list() {
    let registry = common::load(&interface_sources());
    let (shapes, slot) = common::resolve_element(&registry, &QName::namespaced(INTERFACES_NS, "abapInterface"));

    let xml = r#"<i:abapInterface xmlns:i="http://www.sap.com/adt/oo/interfaces" name="ZIF_EMPTY"/>"#;
    let value = Decoder::new(&shapes).decode_element(&slot, xml).unwrap();
    assert_eq!(value.as_record().unwrap().get("link"), Some(&Value::List(Vec::new())));
}

#[test]
fn test_interface_encodes_with_schema_prefixes() {
    let registry = common::load(&interface_sources());
    let (shapes, slot) = common::resolve_element(&registry, &QName::namespaced(INTERFACES_NS, "abapInterface"));

    let mut record = Record::new();
    record.insert("name".to_string(), Value::from("ZIF_DEMO"));
    record.insert("link".to_string(), Value::List(vec![link("source/main", "source")]));
    let value = Value::Record(record);

    let xml = Encoder::new(&shapes).encode_element(&slot, &value).unwrap();
    assert!(xml.starts_with("<intf:abapInterface "), "{}", xml);
    assert!(xml.contains(r#"xmlns:intf="http://www.sap.com/adt/oo/interfaces""#), "{}", xml);
    assert!(xml.contains(r#"xmlns:atom="http://www.w3.org/2005/Atom""#), "{}", xml);
    assert!(xml.contains(r#"<atom:link href="source/main" rel="source"/>"#), "{}", xml);

    let decoded = Decoder::new(&shapes).decode_element(&slot, &xml).unwrap();
    assert_eq!(decoded, value);
}

// =============================================================================
// Repeated children keep their order
// =============================================================================

const ORDER_XSD: &str = r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:complexType name="Order">
        <xs:sequence>
            <xs:element name="orderId" type="xs:string"/>
            <xs:element name="item" maxOccurs="unbounded">
                <xs:complexType>
                    <xs:sequence><xs:element name="sku" type="xs:string"/></xs:sequence>
                </xs:complexType>
            </xs:element>
        </xs:sequence>
    </xs:complexType>
    <xs:element name="order" type="Order"/>
</xs:schema>"#;

fn item(sku: &str) -> Value {
    let mut record = Record::new();
    record.insert("sku".to_string(), Value::from(sku));
    Value::Record(record)
}

#[test]
fn test_order_items_round_trip_in_order() {
    let registry = common::load(&[("order.xsd", ORDER_XSD)]);
    let (shapes, slot) = common::resolve_element(&registry, &QName::local("order"));

    let mut record = Record::new();
    record.insert("orderId".to_string(), Value::from("O1"));
    record.insert("item".to_string(), Value::List(vec![item("A"), item("B")]));
    let value = Value::Record(record);

    let xml = Encoder::new(&shapes).encode_element(&slot, &value).unwrap();
    assert_eq!(
        xml,
        "<order><orderId>O1</orderId><item><sku>A</sku></item><item><sku>B</sku></item></order>"
    );

    let decoded = Decoder::new(&shapes).decode_element(&slot, &xml).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_order_single_item_is_still_a_list() {
    let registry = common::load(&[("order.xsd", ORDER_XSD)]);
    let (shapes, id) = common::resolve_type(&registry, &QName::local("Order"));

    let record = Decoder::new(&shapes)
        .decode(id, "<order><orderId>O2</orderId><item><sku>X</sku></item></order>")
        .unwrap();
    assert_eq!(record.get("item"), Some(&Value::List(vec![item("X")])));
}

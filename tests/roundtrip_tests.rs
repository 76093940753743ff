//! Property tests: decoding an encoded record yields the record back

mod common;

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use xmlschema_codec::{
    Decoder, EncodeError, Encoder, Error, JsonBridge, QName, Record, ScalarValue, ShapeArena, ShapeId, Value,
};

const LEDGER_XSD: &str = r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:l="urn:ledger"
           targetNamespace="urn:ledger" elementFormDefault="qualified">
    <xs:simpleType name="Numbers"><xs:list itemType="xs:long"/></xs:simpleType>
    <xs:complexType name="Entry">
        <xs:sequence>
            <xs:element name="label" type="xs:string"/>
            <xs:element name="weight" type="xs:double" minOccurs="0"/>
        </xs:sequence>
        <xs:attribute name="id" type="xs:long" use="required"/>
    </xs:complexType>
    <xs:complexType name="Base">
        <xs:sequence>
            <xs:element name="title" type="xs:string"/>
            <xs:element name="entry" type="l:Entry" minOccurs="0" maxOccurs="unbounded"/>
        </xs:sequence>
        <xs:attribute name="flag" type="xs:boolean"/>
    </xs:complexType>
    <xs:complexType name="Ledger">
        <xs:complexContent>
            <xs:extension base="l:Base">
                <xs:sequence>
                    <xs:element name="amount" type="xs:decimal" minOccurs="0"/>
                    <xs:element name="day" type="xs:date" minOccurs="0"/>
                    <xs:element name="stamp" type="xs:dateTime" minOccurs="0"/>
                    <xs:element name="blob" type="xs:hexBinary" minOccurs="0"/>
                    <xs:element name="remark" type="xs:string" minOccurs="0" nillable="true"/>
                </xs:sequence>
                <xs:attribute name="numbers" type="l:Numbers"/>
            </xs:extension>
        </xs:complexContent>
    </xs:complexType>
</xs:schema>"#;

const SAMPLE_XSD: &str = r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:s="urn:sample"
           targetNamespace="urn:sample" elementFormDefault="qualified">
    <xs:simpleType name="IntOrWord"><xs:union memberTypes="xs:int xs:string"/></xs:simpleType>
    <xs:complexType name="Label">
        <xs:simpleContent>
            <xs:extension base="xs:string">
                <xs:attribute name="lang" type="xs:string" form="qualified"/>
            </xs:extension>
        </xs:simpleContent>
    </xs:complexType>
    <xs:complexType name="Para" mixed="true">
        <xs:sequence>
            <xs:element name="em" type="xs:string" minOccurs="0"/>
        </xs:sequence>
    </xs:complexType>
    <xs:complexType name="Extras">
        <xs:sequence>
            <xs:element name="kind" type="xs:string"/>
            <xs:any processContents="lax" minOccurs="0" maxOccurs="unbounded"/>
        </xs:sequence>
    </xs:complexType>
    <xs:complexType name="Sample">
        <xs:sequence>
            <xs:element name="label" type="s:Label" minOccurs="0"/>
            <xs:element name="para" type="s:Para" minOccurs="0"/>
            <xs:element name="extras" type="s:Extras" minOccurs="0"/>
            <xs:element name="at" type="xs:time" minOccurs="0"/>
            <xs:element name="payload" type="xs:base64Binary" minOccurs="0"/>
            <xs:element name="count" type="xs:unsignedLong" minOccurs="0"/>
        </xs:sequence>
        <xs:attribute name="code" type="s:IntOrWord"/>
    </xs:complexType>
</xs:schema>"#;

fn ledger() -> (ShapeArena, ShapeId) {
    let registry = common::load(&[("ledger.xsd", LEDGER_XSD)]);
    common::resolve_type(&registry, &QName::namespaced("urn:ledger", "Ledger"))
}

fn sample() -> (ShapeArena, ShapeId) {
    let registry = common::load(&[("sample.xsd", SAMPLE_XSD)]);
    common::resolve_type(&registry, &QName::namespaced("urn:sample", "Sample"))
}

fn sample_tag() -> QName {
    QName::namespaced("urn:sample", "sample")
}

// =============================================================================
// Strategies
// =============================================================================

fn text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 <>&\"'.-]{0,16}"
}

fn double() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<f64>(),
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn offset() -> impl Strategy<Value = Option<FixedOffset>> {
    proptest::option::of((-48i32..=48).prop_map(|quarters| FixedOffset::east_opt(quarters * 900).unwrap()))
}

fn entry() -> impl Strategy<Value = Value> {
    (any::<i64>(), text(), proptest::option::of(double())).prop_map(|(id, label, weight)| {
        let mut record = Record::new();
        record.insert("id".to_string(), Value::from(id));
        record.insert("label".to_string(), Value::from(label.as_str()));
        if let Some(weight) = weight {
            record.insert("weight".to_string(), Value::from(ScalarValue::Double(weight)));
        }
        Value::Record(record)
    })
}

fn decimal() -> impl Strategy<Value = Decimal> {
    (any::<i64>(), 0u32..=10).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn stamp() -> impl Strategy<Value = ScalarValue> {
    (-2_000_000_000_000i64..4_000_000_000_000, -48i32..=48).prop_map(|(millis, quarters)| {
        let offset = FixedOffset::east_opt(quarters * 900).unwrap();
        ScalarValue::DateTime(offset.timestamp_millis_opt(millis).unwrap())
    })
}

prop_compose! {
    fn ledger_record()(
        title in text(),
        entries in proptest::collection::vec(entry(), 0..4),
        flag in proptest::option::of(any::<bool>()),
        amount in proptest::option::of(decimal()),
        day in proptest::option::of(date()),
        stamp in proptest::option::of(stamp()),
        blob in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..8)),
        remark in proptest::option::of(proptest::option::of(text())),
        numbers in proptest::option::of(proptest::collection::vec(any::<i64>(), 0..5)),
    ) -> Record {
        let mut record = Record::new();
        record.insert("title".to_string(), Value::from(title.as_str()));
        record.insert("entry".to_string(), Value::List(entries));
        if let Some(flag) = flag {
            record.insert("flag".to_string(), Value::from(flag));
        }
        if let Some(amount) = amount {
            record.insert("amount".to_string(), Value::from(ScalarValue::Decimal(amount)));
        }
        if let Some(day) = day {
            record.insert("day".to_string(), Value::from(ScalarValue::Date(day, None)));
        }
        if let Some(stamp) = stamp {
            record.insert("stamp".to_string(), Value::from(stamp));
        }
        if let Some(blob) = blob {
            record.insert("blob".to_string(), Value::from(ScalarValue::Binary(blob)));
        }
        match remark {
            Some(Some(remark)) => {
                record.insert("remark".to_string(), Value::from(remark.as_str()));
            }
            Some(None) => {
                record.insert("remark".to_string(), Value::Null);
            }
            None => {}
        }
        if let Some(numbers) = numbers {
            let items = numbers.into_iter().map(ScalarValue::Integer).collect();
            record.insert("numbers".to_string(), Value::from(ScalarValue::List(items)));
        }
        record
    }
}

fn label() -> impl Strategy<Value = Value> {
    (proptest::option::of(text()), proptest::option::of(word())).prop_map(|(body, lang)| {
        let mut record = Record::new();
        if let Some(body) = body {
            record.insert("$".to_string(), Value::from(body.as_str()));
        }
        if let Some(lang) = lang {
            record.insert("lang".to_string(), Value::from(lang.as_str()));
        }
        Value::Record(record)
    })
}

fn para() -> impl Strategy<Value = Value> {
    (proptest::option::of(word()), proptest::option::of(text())).prop_map(|(lead, em)| {
        let mut record = Record::new();
        if let Some(lead) = lead {
            record.insert("$".to_string(), Value::from(lead.as_str()));
        }
        if let Some(em) = em {
            record.insert("em".to_string(), Value::from(em.as_str()));
        }
        Value::Record(record)
    })
}

fn fragment() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z]{0,8}".prop_map(|w| format!("<extra>{}</extra>", w)),
        Just("<flag/>".to_string()),
        word().prop_map(|w| format!(r#"<note tone="{}"><inner>{}</inner></note>"#, w, w)),
    ]
    .prop_map(|xml| Value::from(xml.as_str()))
}

fn extras() -> impl Strategy<Value = Value> {
    (word(), proptest::collection::vec(fragment(), 0..3)).prop_map(|(kind, fragments)| {
        let mut record = Record::new();
        record.insert("kind".to_string(), Value::from(kind.as_str()));
        if !fragments.is_empty() {
            record.insert("$any".to_string(), Value::List(fragments));
        }
        Value::Record(record)
    })
}

fn time() -> impl Strategy<Value = ScalarValue> {
    (0u32..86_400_000, offset()).prop_map(|(millis, offset)| {
        let time = NaiveTime::from_num_seconds_from_midnight_opt(millis / 1000, millis % 1000 * 1_000_000).unwrap();
        ScalarValue::Time(time, offset)
    })
}

fn count() -> impl Strategy<Value = ScalarValue> {
    any::<u64>().prop_map(|n| match i64::try_from(n) {
        Ok(small) => ScalarValue::Integer(small),
        Err(_) => ScalarValue::Decimal(Decimal::from(n)),
    })
}

fn code() -> impl Strategy<Value = ScalarValue> {
    prop_oneof![
        any::<i32>().prop_map(|n| ScalarValue::Integer(n.into())),
        word().prop_map(ScalarValue::String),
    ]
}

prop_compose! {
    fn sample_record()(
        label in proptest::option::of(label()),
        para in proptest::option::of(para()),
        extras in proptest::option::of(extras()),
        at in proptest::option::of(time()),
        payload in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..12)),
        count in proptest::option::of(count()),
        code in proptest::option::of(code()),
    ) -> Record {
        let mut record = Record::new();
        let slots = [
            ("label", label),
            ("para", para),
            ("extras", extras),
            ("at", at.map(Value::from)),
            ("payload", payload.map(|bytes| Value::from(ScalarValue::Binary(bytes)))),
            ("count", count.map(Value::from)),
            ("code", code.map(Value::from)),
        ];
        for (key, value) in slots {
            if let Some(value) = value {
                record.insert(key.to_string(), value);
            }
        }
        record
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_decode_inverts_encode(record in ledger_record()) {
        let (shapes, id) = ledger();
        let tag = QName::namespaced("urn:ledger", "ledger");

        let xml = Encoder::new(&shapes).encode(&tag, id, &record).unwrap();
        let decoded = Decoder::new(&shapes).decode(id, &xml).unwrap();
        prop_assert_eq!(decoded, record);
    }

    #[test]
    fn prop_json_bridge_inverts(record in ledger_record()) {
        let (shapes, id) = ledger();
        let bridge = JsonBridge::new(&shapes);

        let json = bridge.record_to_json(id, &record).unwrap();
        let back = bridge.record_from_json(id, &json).unwrap();
        prop_assert_eq!(back, record);
    }

    #[test]
    fn prop_mixed_content_and_wildcards_survive_encoding(record in sample_record()) {
        let (shapes, id) = sample();

        let xml = Encoder::new(&shapes).encode(&sample_tag(), id, &record).unwrap();
        let decoded = Decoder::new(&shapes).decode(id, &xml).unwrap();
        prop_assert_eq!(decoded, record);
    }

    #[test]
    fn prop_mixed_content_and_wildcards_survive_json(record in sample_record()) {
        let (shapes, id) = sample();
        let bridge = JsonBridge::new(&shapes);

        let json = bridge.record_to_json(id, &record).unwrap();
        let back = bridge.record_from_json(id, &json).unwrap();
        prop_assert_eq!(back, record);
    }
}

#[test]
fn test_empty_text_is_kept_apart_from_missing_text() {
    let (shapes, id) = sample();
    let decoder = Decoder::new(&shapes);
    let encoder = Encoder::new(&shapes);

    let bare = decoder
        .decode(id, r#"<s:sample xmlns:s="urn:sample"><s:label s:lang="en"/></s:sample>"#)
        .unwrap();
    let label = bare["label"].as_record().unwrap();
    assert!(label.get("$").is_none(), "{:?}", label);

    let empty = decoder
        .decode(id, r#"<s:sample xmlns:s="urn:sample"><s:label s:lang="en"></s:label></s:sample>"#)
        .unwrap();
    assert_eq!(empty["label"].as_record().unwrap()["$"], Value::from(""));

    for record in [bare, empty] {
        let xml = encoder.encode(&sample_tag(), id, &record).unwrap();
        assert_eq!(decoder.decode(id, &xml).unwrap(), record, "{}", xml);
    }
}

#[test]
fn test_union_value_must_decode_as_itself() {
    let (shapes, id) = sample();
    let encoder = Encoder::new(&shapes);

    let mut record = Record::new();
    record.insert("code".to_string(), Value::from(ScalarValue::String("7".to_string())));
    let result = encoder.encode(&sample_tag(), id, &record);
    assert!(
        matches!(result, Err(Error::Encode(EncodeError::UnexpectedValue { .. }))),
        "{:?}",
        result
    );

    for code in [ScalarValue::Integer(7), ScalarValue::String("seven".to_string())] {
        let mut record = Record::new();
        record.insert("code".to_string(), Value::from(code));
        let xml = encoder.encode(&sample_tag(), id, &record).unwrap();
        assert_eq!(Decoder::new(&shapes).decode(id, &xml).unwrap(), record);
    }
}

#[test]
fn test_unsigned_long_beyond_i64() {
    let (shapes, id) = sample();
    let xml = r#"<s:sample xmlns:s="urn:sample"><s:count>18446744073709551615</s:count></s:sample>"#;
    let record = Decoder::new(&shapes).decode(id, xml).unwrap();
    assert_eq!(
        record["count"],
        Value::from(ScalarValue::Decimal(Decimal::from(u64::MAX)))
    );

    let encoded = Encoder::new(&shapes).encode(&sample_tag(), id, &record).unwrap();
    assert!(encoded.contains("<s:count>18446744073709551615</s:count>"), "{}", encoded);
}

#[test]
fn test_indented_output_decodes_identically() {
    let (shapes, id) = ledger();
    let mut entry = Record::new();
    entry.insert("id".to_string(), Value::from(1i64));
    entry.insert("label".to_string(), Value::from("first"));

    let mut record = Record::new();
    record.insert("title".to_string(), Value::from("Q1"));
    record.insert("entry".to_string(), Value::List(vec![Value::Record(entry)]));
    record.insert("remark".to_string(), Value::Null);

    let config = xmlschema_codec::EncoderConfig::new()
        .with_encoding(Some("UTF-8".to_string()))
        .with_indent(2);
    let xml = Encoder::with_config(&shapes, config)
        .encode(&QName::namespaced("urn:ledger", "ledger"), id, &record)
        .unwrap();
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#), "{}", xml);
    assert!(xml.contains(r#"<l:remark xsi:nil="true"/>"#), "{}", xml);

    let decoded = Decoder::new(&shapes).decode(id, &xml).unwrap();
    assert_eq!(decoded, record);
}

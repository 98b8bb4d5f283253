//! Codecs reading and writing JSON documents.

#![allow(clippy::expect_used, clippy::float_cmp)]

use dynops_codec::{BOOL, BYTE, Codec, FLOAT, INT, INT_STREAM, MapCodec, STRING, group};
use dynops_core::DynamicOps;
use dynops_json::JsonOps;
use dynops_testhelpers::{IPanic, test};
use dynops_value::ValueOps;
use indoc::indoc;
use insta::assert_snapshot;
use proptest::prelude::*;
use serde_json::{Value, json};
use static_assertions::assert_impl_all;

assert_impl_all!(JsonOps: Send, Sync, Copy);

#[derive(Debug, PartialEq)]
struct Reading {
    sensor: String,
    level: i8,
    ratio: f32,
    samples: Vec<i32>,
}

fn reading_codec() -> impl Codec<Reading> {
    group((
        STRING.field_of("sensor").for_getter(|r: &Reading| &r.sensor),
        BYTE.field_of("level").for_getter(|r: &Reading| &r.level),
        FLOAT.field_of("ratio").for_getter(|r: &Reading| &r.ratio),
        INT_STREAM.field_of("samples").for_getter(|r: &Reading| &r.samples),
    ))
    .apply(|sensor, level, ratio, samples| Reading {
        sensor,
        level,
        ratio,
        samples,
    })
    .codec()
}

#[test]
fn decodes_a_document() -> Result<(), IPanic> {
    let doc: Value = serde_json::from_str(indoc! {r#"
        {
            "sensor": "north",
            "level": 4,
            "ratio": 0.25,
            "samples": [3, 1, 2]
        }
    "#})?;
    let reading = reading_codec().parse(&JsonOps, &doc).into_result()?;
    assert_eq!(
        reading,
        Reading {
            sensor: "north".to_string(),
            level: 4,
            ratio: 0.25,
            samples: vec![3, 1, 2],
        }
    );
    Ok(())
}

#[test]
fn encodes_in_field_order() -> Result<(), IPanic> {
    let reading = Reading {
        sensor: "south".to_string(),
        level: -2,
        ratio: 1.5,
        samples: vec![],
    };
    let doc = reading_codec().encode_start(&JsonOps, &reading).into_result()?;
    assert_snapshot!(
        doc.to_string(),
        @r#"{"sensor":"south","level":-2,"ratio":1.5,"samples":[]}"#
    );
    Ok(())
}

#[test]
fn missing_field_in_json() {
    let doc = json!({"sensor": "x", "level": 1, "samples": []});
    let result = reading_codec().parse(&JsonOps, &doc);
    let message = result.error_message().unwrap();
    assert!(message.starts_with("No key ratio in MapLike["), "{message}");
    assert_eq!(result.partial(), None);
}

#[test]
fn list_of_wrong_kind() {
    let result = INT.list_of().parse(&JsonOps, &json!([1, "two"]));
    assert_snapshot!(result.error_message().unwrap(), @r#"Not a number: "two""#);
}

#[test]
fn boxed_codecs_read_with_the_json_rules() {
    assert_eq!(BOOL.boxed().parse(&JsonOps, &json!(1)).into_value(), Some(true));
    assert_eq!(
        BOOL.boxed().parse(&JsonOps, &json!(1)),
        BOOL.parse(&JsonOps, &json!(1))
    );
    assert_eq!(INT.boxed().parse(&JsonOps, &json!(true)).into_value(), Some(1));
    assert_eq!(
        STRING.boxed().parse(&JsonOps, &json!(1)).error_message(),
        STRING.parse(&JsonOps, &json!(1)).error_message()
    );
}

#[test]
fn boxed_records_match_unboxed_ones() {
    let doc = json!({"sensor": "x", "level": true, "ratio": 0.5, "samples": [1, 2]});
    let boxed = reading_codec().boxed();
    assert_eq!(
        boxed.parse(&JsonOps, &doc).into_value(),
        reading_codec().parse(&JsonOps, &doc).into_value()
    );
    assert_eq!(boxed.parse(&JsonOps, &doc).into_value().map(|r| r.level), Some(1));

    let broken = json!({"sensor": 3, "level": 1, "ratio": 0.5, "samples": []});
    assert_eq!(
        boxed.parse(&JsonOps, &broken).error_message(),
        reading_codec().parse(&JsonOps, &broken).error_message()
    );

    let reading = Reading {
        sensor: "y".to_string(),
        level: 2,
        ratio: 0.75,
        samples: vec![4],
    };
    assert_eq!(
        boxed.encode_start(&JsonOps, &reading).into_value(),
        reading_codec().encode_start(&JsonOps, &reading).into_value()
    );
}

#[test]
fn json_to_reference_keeps_structure() {
    let doc = json!({"a": [1, 2.5, null, true], "b": {"c": "d"}});
    let value = JsonOps.convert_to(&ValueOps, &doc);
    assert_snapshot!(value.to_string(), @r#"{"a": [1L, 2.5d, empty, true], "b": {"c": "d"}}"#);
    assert_eq!(ValueOps.convert_to(&JsonOps, &value), doc);
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(|f| json!(f)),
        "[a-z0-9 ]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 64, 10, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..10).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..10)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn json_survives_the_reference_backend(doc in arb_json()) {
        let value = JsonOps.convert_to(&ValueOps, &doc);
        prop_assert_eq!(ValueOps.convert_to(&JsonOps, &value), doc);
    }
}

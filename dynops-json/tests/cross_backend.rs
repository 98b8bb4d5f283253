//! The same codec read through both backends.

#![allow(clippy::expect_used)]

use dynops_codec::Codec;
use dynops_core::DynamicOps;
use dynops_json::JsonOps;
use dynops_suite::{DayData, TestData, test_data_codec, write_read};
use dynops_value::ValueOps;
use proptest::prelude::*;

fn arb_day_data() -> impl Strategy<Value = DayData> {
    prop_oneof![
        any::<i32>().prop_map(DayData::Tuesday),
        "[a-z ]{0,12}".prop_map(DayData::Wednesday),
        (-1.0e6f32..1.0e6f32).prop_map(DayData::Sunday),
    ]
}

fn arb_test_data() -> impl Strategy<Value = TestData> {
    (
        (
            -1.0e6f32..1.0e6f32,
            -1.0e12f64..1.0e12f64,
            any::<i8>(),
            any::<i16>(),
            any::<i32>(),
            any::<i64>(),
            any::<bool>(),
            "[a-z0-9.]{0,8}",
        ),
        (
            prop::collection::vec("[a-z]{0,6}", 0..6),
            prop::collection::vec(("[a-z]{1,4}", "[a-z]{0,4}"), 0..6),
            prop::collection::vec(("[a-z]{0,4}", "[a-z]{0,4}"), 0..6),
            arb_day_data(),
        ),
    )
        .prop_map(|((a, b, c, d, e, f, g, h), (i, j, k, day_data))| TestData {
            a,
            b,
            c,
            d,
            e,
            f,
            g,
            h,
            i,
            j: j.into_iter().collect(),
            k,
            day_data,
        })
}

#[test]
fn records_read_with_json_rules_boxed_or_not() {
    let codec = test_data_codec();
    let mut doc = codec
        .encode_start(&JsonOps, &TestData::sample())
        .into_value()
        .expect("encodes");
    doc["g"] = serde_json::json!(1);
    doc["c"] = serde_json::json!(-93.0);
    assert_eq!(codec.parse(&JsonOps, &doc).into_value(), Some(TestData::sample()));
    assert_eq!(
        codec.boxed().parse(&JsonOps, &doc).into_value(),
        Some(TestData::sample())
    );
}

proptest! {
    #[test]
    fn json_write_read_is_identity(data in arb_test_data()) {
        let decoded = write_read(&JsonOps, &test_data_codec(), &data);
        prop_assert_eq!(decoded.into_value(), Some(data));
    }

    #[test]
    fn reference_tree_reads_back_as_json(data in arb_test_data()) {
        let codec = test_data_codec();
        let reference = codec.encode_start(&ValueOps, &data).into_value().expect("encodes");
        let json = ValueOps.convert_to(&JsonOps, &reference);
        prop_assert_eq!(codec.parse(&JsonOps, &json).into_value(), Some(data));
    }

    #[test]
    fn json_tree_reads_back_as_reference(data in arb_test_data()) {
        let codec = test_data_codec();
        let json = codec.encode_start(&JsonOps, &data).into_value().expect("encodes");
        let reference = JsonOps.convert_to(&ValueOps, &json);
        prop_assert_eq!(codec.parse(&ValueOps, &reference).into_value(), Some(data));
    }
}

//! Round trips of composed codecs through the reference backend.

#![allow(clippy::expect_used, clippy::float_cmp)]

use dynops_codec::{
    BoxedCodec, BoxedMapCodec, Codec, Either, MapCodec, DOUBLE, FLOAT, INT, LONG, STRING,
    compound_list, either, group, unbounded_map,
};
use dynops_core::DynamicOps;
use dynops_value::{Value, ValueOps};
use indexmap::IndexMap;
use proptest::prelude::*;
use static_assertions::assert_impl_all;

assert_impl_all!(BoxedCodec<Record>: Send, Sync, Clone);
assert_impl_all!(BoxedMapCodec<Record>: Send, Sync, Clone);

#[derive(Clone, Debug, PartialEq)]
struct Record {
    name: String,
    ratio: f32,
    total: f64,
    ids: Vec<i64>,
    nick: Option<String>,
    tags: IndexMap<String, i32>,
    pairs: Vec<(String, String)>,
    either: Either<i32, String>,
}

fn record_codec() -> BoxedCodec<Record> {
    group((
        STRING.field_of("name").for_getter(|r: &Record| &r.name),
        FLOAT.field_of("ratio").for_getter(|r: &Record| &r.ratio),
        DOUBLE.field_of("total").for_getter(|r: &Record| &r.total),
        LONG.list_of().field_of("ids").for_getter(|r: &Record| &r.ids),
        STRING.optional_field_of("nick").for_getter(|r: &Record| &r.nick),
        unbounded_map(STRING, INT)
            .field_of("tags")
            .for_getter(|r: &Record| &r.tags),
        compound_list(STRING, STRING)
            .field_of("pairs")
            .for_getter(|r: &Record| &r.pairs),
        either(INT, STRING)
            .field_of("either")
            .for_getter(|r: &Record| &r.either),
    ))
    .apply(|name, ratio, total, ids, nick, tags, pairs, either| Record {
        name,
        ratio,
        total,
        ids,
        nick,
        tags,
        pairs,
        either,
    })
    .codec()
    .boxed()
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        "[a-z]{0,8}",
        -1.0e6f32..1.0e6f32,
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
        prop::collection::vec(any::<i64>(), 0..8),
        prop::option::of("[a-z]{1,8}"),
        prop::collection::vec(("[a-z]{1,4}", any::<i32>()), 0..6),
        prop::collection::vec(("[a-z]{0,4}", "[a-z]{0,4}"), 0..6),
        prop_oneof![
            any::<i32>().prop_map(Either::Left),
            "[a-z]{0,6}".prop_map(Either::Right),
        ],
    )
        .prop_map(|(name, ratio, total, ids, nick, tags, pairs, either)| Record {
            name,
            ratio,
            total,
            ids,
            nick,
            tags: tags.into_iter().collect(),
            pairs,
            either,
        })
}

proptest! {
    #[test]
    fn read_after_write_is_identity(record in arb_record()) {
        let codec = record_codec();
        let encoded = codec.encode_start(&ValueOps, &record).into_value().expect("encodes");
        let (decoded, _) = codec.decode(&ValueOps, &encoded).into_value().expect("decodes");
        prop_assert_eq!(decoded, record);
    }

    #[test]
    fn write_after_read_is_identity(record in arb_record()) {
        let codec = record_codec();
        let encoded = codec.encode_start(&ValueOps, &record).into_value().expect("encodes");
        let decoded = codec.parse(&ValueOps, &encoded).into_value().expect("decodes");
        let again = codec.encode_start(&ValueOps, &decoded).into_value().expect("re-encodes");
        prop_assert_eq!(again, encoded);
    }
}

#[dynops_testhelpers::test]
fn removing_a_field_fails_naming_it() {
    #[derive(Debug, PartialEq)]
    struct Ab {
        a: f32,
        b: Vec<i32>,
    }

    let codec = group((
        FLOAT.field_of("a").for_getter(|v: &Ab| &v.a),
        INT.list_of().field_of("b").for_getter(|v: &Ab| &v.b),
    ))
    .apply(|a, b| Ab { a, b })
    .codec();

    let value = Ab {
        a: 1.5,
        b: vec![1, 2, 3],
    };
    let encoded = codec.encode_start(&ValueOps, &value).into_value().expect("encodes");
    assert_eq!(encoded.get("a"), Some(&Value::Float(1.5)));
    assert_eq!(codec.parse(&ValueOps, &encoded).into_value(), Some(value));

    let without_a = ValueOps.remove(&encoded, "a");
    let error = codec
        .parse(&ValueOps, &without_a)
        .error_message()
        .expect("missing field");
    assert!(error.starts_with("No key a in"), "{error}");
}

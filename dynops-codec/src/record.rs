//! Records: products built from several fields of one map.

use core::fmt;
use core::marker::PhantomData;

use dynops_core::{DataResult, DynamicOps, MapLike, RecordBuilder};
use dynops_value::ValueOps;

use crate::MapCodec;
use crate::accumulator::Accumulator;
use crate::tracing_macros::warn;

/// A [`MapCodec`] paired with the getter that reads its value out of a
/// record of type `P`. Created by [`MapCodec::for_getter`].
pub struct RecordField<M, A, P, G> {
    codec: M,
    getter: G,
    _marker: PhantomData<fn(&P) -> A>,
}

impl<M, A, P, G> RecordField<M, A, P, G> {
    pub(crate) fn new(codec: M, getter: G) -> Self {
        Self {
            codec,
            getter,
            _marker: PhantomData,
        }
    }
}

impl<M: Clone, A, P, G: Clone> Clone for RecordField<M, A, P, G> {
    fn clone(&self) -> Self {
        Self::new(self.codec.clone(), self.getter.clone())
    }
}

impl<M: fmt::Debug, A, P, G> fmt::Debug for RecordField<M, A, P, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordField")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// One field of a record of type `P`.
pub trait RecordFieldCodec<P> {
    /// The type of the field.
    type Value;

    /// The keys this field reads.
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value>;

    /// Decode the field's value.
    fn decode<O: DynamicOps>(
        &self,
        ops: &O,
        input: &dyn MapLike<O::Value>,
    ) -> DataResult<Self::Value>;

    /// Write the field of `record`.
    fn encode<O: DynamicOps>(&self, record: &P, ops: &O, builder: &mut RecordBuilder<'_, O>);
}

impl<M, A, P, G> RecordFieldCodec<P> for RecordField<M, A, P, G>
where
    M: MapCodec<A>,
    G: Fn(&P) -> &A,
{
    type Value = A;

    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        self.codec.keys(ops)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<A> {
        self.codec.decode(ops, input)
    }

    fn encode<O: DynamicOps>(&self, record: &P, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        self.codec.encode((self.getter)(record), ops, builder)
    }
}

/// Fields waiting for a constructor. See [`group`].
pub struct Group<P, Fs> {
    fields: Fs,
    _marker: PhantomData<fn() -> P>,
}

/// Start a record codec from a tuple of up to 16 fields.
///
/// ```
/// use dynops_codec::{Codec, MapCodec, FLOAT, STRING, group};
///
/// struct Pet {
///     name: String,
///     weight: f32,
/// }
///
/// let codec = group((
///     STRING.field_of("name").for_getter(|p: &Pet| &p.name),
///     FLOAT.field_of("weight").for_getter(|p: &Pet| &p.weight),
/// ))
/// .apply(|name, weight| Pet { name, weight })
/// .codec();
/// # let _ = codec;
/// ```
///
/// Every field decodes against the same map. All failing fields are
/// reported, joined with `"; "`; a partial record is only built when every
/// field produced a value or a partial.
///
/// Two fields writing the same key leave the last one's value in the map.
/// `apply` logs a warning for such records, and
/// [`RecordCodec::duplicate_keys`] lists the offending keys.
pub fn group<P, Fs>(fields: Fs) -> Group<P, Fs> {
    Group {
        fields,
        _marker: PhantomData,
    }
}

/// A record codec. Created by `group(..).apply(..)`.
pub struct RecordCodec<P, Fs, C> {
    fields: Fs,
    constructor: C,
    _marker: PhantomData<fn() -> P>,
}

impl<P, Fs, C> RecordCodec<P, Fs, C>
where
    Self: MapCodec<P>,
{
    /// Keys claimed by more than one field, each listed once, in field
    /// order.
    pub fn duplicate_keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        let keys = self.keys(ops);
        let mut duplicates: Vec<O::Value> = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) && !duplicates.contains(key) {
                duplicates.push(key.clone());
            }
        }
        duplicates
    }

    fn checked(self) -> Self {
        let duplicates = self.duplicate_keys(&ValueOps);
        if !duplicates.is_empty() {
            warn!(
                ?duplicates,
                "record fields share keys; the field written last wins"
            );
        }
        self
    }
}

impl<P, Fs: Clone, C: Clone> Clone for RecordCodec<P, Fs, C> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            constructor: self.constructor.clone(),
            _marker: PhantomData,
        }
    }
}

impl<P, Fs: fmt::Debug, C> fmt::Debug for RecordCodec<P, Fs, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCodec")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

macro_rules! record_arity {
    ($($F:ident $v:ident $idx:tt),+) => {
        impl<P, $($F: RecordFieldCodec<P>),+> Group<P, ($($F,)+)> {
            /// Finish the record with the function that builds it from the
            /// field values, in field order.
            pub fn apply<C>(self, constructor: C) -> RecordCodec<P, ($($F,)+), C>
            where
                C: Fn($($F::Value),+) -> P,
            {
                RecordCodec {
                    fields: self.fields,
                    constructor,
                    _marker: PhantomData,
                }
                .checked()
            }
        }

        impl<P, $($F: RecordFieldCodec<P>,)+ C> MapCodec<P> for RecordCodec<P, ($($F,)+), C>
        where
            C: Fn($($F::Value),+) -> P,
        {
            fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
                let mut keys = Vec::new();
                $(keys.extend(self.fields.$idx.keys(ops));)+
                keys
            }

            fn decode<O: DynamicOps>(
                &self,
                ops: &O,
                input: &dyn MapLike<O::Value>,
            ) -> DataResult<P> {
                let mut acc = Accumulator::new();
                $(let $v = acc.record(self.fields.$idx.decode(ops, input));)+
                let record = match ($($v,)+) {
                    ($(Some($v),)+) => Some((self.constructor)($($v),+)),
                    _ => None,
                };
                acc.finish_partial(record)
            }

            fn encode<O: DynamicOps>(
                &self,
                input: &P,
                ops: &O,
                builder: &mut RecordBuilder<'_, O>,
            ) {
                $(self.fields.$idx.encode(input, ops, builder);)+
            }
        }
    };
}

record_arity!(F1 v1 0);
record_arity!(F1 v1 0, F2 v2 1);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6, F8 v8 7);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6, F8 v8 7, F9 v9 8);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6, F8 v8 7, F9 v9 8, F10 v10 9);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6, F8 v8 7, F9 v9 8, F10 v10 9, F11 v11 10);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6, F8 v8 7, F9 v9 8, F10 v10 9, F11 v11 10, F12 v12 11);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6, F8 v8 7, F9 v9 8, F10 v10 9, F11 v11 10, F12 v12 11, F13 v13 12);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6, F8 v8 7, F9 v9 8, F10 v10 9, F11 v11 10, F12 v12 11, F13 v13 12, F14 v14 13);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6, F8 v8 7, F9 v9 8, F10 v10 9, F11 v11 10, F12 v12 11, F13 v13 12, F14 v14 13, F15 v15 14);
record_arity!(F1 v1 0, F2 v2 1, F3 v3 2, F4 v4 3, F5 v5 4, F6 v6 5, F7 v7 6, F8 v8 7, F9 v9 8, F10 v10 9, F11 v11 10, F12 v12 11, F13 v13 12, F14 v14 13, F15 v15 14, F16 v16 15);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, FLOAT, INT, STRING};
    use dynops_testhelpers::test;
    use dynops_value::{Value, ValueOps};
    use insta::assert_snapshot;

    #[derive(Clone, Debug, PartialEq)]
    struct Sample {
        a: f32,
        b: Vec<i32>,
    }

    fn sample_codec() -> impl Codec<Sample> {
        group((
            FLOAT.field_of("a").for_getter(|s: &Sample| &s.a),
            INT.list_of().field_of("b").for_getter(|s: &Sample| &s.b),
        ))
        .apply(|a, b| Sample { a, b })
        .codec()
    }

    #[test]
    fn record_round_trip() {
        let value = Sample {
            a: 1.5,
            b: vec![1, 2, 3],
        };
        let encoded = sample_codec().encode_start(&ValueOps, &value).into_value().unwrap();
        assert_snapshot!(encoded.to_string(), @r#"{"a": 1.5f, "b": [1, 2, 3]}"#);
        assert_eq!(sample_codec().parse(&ValueOps, &encoded).into_value(), Some(value));
    }

    #[test]
    fn every_failing_field_is_reported() {
        let input = Value::map(vec![(Value::from("b"), Value::Int(1))]);
        let result = sample_codec().parse(&ValueOps, &input);
        assert_snapshot!(
            result.error_message().unwrap(),
            @r#"No key a in MapLike[{"b": 1}]; Not a list: 1"#
        );
        assert_eq!(result.partial(), None);
    }

    #[test]
    fn partial_record_when_every_field_has_a_value() {
        let input = Value::map(vec![
            (Value::from("a"), Value::Float(2.0)),
            (Value::from("b"), Value::list(vec![Value::Int(4), Value::from("x")])),
        ]);
        let result = sample_codec().parse(&ValueOps, &input);
        assert!(result.is_error());
        assert_eq!(
            result.partial(),
            Some(&Sample {
                a: 2.0,
                b: vec![4]
            })
        );
    }

    #[test]
    fn keys_follow_field_order() {
        let codec = group((
            STRING.field_of("z").for_getter(|p: &(String, i32)| &p.0),
            INT.field_of("y").for_getter(|p: &(String, i32)| &p.1),
        ))
        .apply(|z, y| (z, y));
        assert_eq!(
            codec.keys(&ValueOps),
            vec![Value::from("z"), Value::from("y")]
        );
    }

    #[test]
    fn single_field_record() {
        let codec = group((INT.field_of("n").for_getter(|n: &i32| n),))
            .apply(|n| n)
            .codec();
        let encoded = codec.encode_start(&ValueOps, &5).into_value().unwrap();
        assert_eq!(codec.parse(&ValueOps, &encoded).into_value(), Some(5));
    }

    #[test]
    fn shared_keys_are_listed_and_last_write_wins() {
        static EMPTY: String = String::new();
        let codec = group((
            INT.field_of("n").for_getter(|p: &(i32, i32)| &p.0),
            STRING.field_of("s").for_getter(|_: &(i32, i32)| &EMPTY),
            INT.field_of("n").for_getter(|p: &(i32, i32)| &p.1),
        ))
        .apply(|first, _, second| (first, second));
        assert_eq!(codec.duplicate_keys(&ValueOps), vec![Value::from("n")]);

        let whole = codec.codec();
        let encoded = whole.encode_start(&ValueOps, &(1, 2)).into_value().unwrap();
        assert_snapshot!(encoded.to_string(), @r#"{"n": 2, "s": ""}"#);
        assert_eq!(whole.parse(&ValueOps, &encoded).into_value(), Some((2, 2)));
    }

    #[test]
    fn distinct_keys_have_no_duplicates() {
        let codec = group((
            FLOAT.field_of("a").for_getter(|s: &Sample| &s.a),
            INT.list_of().field_of("b").for_getter(|s: &Sample| &s.b),
        ))
        .apply(|a, b| Sample { a, b });
        assert!(codec.duplicate_keys(&ValueOps).is_empty());
    }
}

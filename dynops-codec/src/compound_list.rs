//! Ordered key/value pairs stored as a list of single-entry maps.

use dynops_core::{DataResult, DynamicOps};

use crate::Codec;
use crate::accumulator::Accumulator;

/// See [`compound_list`].
#[derive(Clone, Debug)]
pub struct CompoundListCodec<KC, VC> {
    key: KC,
    value: VC,
}

/// A codec for `Vec<(K, V)>` written as `[{k1: v1}, {k2: v2}, ...]`.
///
/// Unlike [`unbounded_map`](crate::unbounded_map) this keeps order and
/// allows repeated keys. Decoding reports every broken entry; the entries
/// that did decode come back as the partial value and the broken ones as
/// leftover.
pub fn compound_list<KC, VC>(key: KC, value: VC) -> CompoundListCodec<KC, VC> {
    CompoundListCodec { key, value }
}

impl<K, V, KC, VC> Codec<Vec<(K, V)>> for CompoundListCodec<KC, VC>
where
    KC: Codec<K>,
    VC: Codec<V>,
{
    fn encode<O: DynamicOps>(
        &self,
        input: &Vec<(K, V)>,
        ops: &O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        let mut list = ops.list_builder();
        for (key, value) in input {
            let mut entry = ops.map_builder();
            entry.add_results(
                self.key.encode_start(ops, key),
                self.value.encode_start(ops, value),
            );
            list.add_result(entry.build(ops.empty()));
        }
        list.build(prefix)
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: &O,
        input: &O::Value,
    ) -> DataResult<(Vec<(K, V)>, O::Value)> {
        ops.get_list(input).flat_map(|push| {
            let mut acc = Accumulator::new();
            let mut entries = Vec::new();
            let mut failed = Vec::new();
            push(&mut |item: O::Value| {
                let mut broken = false;
                if let Some(push_entries) = acc.record(ops.get_map_entries(&item)) {
                    push_entries(&mut |k: O::Value, v: O::Value| {
                        let entry = self
                            .key
                            .parse(ops, &k)
                            .apply2(self.value.parse(ops, &v), |k, v| (k, v));
                        broken |= entry.is_error();
                        if let Some(entry) = acc.record(entry) {
                            entries.push(entry);
                        }
                    });
                } else {
                    broken = true;
                }
                if broken {
                    failed.push(item);
                }
            });
            let rest = if failed.is_empty() {
                ops.empty()
            } else {
                ops.create_list(failed)
            };
            acc.finish((entries, rest))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{INT, STRING};
    use dynops_testhelpers::test;
    use dynops_value::{Value, ValueOps};
    use insta::assert_snapshot;

    fn pairs() -> Vec<(String, i32)> {
        vec![("b".to_string(), 1), ("a".to_string(), 2), ("b".to_string(), 3)]
    }

    #[test]
    fn keeps_order_and_repeats() {
        let codec = compound_list(STRING, INT);
        let encoded = codec.encode_start(&ValueOps, &pairs()).into_value().unwrap();
        assert_snapshot!(encoded.to_string(), @r#"[{"b": 1}, {"a": 2}, {"b": 3}]"#);
        assert_eq!(
            codec.decode(&ValueOps, &encoded).into_value(),
            Some((pairs(), Value::Empty))
        );
    }

    #[test]
    fn broken_entries_are_reported_and_left_over() {
        let input = Value::list(vec![
            Value::map(vec![(Value::from("a"), Value::Int(1))]),
            Value::Int(7),
            Value::map(vec![(Value::from("b"), Value::from("x"))]),
        ]);
        let result = compound_list(STRING, INT).decode(&ValueOps, &input);
        assert_snapshot!(
            result.error_message().unwrap(),
            @r#"Not a map: 7; Not a number: "x""#
        );
        let (entries, rest) = result.into_result_or_partial().unwrap();
        assert_eq!(entries, vec![("a".to_string(), 1)]);
        assert_eq!(
            rest,
            Value::list(vec![
                Value::Int(7),
                Value::map(vec![(Value::from("b"), Value::from("x"))]),
            ])
        );
    }
}

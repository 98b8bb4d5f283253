//! Maps whose keys are data rather than a fixed schema.

use core::hash::Hash;

use dynops_core::{DataResult, DynamicOps};
use indexmap::IndexMap;

use crate::Codec;
use crate::accumulator::Accumulator;

/// See [`unbounded_map`].
#[derive(Clone, Debug)]
pub struct UnboundedMapCodec<KC, VC> {
    key: KC,
    value: VC,
}

/// A codec for `IndexMap<K, V>` where every entry of the input map is
/// decoded through `key` and `value`.
///
/// Repeated decoded keys keep the last value. Broken entries are all
/// reported, with the decoded subset as the partial value and the broken
/// entries appended to the message. The leftover is the input map itself.
pub fn unbounded_map<KC, VC>(key: KC, value: VC) -> UnboundedMapCodec<KC, VC> {
    UnboundedMapCodec { key, value }
}

impl<K, V, KC, VC> Codec<IndexMap<K, V>> for UnboundedMapCodec<KC, VC>
where
    K: Hash + Eq,
    KC: Codec<K>,
    VC: Codec<V>,
{
    fn encode<O: DynamicOps>(
        &self,
        input: &IndexMap<K, V>,
        ops: &O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        let mut builder = ops.map_builder();
        for (key, value) in input {
            builder.add_results(
                self.key.encode_start(ops, key),
                self.value.encode_start(ops, value),
            );
        }
        builder.build(prefix)
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: &O,
        input: &O::Value,
    ) -> DataResult<(IndexMap<K, V>, O::Value)> {
        ops.get_map(input).flat_map(|map| {
            let mut acc = Accumulator::new();
            let mut read = IndexMap::new();
            let mut failed = Vec::new();
            for (k, v) in map.entries() {
                let entry = self
                    .key
                    .parse(ops, &k)
                    .apply2(self.value.parse(ops, &v), |k, v| (k, v));
                if entry.is_error() {
                    failed.push((k, v));
                }
                if let Some((key, value)) = acc.record(entry) {
                    read.insert(key, value);
                }
            }
            let result = acc.finish((read, input.clone()));
            if failed.is_empty() {
                return result;
            }
            let missed = ops.create_map(failed);
            result.map_error(move |message| format!("{message} missed input: {missed:?}"))
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

    #[test]
    fn round_trips_in_insertion_order() {
        let codec = unbounded_map(STRING, INT);
        let mut map = IndexMap::new();
        map.insert("z".to_string(), 1);
        map.insert("a".to_string(), 2);
        let encoded = codec.encode_start(&ValueOps, &map).into_value().unwrap();
        assert_snapshot!(encoded.to_string(), @r#"{"z": 1, "a": 2}"#);
        let (decoded, rest) = codec.decode(&ValueOps, &encoded).into_value().unwrap();
        assert_eq!(decoded, map);
        assert_eq!(rest, encoded);
    }

    #[test]
    fn broken_entries_are_listed() {
        let input = Value::map(vec![
            (Value::from("ok"), Value::Int(1)),
            (Value::from("bad"), Value::from("x")),
        ]);
        let result = unbounded_map(STRING, INT).decode(&ValueOps, &input);
        assert_snapshot!(
            result.error_message().unwrap(),
            @r#"Not a number: "x" missed input: {"bad": "x"}"#
        );
        let (partial, _) = result.into_result_or_partial().unwrap();
        assert_eq!(partial.get("ok"), Some(&1));
        assert_eq!(partial.len(), 1);
    }

    #[test]
    fn merges_into_an_existing_map() {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), 2);
        let prefix = Value::map(vec![(Value::from("a"), Value::Int(1))]);
        let encoded = unbounded_map(STRING, INT)
            .encode(&map, &ValueOps, prefix)
            .into_value()
            .unwrap();
        assert_snapshot!(encoded.to_string(), @r#"{"a": 1, "b": 2}"#);
    }
}

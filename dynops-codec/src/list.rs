//! Homogeneous lists.

use dynops_core::{DataResult, DynamicOps, Message};

use crate::Codec;
use crate::accumulator::Accumulator;

/// A list of values decoded by one element codec, optionally bounded in
/// length. Created by [`Codec::list_of`] and [`Codec::sized_list_of`].
#[derive(Clone, Debug)]
pub struct ListCodec<C> {
    element: C,
    min: usize,
    max: usize,
}

impl<C> ListCodec<C> {
    pub(crate) fn new(element: C) -> Self {
        Self::sized(element, 0, usize::MAX)
    }

    pub(crate) fn sized(element: C, min: usize, max: usize) -> Self {
        Self { element, min, max }
    }

    fn size_error(&self, len: usize) -> Option<Message> {
        let (min, max) = (self.min, self.max);
        if len < min {
            Some(Message::new(move || {
                format!("List is too short: {len}, expected range [{min}-{max}]")
            }))
        } else if len > max {
            Some(Message::new(move || {
                format!("List is too long: {len}, expected range [{min}-{max}]")
            }))
        } else {
            None
        }
    }
}

impl<A, C: Codec<A>> Codec<Vec<A>> for ListCodec<C> {
    fn encode<O: DynamicOps>(&self, input: &Vec<A>, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        let mut builder = ops.list_builder();
        if let Some(message) = self.size_error(input.len()) {
            builder.add_error(message);
        }
        for item in input {
            builder.add_result(self.element.encode_start(ops, item));
        }
        builder.build(prefix)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(Vec<A>, O::Value)> {
        ops.get_list(input).flat_map(|push| {
            let mut acc = Accumulator::new();
            let mut elements = Vec::new();
            let mut failed = Vec::new();
            let mut count = 0usize;
            push(&mut |item: O::Value| {
                count += 1;
                if count > self.max {
                    failed.push(item);
                    return;
                }
                let decoded = self.element.decode(ops, &item);
                if decoded.is_error() {
                    failed.push(item);
                }
                if let Some((value, _)) = acc.record(decoded) {
                    elements.push(value);
                }
            });
            if let Some(message) = self.size_error(count) {
                acc.push(message);
            }
            let rest = if failed.is_empty() {
                ops.empty()
            } else {
                ops.create_list(failed)
            };
            acc.finish((elements, rest))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Codec, INT, STRING};
    use dynops_testhelpers::test;
    use dynops_value::{Value, ValueOps};
    use insta::assert_snapshot;

    #[test]
    fn lists_round_trip() {
        let codec = INT.list_of();
        let encoded = codec.encode_start(&ValueOps, &vec![1, 2, 3]).into_value().unwrap();
        assert_eq!(
            encoded,
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            codec.decode(&ValueOps, &encoded).into_value(),
            Some((vec![1, 2, 3], Value::Empty))
        );
    }

    #[test]
    fn empty_list_encodes_to_empty_container() {
        let encoded = INT.list_of().encode_start(&ValueOps, &vec![]).into_value().unwrap();
        assert_eq!(encoded, Value::list(vec![]));
    }

    #[test]
    fn failing_elements_become_leftover() {
        let input = Value::list(vec![Value::Int(1), Value::from("x"), Value::Int(3)]);
        let result = INT.list_of().decode(&ValueOps, &input);
        assert_snapshot!(result.error_message().unwrap(), @r#"Not a number: "x""#);
        let (values, rest) = result.into_result_or_partial().unwrap();
        assert_eq!(values, vec![1, 3]);
        assert_eq!(rest, Value::list(vec![Value::from("x")]));
    }

    #[test]
    fn bounds_are_checked() {
        let codec = STRING.sized_list_of(1, 2);
        assert_snapshot!(
            codec.parse(&ValueOps, &Value::list(vec![])).error_message().unwrap(),
            @"List is too short: 0, expected range [1-2]"
        );
        let long = Value::list(vec![Value::from("a"), Value::from("b"), Value::from("c")]);
        let result = codec.decode(&ValueOps, &long);
        assert_snapshot!(
            result.error_message().unwrap(),
            @"List is too long: 3, expected range [1-2]"
        );
        assert_eq!(
            result.into_result_or_partial().map(|(v, _)| v),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert!(
            codec
                .encode_start(&ValueOps, &vec![])
                .is_error()
        );
    }

    #[test]
    fn non_lists_are_rejected() {
        assert_snapshot!(
            INT.list_of().parse(&ValueOps, &Value::Int(1)).error_message().unwrap(),
            @"Not a list: 1"
        );
    }
}

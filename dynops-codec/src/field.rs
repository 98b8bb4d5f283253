//! Single named keys.

use alloc::borrow::Cow;

use dynops_core::{DataResult, DynamicOps, MapLike, RecordBuilder};

use crate::map_codec::MapSnapshot;
use crate::{Codec, MapCodec};

/// A required key. Created by [`Codec::field_of`].
#[derive(Clone, Debug)]
pub struct FieldCodec<C> {
    name: Cow<'static, str>,
    codec: C,
}

impl<C> FieldCodec<C> {
    pub(crate) fn new(name: impl Into<Cow<'static, str>>, codec: C) -> Self {
        Self {
            name: name.into(),
            codec,
        }
    }

    /// The key this field reads and writes.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<A, C: Codec<A>> MapCodec<A> for FieldCodec<C> {
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        vec![ops.create_string(&self.name)]
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<A> {
        match input.get_str(&self.name) {
            Some(value) => self.codec.parse(ops, &value),
            None => {
                let name = self.name.clone();
                let map = MapSnapshot::of(input);
                DataResult::error(move || format!("No key {name} in {map}"))
            }
        }
    }

    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        builder.add_str_result(&self.name, self.codec.encode_start(ops, input));
    }
}

/// A key that may be absent. Created by [`Codec::optional_field_of`].
///
/// An absent key, or one holding the backend's empty value, decodes to
/// `None`. A present value that fails to decode is still an error. `None`
/// is not written.
#[derive(Clone, Debug)]
pub struct OptionalFieldCodec<C> {
    name: Cow<'static, str>,
    codec: C,
}

impl<C> OptionalFieldCodec<C> {
    pub(crate) fn new(name: impl Into<Cow<'static, str>>, codec: C) -> Self {
        Self {
            name: name.into(),
            codec,
        }
    }

    /// The key this field reads and writes.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<A, C: Codec<A>> MapCodec<Option<A>> for OptionalFieldCodec<C> {
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        vec![ops.create_string(&self.name)]
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: &O,
        input: &dyn MapLike<O::Value>,
    ) -> DataResult<Option<A>> {
        match input.get_str(&self.name) {
            Some(value) if !ops.is_empty_value(&value) => self.codec.parse(ops, &value).map(Some),
            _ => DataResult::success(None),
        }
    }

    fn encode<O: DynamicOps>(
        &self,
        input: &Option<A>,
        ops: &O,
        builder: &mut RecordBuilder<'_, O>,
    ) {
        if let Some(value) = input {
            builder.add_str_result(&self.name, self.codec.encode_start(ops, value));
        }
    }
}

/// An optional key with a fallback. Created by
/// [`Codec::optional_field_of_or`].
///
/// Values equal to the default are not written.
#[derive(Clone, Debug)]
pub struct DefaultedFieldCodec<C, A> {
    name: Cow<'static, str>,
    codec: C,
    default: A,
}

impl<C, A> DefaultedFieldCodec<C, A> {
    pub(crate) fn new(name: impl Into<Cow<'static, str>>, codec: C, default: A) -> Self {
        Self {
            name: name.into(),
            codec,
            default,
        }
    }

    /// The key this field reads and writes.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<A, C> MapCodec<A> for DefaultedFieldCodec<C, A>
where
    A: Clone + PartialEq,
    C: Codec<A>,
{
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        vec![ops.create_string(&self.name)]
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<A> {
        match input.get_str(&self.name) {
            Some(value) if !ops.is_empty_value(&value) => self.codec.parse(ops, &value),
            _ => DataResult::success(self.default.clone()),
        }
    }

    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        if *input != self.default {
            builder.add_str_result(&self.name, self.codec.encode_start(ops, input));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{BOOL, Codec, INT, MapCodec, STRING};
    use dynops_testhelpers::test;
    use dynops_value::{Value, ValueOps};
    use insta::assert_snapshot;

    #[test]
    fn missing_field_names_the_key() {
        let input = Value::map(vec![(Value::from("b"), Value::Int(1))]);
        let result = INT.field_of("a").codec().parse(&ValueOps, &input);
        assert_snapshot!(
            result.error_message().unwrap(),
            @r#"No key a in MapLike[{"b": 1}]"#
        );
    }

    #[test]
    fn optional_field_reads_absent_and_empty_as_none() {
        let codec = STRING.optional_field_of("nick").codec();
        assert_eq!(
            codec.parse(&ValueOps, &Value::map(vec![])).into_value(),
            Some(None)
        );
        let empty = Value::map(vec![(Value::from("nick"), Value::Empty)]);
        assert_eq!(codec.parse(&ValueOps, &empty).into_value(), Some(None));
        assert_eq!(
            codec.encode_start(&ValueOps, &None).into_value(),
            Some(Value::map(vec![]))
        );
    }

    #[test]
    fn optional_field_propagates_parse_errors() {
        let input = Value::map(vec![(Value::from("nick"), Value::Int(1))]);
        let result = STRING.optional_field_of("nick").codec().parse(&ValueOps, &input);
        assert_snapshot!(result.error_message().unwrap(), @"Not a string: 1");
    }

    #[test]
    fn defaulted_field_skips_default_on_write() {
        let codec = BOOL.optional_field_of_or("enabled", true).codec();
        assert_eq!(
            codec.encode_start(&ValueOps, &true).into_value(),
            Some(Value::map(vec![]))
        );
        let written = codec.encode_start(&ValueOps, &false).into_value().unwrap();
        assert_snapshot!(written.to_string(), @r#"{"enabled": false}"#);
        assert_eq!(codec.parse(&ValueOps, &Value::map(vec![])).into_value(), Some(true));
        assert_eq!(codec.parse(&ValueOps, &written).into_value(), Some(false));
    }

    #[test]
    fn field_keys() {
        assert_eq!(INT.field_of("x").keys(&ValueOps), vec![Value::from("x")]);
    }
}

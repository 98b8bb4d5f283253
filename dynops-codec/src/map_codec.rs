//! Codecs that read and write some of the keys of a map.

use alloc::sync::Arc;
use core::fmt;
use core::marker::PhantomData;

use dynops_core::{DataResult, DynamicOps, Lifecycle, MapLike, RecordBuilder};

use crate::{BoxedMapCodec, Codec, RecordField};

/// A codec for a fragment of a map.
///
/// Several map codecs can read from the same map and write into the same
/// [`RecordBuilder`]; records are built that way. [`MapCodec::codec`] turns
/// one into a plain [`Codec`].
pub trait MapCodec<A> {
    /// The keys this codec reads, where known up front.
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value>;

    /// Decode from a map view.
    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<A>;

    /// Add this codec's entries to `builder`.
    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, builder: &mut RecordBuilder<'_, O>);

    /// Lift into a [`Codec`] for the whole map.
    fn codec(self) -> MapCodecCodec<Self>
    where
        Self: Sized,
    {
        MapCodecCodec { inner: self }
    }

    /// Pair with a getter so the codec can be a field of a record of
    /// type `P`. See [`group`](crate::group).
    fn for_getter<P, G>(self, getter: G) -> RecordField<Self, A, P, G>
    where
        Self: Sized,
        G: Fn(&P) -> &A,
    {
        RecordField::new(self, getter)
    }

    /// Map through a pair of inverse functions.
    fn xmap<B, F, G>(self, to: F, from: G) -> MapXmap<Self, A, F, G>
    where
        Self: Sized,
        F: Fn(A) -> B,
        G: Fn(&B) -> A,
    {
        MapXmap {
            inner: self,
            to,
            from,
            _marker: PhantomData,
        }
    }

    /// Map through a pair of fallible functions.
    fn flat_xmap<B, F, G>(self, to: F, from: G) -> MapFlatXmap<Self, A, F, G>
    where
        Self: Sized,
        F: Fn(A) -> DataResult<B>,
        G: Fn(&B) -> DataResult<A>,
    {
        MapFlatXmap {
            inner: self,
            to,
            from,
            _marker: PhantomData,
        }
    }

    /// Tag decode results with `lifecycle`, and fold it into the builder on
    /// encode.
    fn with_lifecycle(self, lifecycle: Lifecycle) -> MapWithLifecycle<Self>
    where
        Self: Sized,
    {
        MapWithLifecycle {
            inner: self,
            lifecycle,
        }
    }

    /// Erase the concrete codec type.
    fn boxed(self) -> BoxedMapCodec<A>
    where
        Self: Sized + Send + Sync + 'static,
        A: 'static,
    {
        BoxedMapCodec::new(self)
    }
}

impl<A, M: MapCodec<A> + ?Sized> MapCodec<A> for &M {
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        (**self).keys(ops)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<A> {
        (**self).decode(ops, input)
    }

    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        (**self).encode(input, ops, builder)
    }
}

impl<A, M: MapCodec<A> + ?Sized> MapCodec<A> for Arc<M> {
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        (**self).keys(ops)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<A> {
        (**self).decode(ops, input)
    }

    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        (**self).encode(input, ops, builder)
    }
}

/// A [`MapCodec`] used as a [`Codec`].
///
/// Encoding merges the fragment into the prefix. Decoding requires a map
/// and hands the whole input back as leftover.
#[derive(Clone, Debug)]
pub struct MapCodecCodec<M> {
    inner: M,
}

impl<M> MapCodecCodec<M> {
    /// The wrapped map codec.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Unwrap the map codec.
    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<A, M: MapCodec<A>> Codec<A> for MapCodecCodec<M> {
    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        let mut builder = ops.map_builder();
        self.inner.encode(input, ops, &mut builder);
        builder.build(prefix)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(A, O::Value)> {
        ops.get_map(input)
            .flat_map(|map| self.inner.decode(ops, &*map))
            .map(|value| (value, input.clone()))
    }
}

/// See [`unit`].
#[derive(Clone, Debug)]
pub struct UnitCodec<A> {
    value: A,
}

/// A map codec that reads no keys, writes nothing, and always decodes to
/// `value`. The payload of a tag that carries no data.
pub fn unit<A: Clone>(value: A) -> UnitCodec<A> {
    UnitCodec { value }
}

impl<A: Clone> MapCodec<A> for UnitCodec<A> {
    fn keys<O: DynamicOps>(&self, _ops: &O) -> Vec<O::Value> {
        Vec::new()
    }

    fn decode<O: DynamicOps>(&self, _ops: &O, _input: &dyn MapLike<O::Value>) -> DataResult<A> {
        DataResult::success(self.value.clone())
    }

    fn encode<O: DynamicOps>(&self, _input: &A, _ops: &O, _builder: &mut RecordBuilder<'_, O>) {}
}

/// See [`MapCodec::xmap`].
pub struct MapXmap<M, A, F, G> {
    inner: M,
    to: F,
    from: G,
    _marker: PhantomData<fn() -> A>,
}

impl<A, B, M, F, G> MapCodec<B> for MapXmap<M, A, F, G>
where
    M: MapCodec<A>,
    F: Fn(A) -> B,
    G: Fn(&B) -> A,
{
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        self.inner.keys(ops)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<B> {
        self.inner.decode(ops, input).map(&self.to)
    }

    fn encode<O: DynamicOps>(&self, input: &B, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        self.inner.encode(&(self.from)(input), ops, builder)
    }
}

/// See [`MapCodec::flat_xmap`].
pub struct MapFlatXmap<M, A, F, G> {
    inner: M,
    to: F,
    from: G,
    _marker: PhantomData<fn() -> A>,
}

impl<A, B, M, F, G> MapCodec<B> for MapFlatXmap<M, A, F, G>
where
    M: MapCodec<A>,
    F: Fn(A) -> DataResult<B>,
    G: Fn(&B) -> DataResult<A>,
{
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        self.inner.keys(ops)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<B> {
        self.inner.decode(ops, input).flat_map(&self.to)
    }

    fn encode<O: DynamicOps>(&self, input: &B, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        match (self.from)(input) {
            DataResult::Success { value, lifecycle } => {
                builder.add_lifecycle(lifecycle);
                self.inner.encode(&value, ops, builder);
            }
            failed => {
                builder.with_errors_from(&failed);
            }
        }
    }
}

/// See [`MapCodec::with_lifecycle`].
#[derive(Clone, Debug)]
pub struct MapWithLifecycle<M> {
    inner: M,
    lifecycle: Lifecycle,
}

impl<A, M: MapCodec<A>> MapCodec<A> for MapWithLifecycle<M> {
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        self.inner.keys(ops)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<A> {
        self.inner.decode(ops, input).set_lifecycle(self.lifecycle)
    }

    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        self.inner.encode(input, ops, builder);
        builder.add_lifecycle(self.lifecycle);
    }
}

/// An owned copy of a map view, printed the way `dyn MapLike` debugs.
/// Error messages render it lazily.
pub(crate) struct MapSnapshot<T>(Vec<(T, T)>);

impl<T> MapSnapshot<T> {
    pub(crate) fn of(input: &dyn MapLike<T>) -> Self {
        Self(input.entries().collect())
    }
}

impl<T: fmt::Debug> fmt::Display for MapSnapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MapLike[")?;
        f.debug_map()
            .entries(self.0.iter().map(|(k, v)| (k, v)))
            .finish()?;
        f.write_str("]")
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
    fn map_codec_leftover_is_the_input() {
        let codec = INT.field_of("n").codec();
        let input = Value::map(vec![
            (Value::from("n"), Value::Int(3)),
            (Value::from("other"), Value::Bool(true)),
        ]);
        assert_eq!(
            codec.decode(&ValueOps, &input).into_value(),
            Some((3, input.clone()))
        );
    }

    #[test]
    fn map_codec_needs_a_map() {
        let result = INT.field_of("n").codec().parse(&ValueOps, &Value::Int(1));
        assert_snapshot!(result.error_message().unwrap(), @"Not a map: 1");
    }

    #[test]
    fn unit_writes_nothing() {
        let codec = unit("fixed").codec();
        assert_eq!(
            codec.encode_start(&ValueOps, &"fixed").into_value(),
            Some(Value::map(vec![]))
        );
        assert_eq!(
            codec.parse(&ValueOps, &Value::map(vec![])).into_value(),
            Some("fixed")
        );
    }

    #[test]
    fn xmap_keeps_keys() {
        let codec = STRING
            .field_of("name")
            .xmap(|s| s.len(), |n: &usize| "x".repeat(*n));
        assert_eq!(codec.keys(&ValueOps), vec![Value::from("name")]);
        let encoded = codec.codec().encode_start(&ValueOps, &2).into_value().unwrap();
        assert_snapshot!(encoded.to_string(), @r#"{"name": "xx"}"#);
    }

    #[test]
    fn flat_xmap_encode_failure_reaches_the_builder() {
        let codec = INT
            .field_of("n")
            .flat_xmap(DataResult::success, |n: &i32| {
                if *n < 0 {
                    DataResult::error(|| "negative".to_string())
                } else {
                    DataResult::success(*n)
                }
            })
            .codec();
        assert_snapshot!(
            codec.encode_start(&ValueOps, &-1).error_message().unwrap(),
            @"negative"
        );
    }

    #[test]
    fn lifecycle_is_applied_both_ways() {
        let codec = INT.field_of("n").with_lifecycle(Lifecycle::deprecated(3)).codec();
        let encoded = codec.encode_start(&ValueOps, &1);
        assert_eq!(encoded.lifecycle(), Lifecycle::deprecated(3));
        let decoded = codec.parse(&ValueOps, &encoded.into_value().unwrap());
        assert_eq!(decoded.lifecycle(), Lifecycle::deprecated(3));
    }
}

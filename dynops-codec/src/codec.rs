//! The bidirectional converter contract.

use alloc::borrow::Cow;
use alloc::sync::Arc;
use dynops_core::{DataResult, Dynamic, DynamicOps, Lifecycle};

use crate::{
    BoxedCodec, ComapFlatMap, DefaultedFieldCodec, FieldCodec, FlatComapMap, FlatXmap,
    KeyDispatchCodec, ListCodec, MapCodec, MapCodecCodec, OptionalFieldCodec, WithLifecycle, Xmap,
};

/// Converts values of type `A` to and from any backend's tree.
///
/// Encoding merges into a `prefix`, which is what lets several codecs write
/// into the same map. Decoding hands back the input a codec did not consume
/// (the *leftover*): `ops.empty()` for scalars and lists, the input itself
/// for map-shaped codecs whose fields are read independently.
///
/// Round trip: `parse(ops, encode_start(ops, v)) == v` for every value `v`
/// the codec can encode.
pub trait Codec<A> {
    /// Encode `input`, merging the result into `prefix`.
    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, prefix: O::Value) -> DataResult<O::Value>;

    /// Decode a value, returning it with the leftover input.
    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(A, O::Value)>;

    /// Encode into a fresh tree.
    fn encode_start<O: DynamicOps>(&self, ops: &O, input: &A) -> DataResult<O::Value> {
        self.encode(input, ops, ops.empty())
    }

    /// Decode, discarding the leftover.
    fn parse<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<A> {
        self.decode(ops, input).map(|(value, _)| value)
    }

    /// Decode the value wrapped by a [`Dynamic`].
    fn parse_dynamic<O: DynamicOps>(&self, input: &Dynamic<'_, O>) -> DataResult<A> {
        self.parse(input.ops(), input.value())
    }

    /// Encode into a fresh tree wrapped in a [`Dynamic`].
    fn encode_dynamic<'a, O: DynamicOps>(&self, ops: &'a O, input: &A) -> DataResult<Dynamic<'a, O>> {
        self.encode_start(ops, input).map(|value| Dynamic::new(ops, value))
    }

    /// Map through a pair of inverse functions.
    ///
    /// The round trip only holds if `to` and `from` really are inverses.
    fn xmap<B, F, G>(self, to: F, from: G) -> Xmap<Self, A, F, G>
    where
        Self: Sized,
        F: Fn(A) -> B,
        G: Fn(&B) -> A,
    {
        Xmap::new(self, to, from)
    }

    /// Like [`xmap`](Codec::xmap), but decoding may fail.
    fn comap_flat_map<B, F, G>(self, to: F, from: G) -> ComapFlatMap<Self, A, F, G>
    where
        Self: Sized,
        F: Fn(A) -> DataResult<B>,
        G: Fn(&B) -> A,
    {
        ComapFlatMap::new(self, to, from)
    }

    /// Like [`xmap`](Codec::xmap), but encoding may fail.
    fn flat_comap_map<B, F, G>(self, to: F, from: G) -> FlatComapMap<Self, A, F, G>
    where
        Self: Sized,
        F: Fn(A) -> B,
        G: Fn(&B) -> DataResult<A>,
    {
        FlatComapMap::new(self, to, from)
    }

    /// Like [`xmap`](Codec::xmap), but both directions may fail.
    fn flat_xmap<B, F, G>(self, to: F, from: G) -> FlatXmap<Self, A, F, G>
    where
        Self: Sized,
        F: Fn(A) -> DataResult<B>,
        G: Fn(&B) -> DataResult<A>,
    {
        FlatXmap::new(self, to, from)
    }

    /// A codec for lists of `A`.
    fn list_of(self) -> ListCodec<Self>
    where
        Self: Sized,
    {
        ListCodec::new(self)
    }

    /// A codec for lists of `A` with between `min` and `max` elements.
    fn sized_list_of(self, min: usize, max: usize) -> ListCodec<Self>
    where
        Self: Sized,
    {
        ListCodec::sized(self, min, max)
    }

    /// Read and write this value under a required key.
    fn field_of(self, name: impl Into<Cow<'static, str>>) -> FieldCodec<Self>
    where
        Self: Sized,
    {
        FieldCodec::new(name, self)
    }

    /// Read and write this value under an optional key.
    fn optional_field_of(self, name: impl Into<Cow<'static, str>>) -> OptionalFieldCodec<Self>
    where
        Self: Sized,
    {
        OptionalFieldCodec::new(name, self)
    }

    /// An optional key that falls back to `default`. The default is never
    /// written.
    fn optional_field_of_or(
        self,
        name: impl Into<Cow<'static, str>>,
        default: A,
    ) -> DefaultedFieldCodec<Self, A>
    where
        Self: Sized,
        A: Clone + PartialEq,
    {
        DefaultedFieldCodec::new(name, self, default)
    }

    /// Tag every result with `lifecycle`.
    fn with_lifecycle(self, lifecycle: Lifecycle) -> WithLifecycle<Self>
    where
        Self: Sized,
    {
        WithLifecycle::new(self, lifecycle)
    }

    /// Tag every result as stable.
    fn stable(self) -> WithLifecycle<Self>
    where
        Self: Sized,
    {
        self.with_lifecycle(Lifecycle::Stable)
    }

    /// Tag every result as deprecated since `since`.
    fn deprecated(self, since: u32) -> WithLifecycle<Self>
    where
        Self: Sized,
    {
        self.with_lifecycle(Lifecycle::deprecated(since))
    }

    /// Erase the concrete codec type.
    fn boxed(self) -> BoxedCodec<A>
    where
        Self: Sized + Send + Sync + 'static,
        A: 'static,
    {
        BoxedCodec::new(self)
    }

    /// A tagged union keyed by this codec under `"type"`.
    ///
    /// `getter` extracts the tag from a value, and `selector` picks the map
    /// codec for a tag's payload.
    fn dispatch<V, G, S, C>(
        self,
        getter: G,
        selector: S,
    ) -> MapCodecCodec<KeyDispatchCodec<A, V, Self, G, S>>
    where
        Self: Sized,
        G: Fn(&V) -> DataResult<A>,
        S: Fn(&A) -> DataResult<C>,
        C: MapCodec<V>,
    {
        self.dispatch_map("type", getter, selector).codec()
    }

    /// A tagged union keyed by this codec under `type_key`, as a map codec.
    fn dispatch_map<V, G, S, C>(
        self,
        type_key: impl Into<Cow<'static, str>>,
        getter: G,
        selector: S,
    ) -> KeyDispatchCodec<A, V, Self, G, S>
    where
        Self: Sized,
        G: Fn(&V) -> DataResult<A>,
        S: Fn(&A) -> DataResult<C>,
        C: MapCodec<V>,
    {
        KeyDispatchCodec::new(type_key, self, getter, selector)
    }
}

impl<A, C: Codec<A> + ?Sized> Codec<A> for &C {
    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        (**self).encode(input, ops, prefix)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(A, O::Value)> {
        (**self).decode(ops, input)
    }
}

impl<A, C: Codec<A> + ?Sized> Codec<A> for Arc<C> {
    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        (**self).encode(input, ops, prefix)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(A, O::Value)> {
        (**self).decode(ops, input)
    }
}

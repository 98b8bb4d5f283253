//! Mapping a codec onto another type.

use core::marker::PhantomData;
use dynops_core::{DataResult, DynamicOps};

use crate::Codec;

macro_rules! mapped_codec {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<C, A, F, G> {
            codec: C,
            to: F,
            from: G,
            _marker: PhantomData<fn() -> A>,
        }

        impl<C, A, F, G> $name<C, A, F, G> {
            pub(crate) fn new(codec: C, to: F, from: G) -> Self {
                Self {
                    codec,
                    to,
                    from,
                    _marker: PhantomData,
                }
            }
        }

        impl<C: Clone, A, F: Clone, G: Clone> Clone for $name<C, A, F, G> {
            fn clone(&self) -> Self {
                Self::new(self.codec.clone(), self.to.clone(), self.from.clone())
            }
        }
    };
}

mapped_codec! {
    /// See [`Codec::xmap`].
    Xmap
}

mapped_codec! {
    /// See [`Codec::comap_flat_map`].
    ComapFlatMap
}

mapped_codec! {
    /// See [`Codec::flat_comap_map`].
    FlatComapMap
}

mapped_codec! {
    /// See [`Codec::flat_xmap`].
    FlatXmap
}

impl<A, B, C, F, G> Codec<B> for Xmap<C, A, F, G>
where
    C: Codec<A>,
    F: Fn(A) -> B,
    G: Fn(&B) -> A,
{
    fn encode<O: DynamicOps>(&self, input: &B, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        self.codec.encode(&(self.from)(input), ops, prefix)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.codec
            .decode(ops, input)
            .map(|(value, rest)| ((self.to)(value), rest))
    }
}

impl<A, B, C, F, G> Codec<B> for ComapFlatMap<C, A, F, G>
where
    C: Codec<A>,
    F: Fn(A) -> DataResult<B>,
    G: Fn(&B) -> A,
{
    fn encode<O: DynamicOps>(&self, input: &B, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        self.codec.encode(&(self.from)(input), ops, prefix)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.codec
            .decode(ops, input)
            .flat_map(|(value, rest)| (self.to)(value).map(|value| (value, rest)))
    }
}

impl<A, B, C, F, G> Codec<B> for FlatComapMap<C, A, F, G>
where
    C: Codec<A>,
    F: Fn(A) -> B,
    G: Fn(&B) -> DataResult<A>,
{
    fn encode<O: DynamicOps>(&self, input: &B, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        (self.from)(input).flat_map(|value| self.codec.encode(&value, ops, prefix))
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.codec
            .decode(ops, input)
            .map(|(value, rest)| ((self.to)(value), rest))
    }
}

impl<A, B, C, F, G> Codec<B> for FlatXmap<C, A, F, G>
where
    C: Codec<A>,
    F: Fn(A) -> DataResult<B>,
    G: Fn(&B) -> DataResult<A>,
{
    fn encode<O: DynamicOps>(&self, input: &B, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        (self.from)(input).flat_map(|value| self.codec.encode(&value, ops, prefix))
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.codec
            .decode(ops, input)
            .flat_map(|(value, rest)| (self.to)(value).map(|value| (value, rest)))
    }
}

//! Type-erased codecs.
//!
//! [`Codec`] and [`MapCodec`] are generic over the backend, so they cannot
//! be trait objects directly. The boxed forms run the erased codec against
//! an [`ErasedOps`] that forwards to the caller's backend, so a boxed codec
//! reads and writes exactly like the codec it wraps.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use dynops_core::{DataResult, DynamicOps, MapLike, RecordBuilder};

use crate::erased::{ErasedMap, ErasedOps, ErasedValue, Forward, foreign_message};
use crate::tracing_macros::debug;
use crate::{Codec, MapCodec};

pub(crate) trait ErasedCodec<A>: Send + Sync {
    fn encode_erased(
        &self,
        input: &A,
        ops: &ErasedOps<'_>,
        prefix: ErasedValue,
    ) -> DataResult<ErasedValue>;

    fn decode_erased(&self, ops: &ErasedOps<'_>, input: &ErasedValue) -> DataResult<(A, ErasedValue)>;
}

pub(crate) struct Erased<C>(pub(crate) C);

impl<A, C> ErasedCodec<A> for Erased<C>
where
    C: Codec<A> + Send + Sync,
{
    fn encode_erased(
        &self,
        input: &A,
        ops: &ErasedOps<'_>,
        prefix: ErasedValue,
    ) -> DataResult<ErasedValue> {
        self.0.encode(input, ops, prefix)
    }

    fn decode_erased(&self, ops: &ErasedOps<'_>, input: &ErasedValue) -> DataResult<(A, ErasedValue)> {
        self.0.decode(ops, input)
    }
}

/// A [`Codec`] with its concrete type erased. Created by [`Codec::boxed`].
///
/// Cloning shares the underlying codec.
pub struct BoxedCodec<A>(pub(crate) Arc<dyn ErasedCodec<A>>);

impl<A> BoxedCodec<A> {
    pub(crate) fn new<C>(codec: C) -> Self
    where
        C: Codec<A> + Send + Sync + 'static,
        A: 'static,
    {
        Self(Arc::new(Erased(codec)))
    }
}

impl<A> Clone for BoxedCodec<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A> fmt::Debug for BoxedCodec<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxedCodec")
    }
}

impl<A> Codec<A> for BoxedCodec<A> {
    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        let forward = Forward::new(ops);
        self.0
            .encode_erased(input, &ErasedOps::new(&forward), ErasedValue::new(prefix))
            .flat_map(ErasedValue::restore)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(A, O::Value)> {
        let forward = Forward::new(ops);
        self.0
            .decode_erased(&ErasedOps::new(&forward), &ErasedValue::new(input.clone()))
            .flat_map(|(value, rest)| rest.restore().map(|rest| (value, rest)))
    }
}

trait ErasedMapCodec<A>: Send + Sync {
    fn keys_erased(&self, ops: &ErasedOps<'_>) -> Vec<ErasedValue>;

    fn decode_erased(&self, ops: &ErasedOps<'_>, input: &dyn MapLike<ErasedValue>) -> DataResult<A>;

    fn encode_erased(&self, input: &A, builder: &mut RecordBuilder<'_, ErasedOps<'_>>);
}

struct ErasedMapCodecImpl<M>(M);

impl<A, M> ErasedMapCodec<A> for ErasedMapCodecImpl<M>
where
    M: MapCodec<A> + Send + Sync,
{
    fn keys_erased(&self, ops: &ErasedOps<'_>) -> Vec<ErasedValue> {
        self.0.keys(ops)
    }

    fn decode_erased(&self, ops: &ErasedOps<'_>, input: &dyn MapLike<ErasedValue>) -> DataResult<A> {
        self.0.decode(ops, input)
    }

    fn encode_erased(&self, input: &A, builder: &mut RecordBuilder<'_, ErasedOps<'_>>) {
        let ops = builder.ops();
        self.0.encode(input, ops, builder)
    }
}

/// A [`MapCodec`] with its concrete type erased. Created by
/// [`MapCodec::boxed`].
///
/// This is how a dispatch selector returns different payload codecs for
/// different tags.
pub struct BoxedMapCodec<A>(Arc<dyn ErasedMapCodec<A>>);

impl<A> BoxedMapCodec<A> {
    pub(crate) fn new<M>(codec: M) -> Self
    where
        M: MapCodec<A> + Send + Sync + 'static,
        A: 'static,
    {
        Self(Arc::new(ErasedMapCodecImpl(codec)))
    }
}

impl<A> Clone for BoxedMapCodec<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A> fmt::Debug for BoxedMapCodec<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxedMapCodec")
    }
}

impl<A> MapCodec<A> for BoxedMapCodec<A> {
    fn keys<O: DynamicOps>(&self, ops: &O) -> Vec<O::Value> {
        let forward = Forward::new(ops);
        self.0
            .keys_erased(&ErasedOps::new(&forward))
            .into_iter()
            .filter_map(ErasedValue::into_inner::<O::Value>)
            .collect()
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &dyn MapLike<O::Value>) -> DataResult<A> {
        let forward = Forward::new(ops);
        self.0
            .decode_erased(&ErasedOps::new(&forward), &ErasedMap::borrowed(input))
    }

    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, builder: &mut RecordBuilder<'_, O>) {
        let forward = Forward::new(ops);
        let erased = ErasedOps::new(&forward);
        let mut inner = RecordBuilder::new(&erased);
        self.0.encode_erased(input, &mut inner);
        let (entries, errors, lifecycle) = inner.into_parts();
        for (key, value) in entries {
            match (key.into_inner::<O::Value>(), value.into_inner::<O::Value>()) {
                (Some(key), Some(value)) => {
                    builder.add(key, value);
                }
                _ => {
                    debug!("boxed map codec: dropping an entry of another backend");
                    builder.add_error(foreign_message());
                }
            }
        }
        if let Some(errors) = errors {
            builder.add_error(errors);
        }
        builder.add_lifecycle(lifecycle);
    }
}

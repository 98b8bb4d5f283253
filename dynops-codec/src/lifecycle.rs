use dynops_core::{DataResult, DynamicOps, Lifecycle};

use crate::Codec;

/// A codec whose results always carry a fixed [`Lifecycle`]. Created by
/// [`Codec::with_lifecycle`], [`Codec::stable`] and [`Codec::deprecated`].
#[derive(Clone, Debug)]
pub struct WithLifecycle<C> {
    codec: C,
    lifecycle: Lifecycle,
}

impl<C> WithLifecycle<C> {
    pub(crate) fn new(codec: C, lifecycle: Lifecycle) -> Self {
        Self { codec, lifecycle }
    }
}

impl<A, C: Codec<A>> Codec<A> for WithLifecycle<C> {
    fn encode<O: DynamicOps>(&self, input: &A, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        self.codec
            .encode(input, ops, prefix)
            .set_lifecycle(self.lifecycle)
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(A, O::Value)> {
        self.codec.decode(ops, input).set_lifecycle(self.lifecycle)
    }
}

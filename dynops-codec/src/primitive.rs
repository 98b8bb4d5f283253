//! Codecs for the primitive kinds every backend understands.

use core::fmt;
use core::marker::PhantomData;

use bytes::Bytes;
use dynops_core::{DataResult, DynamicOps};

use crate::Codec;

/// A value a backend stores natively.
pub trait Primitive: Sized {
    /// Read the value out of `input`.
    fn read<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Self>;

    /// Create the backend value.
    fn write<O: DynamicOps>(&self, ops: &O) -> O::Value;
}

impl Primitive for bool {
    fn read<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Self> {
        ops.get_bool_value(input)
    }

    fn write<O: DynamicOps>(&self, ops: &O) -> O::Value {
        ops.create_bool(*self)
    }
}

macro_rules! numeric_primitive {
    ($($ty:ty => $narrow:ident, $create:ident;)*) => {
        $(
            impl Primitive for $ty {
                fn read<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Self> {
                    ops.get_number_value(input).map(|n| n.$narrow())
                }

                fn write<O: DynamicOps>(&self, ops: &O) -> O::Value {
                    ops.$create(*self)
                }
            }
        )*
    };
}

numeric_primitive! {
    i8 => as_i8, create_byte;
    i16 => as_i16, create_short;
    i32 => as_i32, create_int;
    i64 => as_i64, create_long;
    f32 => as_f32, create_float;
    f64 => as_f64, create_double;
}

impl Primitive for String {
    fn read<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Self> {
        ops.get_string_value(input)
    }

    fn write<O: DynamicOps>(&self, ops: &O) -> O::Value {
        ops.create_string(self)
    }
}

impl Primitive for Bytes {
    fn read<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Self> {
        ops.get_byte_buffer(input)
    }

    fn write<O: DynamicOps>(&self, ops: &O) -> O::Value {
        ops.create_byte_list(self.clone())
    }
}

impl Primitive for Vec<i32> {
    fn read<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Self> {
        ops.get_int_stream(input)
    }

    fn write<O: DynamicOps>(&self, ops: &O) -> O::Value {
        ops.create_int_list(self.clone())
    }
}

impl Primitive for Vec<i64> {
    fn read<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Self> {
        ops.get_long_stream(input)
    }

    fn write<O: DynamicOps>(&self, ops: &O) -> O::Value {
        ops.create_long_list(self.clone())
    }
}

/// The codec of a [`Primitive`]. Decoding leaves `ops.empty()` behind.
pub struct PrimitiveCodec<T>(PhantomData<fn() -> T>);

impl<T> PrimitiveCodec<T> {
    /// The codec for `T`.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for PrimitiveCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PrimitiveCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PrimitiveCodec<T> {}

impl<T> fmt::Debug for PrimitiveCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimitiveCodec<{}>", core::any::type_name::<T>())
    }
}

impl<T: Primitive> Codec<T> for PrimitiveCodec<T> {
    fn encode<O: DynamicOps>(&self, input: &T, ops: &O, prefix: O::Value) -> DataResult<O::Value> {
        ops.merge_to_primitive(&prefix, input.write(ops))
    }

    fn decode<O: DynamicOps>(&self, ops: &O, input: &O::Value) -> DataResult<(T, O::Value)> {
        T::read(ops, input).map(|value| (value, ops.empty()))
    }
}

/// Booleans.
pub const BOOL: PrimitiveCodec<bool> = PrimitiveCodec::new();
/// 8-bit integers.
pub const BYTE: PrimitiveCodec<i8> = PrimitiveCodec::new();
/// 16-bit integers.
pub const SHORT: PrimitiveCodec<i16> = PrimitiveCodec::new();
/// 32-bit integers.
pub const INT: PrimitiveCodec<i32> = PrimitiveCodec::new();
/// 64-bit integers.
pub const LONG: PrimitiveCodec<i64> = PrimitiveCodec::new();
/// 32-bit floats.
pub const FLOAT: PrimitiveCodec<f32> = PrimitiveCodec::new();
/// 64-bit floats.
pub const DOUBLE: PrimitiveCodec<f64> = PrimitiveCodec::new();
/// Strings.
pub const STRING: PrimitiveCodec<String> = PrimitiveCodec::new();
/// Byte lists, through the backend's specialized path.
pub const BYTE_BUFFER: PrimitiveCodec<Bytes> = PrimitiveCodec::new();
/// Int lists, through the backend's specialized path.
pub const INT_STREAM: PrimitiveCodec<Vec<i32>> = PrimitiveCodec::new();
/// Long lists, through the backend's specialized path.
pub const LONG_STREAM: PrimitiveCodec<Vec<i64>> = PrimitiveCodec::new();

fn check_range<N>(min: N, max: N) -> impl Fn(N) -> DataResult<N> + Copy + Send + Sync + 'static
where
    N: PartialOrd + fmt::Display + Copy + Send + Sync + 'static,
{
    move |value: N| {
        if value >= min && value <= max {
            DataResult::success(value)
        } else {
            DataResult::error(move || format!("Value {value} outside of range [{min}:{max}]"))
        }
    }
}

macro_rules! range_codec {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $base:expr) => {
        $(#[$meta])*
        pub fn $name(min: $ty, max: $ty) -> impl Codec<$ty> + Clone + Send + Sync + 'static {
            let check = check_range(min, max);
            $base.flat_xmap(check, move |value: &$ty| check(*value))
        }
    };
}

range_codec! {
    /// Ints within `[min, max]`, checked in both directions.
    int_range, i32, INT
}

range_codec! {
    /// Floats within `[min, max]`, checked in both directions.
    float_range, f32, FLOAT
}

range_codec! {
    /// Doubles within `[min, max]`, checked in both directions.
    double_range, f64, DOUBLE
}

/// Values stored by name, such as enum variants.
///
/// `from_name` returning `None` fails the decode with
/// `Unknown element name: {name}`.
pub fn string_resolver<A, T, F>(to_name: T, from_name: F) -> impl Codec<A> + Clone + Send + Sync + 'static
where
    T: Fn(&A) -> String + Clone + Send + Sync + 'static,
    F: Fn(&str) -> Option<A> + Clone + Send + Sync + 'static,
{
    STRING.comap_flat_map(
        move |name: String| {
            let value = from_name(&name);
            DataResult::from_option(value, move || format!("Unknown element name: {name}"))
        },
        to_name,
    )
}

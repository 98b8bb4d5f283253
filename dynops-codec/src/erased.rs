//! A [`DynamicOps`] that forwards every operation to another backend
//! through a trait object.
//!
//! Boxed codecs cannot be generic over the backend, so they run against
//! [`ErasedOps`] instead. Values travel as [`ErasedValue`], which owns the
//! caller's own tree value, and come back out unchanged. Reading, writing,
//! merging and error rendering all stay with the caller's ops.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use bytes::Bytes;
use dynops_core::{
    DataResult, DynamicOps, EntryIter, Lifecycle, MapLike, Message, Number, PushList, PushMap,
    ValueIter,
};
use dynops_value::{Value, ValueOps};

use crate::tracing_macros::debug;

trait AnyValue: Any + fmt::Debug + Send + Sync {
    fn clone_box(&self) -> Box<dyn AnyValue>;

    fn eq_dyn(&self, other: &dyn AnyValue) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> AnyValue for T
where
    T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn clone_box(&self) -> Box<dyn AnyValue> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn AnyValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A backend value with its type erased.
///
/// Equality and `Debug` are those of the wrapped value, so messages and
/// lookups read exactly as they would without the wrapper.
pub(crate) struct ErasedValue(Box<dyn AnyValue>);

impl ErasedValue {
    pub(crate) fn new<T>(value: T) -> Self
    where
        T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
    {
        Self(Box::new(value))
    }

    fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        (*self.0).as_any().downcast_ref::<T>()
    }

    /// Unwrap the backend value, if it has type `T`.
    pub(crate) fn into_inner<T: 'static>(self) -> Option<T> {
        self.0.into_any().downcast::<T>().ok().map(|value| *value)
    }

    /// Like [`into_inner`](Self::into_inner), as a result.
    pub(crate) fn restore<T: 'static>(self) -> DataResult<T> {
        match self.into_inner() {
            Some(value) => DataResult::success(value),
            None => foreign(),
        }
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        Self((*self.0).clone_box())
    }
}

impl PartialEq for ErasedValue {
    fn eq(&self, other: &Self) -> bool {
        (*self.0).eq_dyn(&*other.0)
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

pub(crate) fn foreign_message() -> Message {
    Message::from("Value belongs to a different backend")
}

fn foreign<R>() -> DataResult<R> {
    debug!("erased ops: value of an unexpected backend type");
    DataResult::error_with(foreign_message(), None, Lifecycle::Stable)
}

/// The object-safe face of a backend. Mirrors [`DynamicOps`] with every
/// value erased and every generic argument collected.
pub(crate) trait ObjectOps {
    fn empty(&self) -> ErasedValue;

    fn empty_map(&self) -> ErasedValue;

    fn empty_list(&self) -> ErasedValue;

    fn is_empty_value(&self, value: &ErasedValue) -> bool;

    fn to_reference(&self, value: &ErasedValue) -> Value;

    fn get_number_value(&self, input: &ErasedValue) -> DataResult<Number>;

    fn create_numeric(&self, number: Number) -> ErasedValue;

    fn create_byte(&self, value: i8) -> ErasedValue;

    fn create_short(&self, value: i16) -> ErasedValue;

    fn create_int(&self, value: i32) -> ErasedValue;

    fn create_long(&self, value: i64) -> ErasedValue;

    fn create_float(&self, value: f32) -> ErasedValue;

    fn create_double(&self, value: f64) -> ErasedValue;

    fn get_bool_value(&self, input: &ErasedValue) -> DataResult<bool>;

    fn create_bool(&self, value: bool) -> ErasedValue;

    fn get_string_value(&self, input: &ErasedValue) -> DataResult<String>;

    fn create_string(&self, value: &str) -> ErasedValue;

    fn get_stream<'a>(&'a self, input: &'a ErasedValue) -> DataResult<ValueIter<'a, ErasedValue>>;

    fn create_list(&self, items: Vec<ErasedValue>) -> ErasedValue;

    fn get_list<'a>(&'a self, input: &'a ErasedValue) -> DataResult<PushList<'a, ErasedValue>>;

    fn create_byte_list(&self, bytes: Bytes) -> ErasedValue;

    fn get_byte_buffer(&self, input: &ErasedValue) -> DataResult<Bytes>;

    fn create_int_list(&self, values: Vec<i32>) -> ErasedValue;

    fn get_int_stream(&self, input: &ErasedValue) -> DataResult<Vec<i32>>;

    fn create_long_list(&self, values: Vec<i64>) -> ErasedValue;

    fn get_long_stream(&self, input: &ErasedValue) -> DataResult<Vec<i64>>;

    fn create_map(&self, entries: Vec<(ErasedValue, ErasedValue)>) -> ErasedValue;

    fn get_map_values<'a>(
        &'a self,
        input: &'a ErasedValue,
    ) -> DataResult<EntryIter<'a, ErasedValue>>;

    fn get_map_entries<'a>(
        &'a self,
        input: &'a ErasedValue,
    ) -> DataResult<PushMap<'a, ErasedValue>>;

    fn get_map<'a>(
        &'a self,
        input: &'a ErasedValue,
    ) -> DataResult<Box<dyn MapLike<ErasedValue> + 'a>>;

    fn merge_to_list(&self, list: &ErasedValue, value: ErasedValue) -> DataResult<ErasedValue>;

    fn merge_to_list_many(
        &self,
        list: &ErasedValue,
        values: Vec<ErasedValue>,
    ) -> DataResult<ErasedValue>;

    fn merge_to_map(
        &self,
        map: &ErasedValue,
        key: ErasedValue,
        value: ErasedValue,
    ) -> DataResult<ErasedValue>;

    fn merge_to_map_many(
        &self,
        map: &ErasedValue,
        entries: Vec<(ErasedValue, ErasedValue)>,
    ) -> DataResult<ErasedValue>;

    fn merge_to_map_like(
        &self,
        map: &ErasedValue,
        values: &dyn MapLike<ErasedValue>,
    ) -> DataResult<ErasedValue>;

    fn merge_to_primitive(
        &self,
        prefix: &ErasedValue,
        value: ErasedValue,
    ) -> DataResult<ErasedValue>;

    fn get(&self, input: &ErasedValue, key: &str) -> DataResult<ErasedValue>;

    fn set(&self, input: &ErasedValue, key: &str, value: ErasedValue) -> ErasedValue;

    fn remove(&self, input: &ErasedValue, key: &str) -> ErasedValue;
}

/// Hands every [`ObjectOps`] call to a concrete backend.
pub(crate) struct Forward<'o, O> {
    ops: &'o O,
}

impl<'o, O: DynamicOps> Forward<'o, O> {
    pub(crate) fn new(ops: &'o O) -> Self {
        Self { ops }
    }

    fn open<'v>(&self, value: &'v ErasedValue) -> DataResult<&'v O::Value> {
        match value.downcast_ref::<O::Value>() {
            Some(value) => DataResult::success(value),
            None => foreign(),
        }
    }

    fn open_all(values: Vec<ErasedValue>) -> Option<Vec<O::Value>> {
        values.into_iter().map(ErasedValue::into_inner).collect()
    }

    fn open_entries(entries: Vec<(ErasedValue, ErasedValue)>) -> Option<Vec<(O::Value, O::Value)>> {
        entries
            .into_iter()
            .map(|(k, v)| Some((k.into_inner()?, v.into_inner()?)))
            .collect()
    }
}

impl<O: DynamicOps> ObjectOps for Forward<'_, O> {
    fn empty(&self) -> ErasedValue {
        ErasedValue::new(self.ops.empty())
    }

    fn empty_map(&self) -> ErasedValue {
        ErasedValue::new(self.ops.empty_map())
    }

    fn empty_list(&self) -> ErasedValue {
        ErasedValue::new(self.ops.empty_list())
    }

    fn is_empty_value(&self, value: &ErasedValue) -> bool {
        value
            .downcast_ref::<O::Value>()
            .is_some_and(|value| self.ops.is_empty_value(value))
    }

    fn to_reference(&self, value: &ErasedValue) -> Value {
        match value.downcast_ref::<O::Value>() {
            Some(value) => self.ops.convert_to(&ValueOps, value),
            None => Value::Empty,
        }
    }

    fn get_number_value(&self, input: &ErasedValue) -> DataResult<Number> {
        self.open(input).flat_map(|input| self.ops.get_number_value(input))
    }

    fn create_numeric(&self, number: Number) -> ErasedValue {
        ErasedValue::new(self.ops.create_numeric(number))
    }

    fn create_byte(&self, value: i8) -> ErasedValue {
        ErasedValue::new(self.ops.create_byte(value))
    }

    fn create_short(&self, value: i16) -> ErasedValue {
        ErasedValue::new(self.ops.create_short(value))
    }

    fn create_int(&self, value: i32) -> ErasedValue {
        ErasedValue::new(self.ops.create_int(value))
    }

    fn create_long(&self, value: i64) -> ErasedValue {
        ErasedValue::new(self.ops.create_long(value))
    }

    fn create_float(&self, value: f32) -> ErasedValue {
        ErasedValue::new(self.ops.create_float(value))
    }

    fn create_double(&self, value: f64) -> ErasedValue {
        ErasedValue::new(self.ops.create_double(value))
    }

    fn get_bool_value(&self, input: &ErasedValue) -> DataResult<bool> {
        self.open(input).flat_map(|input| self.ops.get_bool_value(input))
    }

    fn create_bool(&self, value: bool) -> ErasedValue {
        ErasedValue::new(self.ops.create_bool(value))
    }

    fn get_string_value(&self, input: &ErasedValue) -> DataResult<String> {
        self.open(input).flat_map(|input| self.ops.get_string_value(input))
    }

    fn create_string(&self, value: &str) -> ErasedValue {
        ErasedValue::new(self.ops.create_string(value))
    }

    fn get_stream<'a>(&'a self, input: &'a ErasedValue) -> DataResult<ValueIter<'a, ErasedValue>> {
        self.open(input).flat_map(|input| {
            self.ops.get_stream(input).map(|items| {
                let items: ValueIter<'a, ErasedValue> = Box::new(items.map(ErasedValue::new));
                items
            })
        })
    }

    fn create_list(&self, items: Vec<ErasedValue>) -> ErasedValue {
        let items = items.into_iter().filter_map(ErasedValue::into_inner::<O::Value>);
        ErasedValue::new(self.ops.create_list(items))
    }

    fn get_list<'a>(&'a self, input: &'a ErasedValue) -> DataResult<PushList<'a, ErasedValue>> {
        self.open(input).flat_map(|input| {
            self.ops.get_list(input).map(|push| {
                let list: PushList<'a, ErasedValue> =
                    Box::new(move |sink: &mut dyn FnMut(ErasedValue)| {
                        push(&mut |item: O::Value| sink(ErasedValue::new(item)))
                    });
                list
            })
        })
    }

    fn create_byte_list(&self, bytes: Bytes) -> ErasedValue {
        ErasedValue::new(self.ops.create_byte_list(bytes))
    }

    fn get_byte_buffer(&self, input: &ErasedValue) -> DataResult<Bytes> {
        self.open(input).flat_map(|input| self.ops.get_byte_buffer(input))
    }

    fn create_int_list(&self, values: Vec<i32>) -> ErasedValue {
        ErasedValue::new(self.ops.create_int_list(values))
    }

    fn get_int_stream(&self, input: &ErasedValue) -> DataResult<Vec<i32>> {
        self.open(input).flat_map(|input| self.ops.get_int_stream(input))
    }

    fn create_long_list(&self, values: Vec<i64>) -> ErasedValue {
        ErasedValue::new(self.ops.create_long_list(values))
    }

    fn get_long_stream(&self, input: &ErasedValue) -> DataResult<Vec<i64>> {
        self.open(input).flat_map(|input| self.ops.get_long_stream(input))
    }

    fn create_map(&self, entries: Vec<(ErasedValue, ErasedValue)>) -> ErasedValue {
        let entries = entries
            .into_iter()
            .filter_map(|(k, v)| Some((k.into_inner::<O::Value>()?, v.into_inner::<O::Value>()?)));
        ErasedValue::new(self.ops.create_map(entries))
    }

    fn get_map_values<'a>(
        &'a self,
        input: &'a ErasedValue,
    ) -> DataResult<EntryIter<'a, ErasedValue>> {
        self.open(input).flat_map(|input| {
            self.ops.get_map_values(input).map(|entries| {
                let entries: EntryIter<'a, ErasedValue> = Box::new(
                    entries.map(|(k, v)| (ErasedValue::new(k), ErasedValue::new(v))),
                );
                entries
            })
        })
    }

    fn get_map_entries<'a>(
        &'a self,
        input: &'a ErasedValue,
    ) -> DataResult<PushMap<'a, ErasedValue>> {
        self.open(input).flat_map(|input| {
            self.ops.get_map_entries(input).map(|push| {
                let map: PushMap<'a, ErasedValue> =
                    Box::new(move |sink: &mut dyn FnMut(ErasedValue, ErasedValue)| {
                        push(&mut |k: O::Value, v: O::Value| {
                            sink(ErasedValue::new(k), ErasedValue::new(v))
                        })
                    });
                map
            })
        })
    }

    fn get_map<'a>(
        &'a self,
        input: &'a ErasedValue,
    ) -> DataResult<Box<dyn MapLike<ErasedValue> + 'a>> {
        self.open(input).flat_map(|input| {
            self.ops.get_map(input).map(|map| {
                let map: Box<dyn MapLike<ErasedValue> + 'a> = Box::new(ErasedMap::owned(map));
                map
            })
        })
    }

    fn merge_to_list(&self, list: &ErasedValue, value: ErasedValue) -> DataResult<ErasedValue> {
        self.open(list).flat_map(|list| match value.into_inner() {
            Some(value) => self.ops.merge_to_list(list, value).map(ErasedValue::new),
            None => foreign(),
        })
    }

    fn merge_to_list_many(
        &self,
        list: &ErasedValue,
        values: Vec<ErasedValue>,
    ) -> DataResult<ErasedValue> {
        self.open(list).flat_map(|list| match Self::open_all(values) {
            Some(values) => self.ops.merge_to_list_many(list, values).map(ErasedValue::new),
            None => foreign(),
        })
    }

    fn merge_to_map(
        &self,
        map: &ErasedValue,
        key: ErasedValue,
        value: ErasedValue,
    ) -> DataResult<ErasedValue> {
        self.open(map)
            .flat_map(|map| match (key.into_inner(), value.into_inner()) {
                (Some(key), Some(value)) => {
                    self.ops.merge_to_map(map, key, value).map(ErasedValue::new)
                }
                _ => foreign(),
            })
    }

    fn merge_to_map_many(
        &self,
        map: &ErasedValue,
        entries: Vec<(ErasedValue, ErasedValue)>,
    ) -> DataResult<ErasedValue> {
        self.open(map).flat_map(|map| match Self::open_entries(entries) {
            Some(entries) => self.ops.merge_to_map_many(map, entries).map(ErasedValue::new),
            None => foreign(),
        })
    }

    fn merge_to_map_like(
        &self,
        map: &ErasedValue,
        values: &dyn MapLike<ErasedValue>,
    ) -> DataResult<ErasedValue> {
        self.open(map).flat_map(|map| {
            self.ops
                .merge_to_map_like(map, &RestoredMap(values))
                .map(ErasedValue::new)
        })
    }

    fn merge_to_primitive(
        &self,
        prefix: &ErasedValue,
        value: ErasedValue,
    ) -> DataResult<ErasedValue> {
        self.open(prefix).flat_map(|prefix| match value.into_inner() {
            Some(value) => self.ops.merge_to_primitive(prefix, value).map(ErasedValue::new),
            None => foreign(),
        })
    }

    fn get(&self, input: &ErasedValue, key: &str) -> DataResult<ErasedValue> {
        self.open(input)
            .flat_map(|input| self.ops.get(input, key).map(ErasedValue::new))
    }

    fn set(&self, input: &ErasedValue, key: &str, value: ErasedValue) -> ErasedValue {
        match (input.downcast_ref::<O::Value>(), value.into_inner::<O::Value>()) {
            (Some(target), Some(value)) => ErasedValue::new(self.ops.set(target, key, value)),
            _ => input.clone(),
        }
    }

    fn remove(&self, input: &ErasedValue, key: &str) -> ErasedValue {
        match input.downcast_ref::<O::Value>() {
            Some(target) => ErasedValue::new(self.ops.remove(target, key)),
            None => input.clone(),
        }
    }
}

enum Source<'a, T> {
    Borrowed(&'a (dyn MapLike<T> + 'a)),
    Owned(Box<dyn MapLike<T> + 'a>),
}

/// A backend's [`MapLike`] seen through erased values. Lookups still use the
/// backend's own key comparison.
pub(crate) struct ErasedMap<'a, T> {
    source: Source<'a, T>,
}

impl<'a, T> ErasedMap<'a, T> {
    pub(crate) fn borrowed(map: &'a (dyn MapLike<T> + 'a)) -> Self {
        Self {
            source: Source::Borrowed(map),
        }
    }

    fn owned(map: Box<dyn MapLike<T> + 'a>) -> Self {
        Self {
            source: Source::Owned(map),
        }
    }

    fn map(&self) -> &(dyn MapLike<T> + 'a) {
        match &self.source {
            Source::Borrowed(map) => *map,
            Source::Owned(map) => &**map,
        }
    }
}

impl<T> MapLike<ErasedValue> for ErasedMap<'_, T>
where
    T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn get(&self, key: &ErasedValue) -> Option<ErasedValue> {
        key.downcast_ref::<T>()
            .and_then(|key| self.map().get(key))
            .map(ErasedValue::new)
    }

    fn get_str(&self, key: &str) -> Option<ErasedValue> {
        self.map().get_str(key).map(ErasedValue::new)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (ErasedValue, ErasedValue)> + '_> {
        Box::new(
            self.map()
                .entries()
                .map(|(k, v)| (ErasedValue::new(k), ErasedValue::new(v))),
        )
    }
}

/// The reverse of [`ErasedMap`]: an erased map handed back to a backend.
struct RestoredMap<'a>(&'a (dyn MapLike<ErasedValue> + 'a));

impl<T> MapLike<T> for RestoredMap<'_>
where
    T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn get(&self, key: &T) -> Option<T> {
        self.0
            .get(&ErasedValue::new(key.clone()))
            .and_then(ErasedValue::into_inner)
    }

    fn get_str(&self, key: &str) -> Option<T> {
        self.0.get_str(key).and_then(ErasedValue::into_inner)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (T, T)> + '_> {
        Box::new(
            self.0
                .entries()
                .filter_map(|(k, v)| Some((k.into_inner()?, v.into_inner()?))),
        )
    }
}

/// [`DynamicOps`] over [`ErasedValue`], backed by whatever [`ObjectOps`] it
/// was built from.
#[derive(Clone, Copy)]
pub(crate) struct ErasedOps<'a> {
    inner: &'a dyn ObjectOps,
}

impl<'a> ErasedOps<'a> {
    pub(crate) fn new(inner: &'a dyn ObjectOps) -> Self {
        Self { inner }
    }
}

impl DynamicOps for ErasedOps<'_> {
    type Value = ErasedValue;

    fn empty(&self) -> ErasedValue {
        self.inner.empty()
    }

    fn empty_map(&self) -> ErasedValue {
        self.inner.empty_map()
    }

    fn empty_list(&self) -> ErasedValue {
        self.inner.empty_list()
    }

    fn is_empty_value(&self, value: &ErasedValue) -> bool {
        self.inner.is_empty_value(value)
    }

    fn convert_to<U: DynamicOps>(&self, out: &U, input: &ErasedValue) -> U::Value {
        ValueOps.convert_to(out, &self.inner.to_reference(input))
    }

    fn get_number_value(&self, input: &ErasedValue) -> DataResult<Number> {
        self.inner.get_number_value(input)
    }

    fn create_numeric(&self, number: Number) -> ErasedValue {
        self.inner.create_numeric(number)
    }

    fn create_byte(&self, value: i8) -> ErasedValue {
        self.inner.create_byte(value)
    }

    fn create_short(&self, value: i16) -> ErasedValue {
        self.inner.create_short(value)
    }

    fn create_int(&self, value: i32) -> ErasedValue {
        self.inner.create_int(value)
    }

    fn create_long(&self, value: i64) -> ErasedValue {
        self.inner.create_long(value)
    }

    fn create_float(&self, value: f32) -> ErasedValue {
        self.inner.create_float(value)
    }

    fn create_double(&self, value: f64) -> ErasedValue {
        self.inner.create_double(value)
    }

    fn get_bool_value(&self, input: &ErasedValue) -> DataResult<bool> {
        self.inner.get_bool_value(input)
    }

    fn create_bool(&self, value: bool) -> ErasedValue {
        self.inner.create_bool(value)
    }

    fn get_string_value(&self, input: &ErasedValue) -> DataResult<String> {
        self.inner.get_string_value(input)
    }

    fn create_string(&self, value: &str) -> ErasedValue {
        self.inner.create_string(value)
    }

    fn get_stream<'b>(&'b self, input: &'b ErasedValue) -> DataResult<ValueIter<'b, ErasedValue>> {
        self.inner.get_stream(input)
    }

    fn create_list<I>(&self, items: I) -> ErasedValue
    where
        I: IntoIterator<Item = ErasedValue>,
    {
        self.inner.create_list(items.into_iter().collect())
    }

    fn get_list<'b>(&'b self, input: &'b ErasedValue) -> DataResult<PushList<'b, ErasedValue>> {
        self.inner.get_list(input)
    }

    fn create_byte_list(&self, bytes: Bytes) -> ErasedValue {
        self.inner.create_byte_list(bytes)
    }

    fn get_byte_buffer(&self, input: &ErasedValue) -> DataResult<Bytes> {
        self.inner.get_byte_buffer(input)
    }

    fn create_int_list(&self, values: Vec<i32>) -> ErasedValue {
        self.inner.create_int_list(values)
    }

    fn get_int_stream(&self, input: &ErasedValue) -> DataResult<Vec<i32>> {
        self.inner.get_int_stream(input)
    }

    fn create_long_list(&self, values: Vec<i64>) -> ErasedValue {
        self.inner.create_long_list(values)
    }

    fn get_long_stream(&self, input: &ErasedValue) -> DataResult<Vec<i64>> {
        self.inner.get_long_stream(input)
    }

    fn create_map<I>(&self, entries: I) -> ErasedValue
    where
        I: IntoIterator<Item = (ErasedValue, ErasedValue)>,
    {
        self.inner.create_map(entries.into_iter().collect())
    }

    fn get_map_values<'b>(
        &'b self,
        input: &'b ErasedValue,
    ) -> DataResult<EntryIter<'b, ErasedValue>> {
        self.inner.get_map_values(input)
    }

    fn get_map_entries<'b>(
        &'b self,
        input: &'b ErasedValue,
    ) -> DataResult<PushMap<'b, ErasedValue>> {
        self.inner.get_map_entries(input)
    }

    fn get_map<'b>(
        &'b self,
        input: &'b ErasedValue,
    ) -> DataResult<Box<dyn MapLike<ErasedValue> + 'b>> {
        self.inner.get_map(input)
    }

    fn merge_to_list(&self, list: &ErasedValue, value: ErasedValue) -> DataResult<ErasedValue> {
        self.inner.merge_to_list(list, value)
    }

    fn merge_to_list_many(
        &self,
        list: &ErasedValue,
        values: Vec<ErasedValue>,
    ) -> DataResult<ErasedValue> {
        self.inner.merge_to_list_many(list, values)
    }

    fn merge_to_map(
        &self,
        map: &ErasedValue,
        key: ErasedValue,
        value: ErasedValue,
    ) -> DataResult<ErasedValue> {
        self.inner.merge_to_map(map, key, value)
    }

    fn merge_to_map_many(
        &self,
        map: &ErasedValue,
        entries: Vec<(ErasedValue, ErasedValue)>,
    ) -> DataResult<ErasedValue> {
        self.inner.merge_to_map_many(map, entries)
    }

    fn merge_to_map_like(
        &self,
        map: &ErasedValue,
        values: &dyn MapLike<ErasedValue>,
    ) -> DataResult<ErasedValue> {
        self.inner.merge_to_map_like(map, values)
    }

    fn merge_to_primitive(
        &self,
        prefix: &ErasedValue,
        value: ErasedValue,
    ) -> DataResult<ErasedValue> {
        self.inner.merge_to_primitive(prefix, value)
    }

    fn get(&self, input: &ErasedValue, key: &str) -> DataResult<ErasedValue> {
        self.inner.get(input, key)
    }

    fn set(&self, input: &ErasedValue, key: &str, value: ErasedValue) -> ErasedValue {
        self.inner.set(input, key, value)
    }

    fn remove(&self, input: &ErasedValue, key: &str) -> ErasedValue {
        self.inner.remove(input, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynops_testhelpers::test;

    #[test]
    fn erased_values_compare_and_print_as_the_original() {
        let a = ErasedValue::new(Value::Long(1));
        assert_eq!(a, ErasedValue::new(Value::Long(1)));
        assert_ne!(a, ErasedValue::new(Value::Int(1)));
        assert_ne!(a, ErasedValue::new(1i64));
        assert_eq!(format!("{a:?}"), format!("{:?}", Value::Long(1)));
        assert_eq!(a.clone().into_inner::<Value>(), Some(Value::Long(1)));
        assert_eq!(a.into_inner::<i64>(), None);
    }

    #[test]
    fn operations_reach_the_wrapped_backend() {
        let forward = Forward::new(&ValueOps);
        let ops = ErasedOps::new(&forward);
        let list = ops.create_list([ops.create_int(1), ops.create_string("x")]);
        assert_eq!(
            list.clone().into_inner::<Value>(),
            Some(Value::list(vec![Value::Int(1), Value::from("x")]))
        );
        let merged = ops.merge_to_list(&list, ops.create_bool(true)).into_value().unwrap();
        assert_eq!(ops.get_stream(&merged).into_value().unwrap().count(), 3);
        assert_eq!(
            ops.get_string_value(&ops.create_int(3)).error_message(),
            ValueOps.get_string_value(&Value::Int(3)).error_message()
        );
    }

    #[test]
    fn maps_keep_the_backend_lookup() {
        let forward = Forward::new(&ValueOps);
        let ops = ErasedOps::new(&forward);
        let map = ops.create_map([
            (ops.create_string("a"), ops.create_int(1)),
            (ops.create_string("b"), ops.create_int(2)),
        ]);
        let view = ops.get_map(&map).into_value().unwrap();
        assert_eq!(view.get_str("b"), Some(ops.create_int(2)));
        assert_eq!(view.get(&ops.create_string("a")), Some(ops.create_int(1)));
        let copied = ops.merge_to_map_like(&ops.empty(), &*view).into_value().unwrap();
        assert_eq!(copied, map);
    }

    #[test]
    fn foreign_values_are_rejected() {
        let forward = Forward::new(&ValueOps);
        let ops = ErasedOps::new(&forward);
        let stray = ErasedValue::new(7u8);
        assert_eq!(
            ops.get_bool_value(&stray).error_message().as_deref(),
            Some("Value belongs to a different backend")
        );
        assert!(!ops.is_empty_value(&stray));
    }

    #[test]
    fn conversion_goes_through_the_reference_tree() {
        let forward = Forward::new(&ValueOps);
        let ops = ErasedOps::new(&forward);
        let bytes = ops.create_byte_list(Bytes::from_static(&[1, 2]));
        assert_eq!(
            ops.convert_to(&ValueOps, &bytes),
            Value::byte_list(vec![1u8, 2])
        );
    }
}

//! The format-abstraction contract.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use bytes::Bytes;
use core::fmt;

use crate::{DataResult, ListBuilder, MapLike, Number, RecordBuilder, VecMapLike};

/// Callback-driven iteration over the elements of a list.
///
/// Calling the function again walks the list again.
pub type PushList<'a, T> = Box<dyn Fn(&mut dyn FnMut(T)) + 'a>;

/// Callback-driven iteration over the entries of a map.
pub type PushMap<'a, T> = Box<dyn Fn(&mut dyn FnMut(T, T)) + 'a>;

/// A lazy sequence of list elements.
pub type ValueIter<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// A lazy sequence of map entries.
pub type EntryIter<'a, T> = Box<dyn Iterator<Item = (T, T)> + 'a>;

/// A stateless strategy for building and reading one tree representation.
///
/// Implementors own no data. Every operation is a pure function of its
/// arguments; compound values are only ever grown through the `merge_*`
/// primitives, so append semantics live in exactly one place per backend.
///
/// The contract for merges:
/// - if the target [`is_empty_value`](Self::is_empty_value), the result is a
///   fresh container holding the new content
/// - if the target is already a list/map, the result appends (lists) or
///   overwrites on key conflict (maps, last write wins)
/// - any other target is an error naming the expected shape
pub trait DynamicOps: Sized {
    /// The tree type this backend builds and reads.
    type Value: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// The canonical absent value.
    fn empty(&self) -> Self::Value;

    /// An empty map.
    fn empty_map(&self) -> Self::Value {
        self.create_map(core::iter::empty())
    }

    /// An empty list.
    fn empty_list(&self) -> Self::Value {
        self.create_list(core::iter::empty())
    }

    /// Structural comparison against [`empty`](Self::empty).
    fn is_empty_value(&self, value: &Self::Value) -> bool {
        *value == self.empty()
    }

    /// Copy `input` into another backend's tree, dispatching on its runtime
    /// shape. Specialized byte/int/long lists map onto the output's
    /// specialized constructors so numeric sub-kinds survive.
    ///
    /// # Panics
    ///
    /// Only for values the backend itself cannot describe, which is a
    /// backend bug rather than bad input.
    fn convert_to<U: DynamicOps>(&self, out: &U, input: &Self::Value) -> U::Value;

    // numbers

    /// Read a number.
    fn get_number_value(&self, input: &Self::Value) -> DataResult<Number>;

    /// Read a number, falling back to `default`.
    fn get_number_value_or(&self, input: &Self::Value, default: Number) -> Number {
        self.get_number_value(input).into_value().unwrap_or(default)
    }

    /// Create a number of the given sub-kind.
    fn create_numeric(&self, number: Number) -> Self::Value;

    /// Create a byte.
    fn create_byte(&self, value: i8) -> Self::Value {
        self.create_numeric(Number::Byte(value))
    }

    /// Create a short.
    fn create_short(&self, value: i16) -> Self::Value {
        self.create_numeric(Number::Short(value))
    }

    /// Create an int.
    fn create_int(&self, value: i32) -> Self::Value {
        self.create_numeric(Number::Int(value))
    }

    /// Create a long.
    fn create_long(&self, value: i64) -> Self::Value {
        self.create_numeric(Number::Long(value))
    }

    /// Create a float.
    fn create_float(&self, value: f32) -> Self::Value {
        self.create_numeric(Number::Float(value))
    }

    /// Create a double.
    fn create_double(&self, value: f64) -> Self::Value {
        self.create_numeric(Number::Double(value))
    }

    // booleans and strings

    /// Read a boolean.
    fn get_bool_value(&self, input: &Self::Value) -> DataResult<bool>;

    /// Create a boolean.
    fn create_bool(&self, value: bool) -> Self::Value;

    /// Read a string.
    fn get_string_value(&self, input: &Self::Value) -> DataResult<String>;

    /// Create a string.
    fn create_string(&self, value: &str) -> Self::Value;

    // lists

    /// Lazily iterate over the elements of a list.
    fn get_stream<'a>(&'a self, input: &'a Self::Value) -> DataResult<ValueIter<'a, Self::Value>>;

    /// Create a list.
    fn create_list<I>(&self, items: I) -> Self::Value
    where
        I: IntoIterator<Item = Self::Value>;

    /// Push-iterate over the elements of a list.
    fn get_list<'a>(&'a self, input: &'a Self::Value) -> DataResult<PushList<'a, Self::Value>> {
        self.get_stream(input).map(move |_| {
            let list: PushList<'a, Self::Value> = Box::new(move |sink: &mut dyn FnMut(Self::Value)| {
                if let Some(items) = self.get_stream(input).into_value() {
                    for item in items {
                        sink(item);
                    }
                }
            });
            list
        })
    }

    /// Create a byte list.
    fn create_byte_list(&self, bytes: Bytes) -> Self::Value {
        self.create_list(bytes.iter().map(|b| self.create_byte(*b as i8)))
    }

    /// Read a byte list.
    fn get_byte_buffer(&self, input: &Self::Value) -> DataResult<Bytes> {
        collect_bytes(self, input)
    }

    /// Create an int list.
    fn create_int_list(&self, values: Vec<i32>) -> Self::Value {
        self.create_list(values.into_iter().map(|v| self.create_int(v)))
    }

    /// Read an int list.
    fn get_int_stream(&self, input: &Self::Value) -> DataResult<Vec<i32>> {
        collect_ints(self, input)
    }

    /// Create a long list.
    fn create_long_list(&self, values: Vec<i64>) -> Self::Value {
        self.create_list(values.into_iter().map(|v| self.create_long(v)))
    }

    /// Read a long list.
    fn get_long_stream(&self, input: &Self::Value) -> DataResult<Vec<i64>> {
        collect_longs(self, input)
    }

    // maps

    /// Create a map. Duplicate keys resolve to the last occurrence.
    fn create_map<I>(&self, entries: I) -> Self::Value
    where
        I: IntoIterator<Item = (Self::Value, Self::Value)>;

    /// Lazily iterate over the entries of a map.
    fn get_map_values<'a>(&'a self, input: &'a Self::Value) -> DataResult<EntryIter<'a, Self::Value>>;

    /// Push-iterate over the entries of a map.
    fn get_map_entries<'a>(&'a self, input: &'a Self::Value) -> DataResult<PushMap<'a, Self::Value>> {
        self.get_map_values(input).map(move |_| {
            let map: PushMap<'a, Self::Value> =
                Box::new(move |sink: &mut dyn FnMut(Self::Value, Self::Value)| {
                    if let Some(entries) = self.get_map_values(input).into_value() {
                        for (k, v) in entries {
                            sink(k, v);
                        }
                    }
                });
            map
        })
    }

    /// A [`MapLike`] view of a map.
    ///
    /// The default collects the entries into a [`VecMapLike`].
    fn get_map<'a>(&'a self, input: &'a Self::Value) -> DataResult<Box<dyn MapLike<Self::Value> + 'a>> {
        self.get_map_values(input).map(move |entries| {
            let map: Box<dyn MapLike<Self::Value> + 'a> =
                Box::new(VecMapLike::new(self, entries.collect()));
            map
        })
    }

    // merges

    /// Append one element to a list.
    fn merge_to_list(&self, list: &Self::Value, value: Self::Value) -> DataResult<Self::Value>;

    /// Append several elements to a list.
    fn merge_to_list_many(&self, list: &Self::Value, values: Vec<Self::Value>) -> DataResult<Self::Value> {
        let base = if self.is_empty_value(list) {
            self.empty_list()
        } else {
            list.clone()
        };
        if values.is_empty() {
            return self.get_stream(&base).map(|_| base.clone());
        }
        let mut result = DataResult::success(base);
        for value in values {
            result = result.flat_map(|list| self.merge_to_list(&list, value));
        }
        result
    }

    /// Insert one entry into a map.
    fn merge_to_map(&self, map: &Self::Value, key: Self::Value, value: Self::Value) -> DataResult<Self::Value>;

    /// Insert several entries into a map.
    fn merge_to_map_many(
        &self,
        map: &Self::Value,
        entries: Vec<(Self::Value, Self::Value)>,
    ) -> DataResult<Self::Value> {
        let base = if self.is_empty_value(map) {
            self.empty_map()
        } else {
            map.clone()
        };
        if entries.is_empty() {
            return self.get_map_values(&base).map(|_| base.clone());
        }
        let mut result = DataResult::success(base);
        for (key, value) in entries {
            result = result.flat_map(|map| self.merge_to_map(&map, key, value));
        }
        result
    }

    /// Insert every entry of a [`MapLike`] into a map.
    fn merge_to_map_like(&self, map: &Self::Value, values: &dyn MapLike<Self::Value>) -> DataResult<Self::Value> {
        self.merge_to_map_many(map, values.entries().collect())
    }

    /// Place a primitive into a prefix, which only works if the prefix is
    /// still empty.
    fn merge_to_primitive(&self, prefix: &Self::Value, value: Self::Value) -> DataResult<Self::Value> {
        if self.is_empty_value(prefix) {
            return DataResult::success(value);
        }
        let prefix = prefix.clone();
        let shown = value.clone();
        DataResult::error_partial(
            move || format!("Do not know how to append a primitive value {shown:?} to {prefix:?}"),
            value,
        )
    }

    // field access

    /// Look up a string key in a map.
    fn get(&self, input: &Self::Value, key: &str) -> DataResult<Self::Value> {
        self.get_map(input).flat_map(|map| match map.get_str(key) {
            Some(value) => DataResult::success(value),
            None => {
                let key = key.to_string();
                let input = input.clone();
                DataResult::error(move || format!("No element {key} in the map {input:?}"))
            }
        })
    }

    /// Set a string key in a map. Non-maps come back unchanged.
    fn set(&self, input: &Self::Value, key: &str, value: Self::Value) -> Self::Value {
        self.merge_to_map(input, self.create_string(key), value)
            .into_value()
            .unwrap_or_else(|| input.clone())
    }

    /// Remove a string key from a map. Non-maps come back unchanged.
    fn remove(&self, input: &Self::Value, key: &str) -> Self::Value;

    // conversion helpers for `convert_to` implementations

    /// Convert a list element by element.
    fn convert_list<U: DynamicOps>(&self, out: &U, input: &Self::Value) -> U::Value {
        out.create_list(
            self.get_stream(input)
                .into_value()
                .into_iter()
                .flatten()
                .map(|item| self.convert_to(out, &item)),
        )
    }

    /// Convert a map entry by entry.
    fn convert_map<U: DynamicOps>(&self, out: &U, input: &Self::Value) -> U::Value {
        out.create_map(
            self.get_map_values(input)
                .into_value()
                .into_iter()
                .flatten()
                .map(|(k, v)| (self.convert_to(out, &k), self.convert_to(out, &v))),
        )
    }

    /// Start building a map.
    fn map_builder(&self) -> RecordBuilder<'_, Self> {
        RecordBuilder::new(self)
    }

    /// Start building a list.
    fn list_builder(&self) -> ListBuilder<'_, Self> {
        ListBuilder::new(self)
    }
}

fn collect_numbers<O, T>(
    ops: &O,
    input: &O::Value,
    what: &'static str,
    narrow: impl Fn(Number) -> T,
) -> DataResult<Vec<T>>
where
    O: DynamicOps,
{
    ops.get_stream(input).flat_map(|items| {
        let mut out = Vec::new();
        for item in items {
            match ops.get_number_value(&item).into_value() {
                Some(number) => out.push(narrow(number)),
                None => {
                    let input = input.clone();
                    return DataResult::error(move || {
                        format!("Some elements are not {what}: {input:?}")
                    });
                }
            }
        }
        DataResult::success(out)
    })
}

/// Read any list of numbers as bytes through the generic list path.
pub fn collect_bytes<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Bytes> {
    collect_numbers(ops, input, "bytes", |n| n.as_i8() as u8).map(Bytes::from)
}

/// Read any list of numbers as ints through the generic list path.
pub fn collect_ints<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Vec<i32>> {
    collect_numbers(ops, input, "ints", |n| n.as_i32())
}

/// Read any list of numbers as longs through the generic list path.
pub fn collect_longs<O: DynamicOps>(ops: &O, input: &O::Value) -> DataResult<Vec<i64>> {
    collect_numbers(ops, input, "longs", |n| n.as_i64())
}

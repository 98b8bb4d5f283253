//! [`DynamicOps`] over [`Value`].

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use bytes::Bytes;
use dynops_core::{
    DataResult, DynamicOps, EntryIter, MapLike, Number, ValueIter, collect_bytes, collect_ints,
    collect_longs,
};
use indexmap::IndexMap;

use crate::Value;

/// The reference backend.
///
/// Nothing is lost going through it: numeric sub-kinds and specialized lists
/// are stored as they were created, which makes `ValueOps` the intermediate
/// representation for moving data between other backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueOps;

fn mismatch<R>(expected: &'static str, input: &Value) -> DataResult<R> {
    let input = input.clone();
    DataResult::error(move || format!("Not a {expected}: {input}"))
}

struct ValueMapLike<'a>(&'a IndexMap<Value, Value>);

impl MapLike<Value> for ValueMapLike<'_> {
    fn get(&self, key: &Value) -> Option<Value> {
        self.0.get(key).cloned()
    }

    fn get_str(&self, key: &str) -> Option<Value> {
        self.0.get(&Value::from(key)).cloned()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (Value, Value)> + '_> {
        Box::new(self.0.iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}

impl DynamicOps for ValueOps {
    type Value = Value;

    fn empty(&self) -> Value {
        Value::Empty
    }

    fn convert_to<U: DynamicOps>(&self, out: &U, input: &Value) -> U::Value {
        match input {
            Value::Empty => out.empty(),
            Value::Bool(v) => out.create_bool(*v),
            Value::Byte(v) => out.create_byte(*v),
            Value::Short(v) => out.create_short(*v),
            Value::Int(v) => out.create_int(*v),
            Value::Long(v) => out.create_long(*v),
            Value::Float(v) => out.create_float(*v),
            Value::Double(v) => out.create_double(*v),
            Value::String(v) => out.create_string(v),
            Value::ByteList(v) => out.create_byte_list(v.clone()),
            Value::IntList(v) => out.create_int_list(v.to_vec()),
            Value::LongList(v) => out.create_long_list(v.to_vec()),
            Value::List(_) => self.convert_list(out, input),
            Value::Map(_) => self.convert_map(out, input),
        }
    }

    fn get_number_value(&self, input: &Value) -> DataResult<Number> {
        match input.as_number() {
            Some(n) => DataResult::success(n),
            None => mismatch("number", input),
        }
    }

    fn create_numeric(&self, number: Number) -> Value {
        Value::from(number)
    }

    fn get_bool_value(&self, input: &Value) -> DataResult<bool> {
        match input {
            Value::Bool(b) => DataResult::success(*b),
            _ => mismatch("boolean", input),
        }
    }

    fn create_bool(&self, value: bool) -> Value {
        Value::Bool(value)
    }

    fn get_string_value(&self, input: &Value) -> DataResult<String> {
        match input {
            Value::String(s) => DataResult::success(s.to_string()),
            _ => mismatch("string", input),
        }
    }

    fn create_string(&self, value: &str) -> Value {
        Value::from(value)
    }

    fn get_stream<'a>(&'a self, input: &'a Value) -> DataResult<ValueIter<'a, Value>> {
        let items: ValueIter<'a, Value> = match input {
            Value::List(items) => Box::new(items.iter().cloned()),
            Value::ByteList(bytes) => Box::new(bytes.iter().map(|b| Value::Byte(*b as i8))),
            Value::IntList(ints) => Box::new(ints.iter().copied().map(Value::Int)),
            Value::LongList(longs) => Box::new(longs.iter().copied().map(Value::Long)),
            _ => return mismatch("list", input),
        };
        DataResult::success(items)
    }

    fn create_list<I>(&self, items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        Value::list(items)
    }

    fn create_byte_list(&self, bytes: Bytes) -> Value {
        Value::ByteList(bytes)
    }

    fn get_byte_buffer(&self, input: &Value) -> DataResult<Bytes> {
        match input {
            Value::ByteList(bytes) => DataResult::success(bytes.clone()),
            _ => collect_bytes(self, input),
        }
    }

    fn create_int_list(&self, values: Vec<i32>) -> Value {
        Value::IntList(values.into())
    }

    fn get_int_stream(&self, input: &Value) -> DataResult<Vec<i32>> {
        match input {
            Value::IntList(ints) => DataResult::success(ints.to_vec()),
            _ => collect_ints(self, input),
        }
    }

    fn create_long_list(&self, values: Vec<i64>) -> Value {
        Value::LongList(values.into())
    }

    fn get_long_stream(&self, input: &Value) -> DataResult<Vec<i64>> {
        match input {
            Value::LongList(longs) => DataResult::success(longs.to_vec()),
            _ => collect_longs(self, input),
        }
    }

    fn create_map<I>(&self, entries: I) -> Value
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        Value::map(entries)
    }

    fn get_map_values<'a>(&'a self, input: &'a Value) -> DataResult<EntryIter<'a, Value>> {
        match input {
            Value::Map(map) => {
                let entries: EntryIter<'a, Value> =
                    Box::new(map.iter().map(|(k, v)| (k.clone(), v.clone())));
                DataResult::success(entries)
            }
            _ => mismatch("map", input),
        }
    }

    fn get_map<'a>(&'a self, input: &'a Value) -> DataResult<Box<dyn MapLike<Value> + 'a>> {
        match input {
            Value::Map(map) => {
                let view: Box<dyn MapLike<Value> + 'a> = Box::new(ValueMapLike(map));
                DataResult::success(view)
            }
            _ => mismatch("map", input),
        }
    }

    fn merge_to_list(&self, list: &Value, value: Value) -> DataResult<Value> {
        self.merge_to_list_many(list, alloc::vec![value])
    }

    fn merge_to_list_many(&self, list: &Value, values: Vec<Value>) -> DataResult<Value> {
        if self.is_empty_value(list) {
            return DataResult::success(Value::from(values));
        }
        match list.list_items() {
            Some(mut items) => {
                items.extend(values);
                DataResult::success(Value::from(items))
            }
            None => mismatch("list", list),
        }
    }

    fn merge_to_map(&self, map: &Value, key: Value, value: Value) -> DataResult<Value> {
        self.merge_to_map_many(map, alloc::vec![(key, value)])
    }

    fn merge_to_map_many(&self, map: &Value, entries: Vec<(Value, Value)>) -> DataResult<Value> {
        if self.is_empty_value(map) {
            return DataResult::success(Value::map(entries));
        }
        match map {
            Value::Map(existing) => {
                let mut merged = (**existing).clone();
                merged.extend(entries);
                DataResult::success(Value::from(merged))
            }
            _ => mismatch("map", map),
        }
    }

    fn remove(&self, input: &Value, key: &str) -> Value {
        match input {
            Value::Map(map) if map.contains_key(&Value::from(key)) => {
                let mut map = (**map).clone();
                map.shift_remove(&Value::from(key));
                Value::from(map)
            }
            _ => input.clone(),
        }
    }
}

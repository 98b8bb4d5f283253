//! [`DynamicOps`] over [`serde_json::Value`].

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use dynops_core::{DataResult, DynamicOps, EntryIter, MapLike, Number, ValueIter};
use serde_json::{Map, Value};

use crate::tracing_macros::{debug, trace};

/// The JSON backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonOps;

fn mismatch<R>(expected: &'static str, input: &Value) -> DataResult<R> {
    let input = input.clone();
    DataResult::error(move || format!("Not a {expected}: {input}"))
}

/// The string form of a map key.
fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

struct JsonMapLike<'a>(&'a Map<String, Value>);

impl MapLike<Value> for JsonMapLike<'_> {
    fn get(&self, key: &Value) -> Option<Value> {
        match key {
            Value::String(key) => self.0.get(key).cloned(),
            _ => None,
        }
    }

    fn get_str(&self, key: &str) -> Option<Value> {
        self.0.get(key).cloned()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (Value, Value)> + '_> {
        Box::new(
            self.0
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), v.clone())),
        )
    }
}

impl DynamicOps for JsonOps {
    type Value = Value;

    fn empty(&self) -> Value {
        Value::Null
    }

    fn convert_to<U: DynamicOps>(&self, out: &U, input: &Value) -> U::Value {
        match input {
            Value::Null => out.empty(),
            Value::Bool(v) => out.create_bool(*v),
            Value::Number(n) => match n.as_i64() {
                Some(i) => out.create_long(i),
                None => out.create_double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => out.create_string(s),
            Value::Array(_) => self.convert_list(out, input),
            Value::Object(_) => self.convert_map(out, input),
        }
    }

    fn get_number_value(&self, input: &Value) -> DataResult<Number> {
        match input {
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => DataResult::success(Number::Long(i)),
                (None, Some(f)) => DataResult::success(Number::Double(f)),
                (None, None) => mismatch("number", input),
            },
            Value::Bool(b) => DataResult::success(Number::Byte(i8::from(*b))),
            _ => mismatch("number", input),
        }
    }

    fn create_numeric(&self, number: Number) -> Value {
        match number {
            Number::Byte(v) => Value::from(v),
            Number::Short(v) => Value::from(v),
            Number::Int(v) => Value::from(v),
            Number::Long(v) => Value::from(v),
            Number::Float(v) => finite(f64::from(v)),
            Number::Double(v) => finite(v),
        }
    }

    fn get_bool_value(&self, input: &Value) -> DataResult<bool> {
        match input {
            Value::Bool(b) => DataResult::success(*b),
            Value::Number(n) => DataResult::success(n.as_f64().is_some_and(|f| f != 0.0)),
            _ => mismatch("boolean", input),
        }
    }

    fn create_bool(&self, value: bool) -> Value {
        Value::Bool(value)
    }

    fn get_string_value(&self, input: &Value) -> DataResult<String> {
        match input {
            Value::String(s) => DataResult::success(s.clone()),
            _ => mismatch("string", input),
        }
    }

    fn create_string(&self, value: &str) -> Value {
        Value::String(value.to_string())
    }

    fn get_stream<'a>(&'a self, input: &'a Value) -> DataResult<ValueIter<'a, Value>> {
        match input {
            Value::Array(items) => {
                let items: ValueIter<'a, Value> = Box::new(items.iter().cloned());
                DataResult::success(items)
            }
            _ => mismatch("list", input),
        }
    }

    fn create_list<I>(&self, items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Array(items.into_iter().collect())
    }

    fn create_map<I>(&self, entries: I) -> Value
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (key_string(&k), v))
                .collect(),
        )
    }

    fn get_map_values<'a>(&'a self, input: &'a Value) -> DataResult<EntryIter<'a, Value>> {
        match input {
            Value::Object(map) => {
                let entries: EntryIter<'a, Value> = Box::new(
                    map.iter()
                        .map(|(k, v)| (Value::String(k.clone()), v.clone())),
                );
                DataResult::success(entries)
            }
            _ => mismatch("map", input),
        }
    }

    fn get_map<'a>(&'a self, input: &'a Value) -> DataResult<Box<dyn MapLike<Value> + 'a>> {
        match input {
            Value::Object(map) => {
                let view: Box<dyn MapLike<Value> + 'a> = Box::new(JsonMapLike(map));
                DataResult::success(view)
            }
            _ => mismatch("map", input),
        }
    }

    fn merge_to_list(&self, list: &Value, value: Value) -> DataResult<Value> {
        self.merge_to_list_many(list, alloc::vec![value])
    }

    fn merge_to_list_many(&self, list: &Value, values: Vec<Value>) -> DataResult<Value> {
        match list {
            Value::Null => DataResult::success(Value::Array(values)),
            Value::Array(items) => {
                let mut items = items.clone();
                items.extend(values);
                DataResult::success(Value::Array(items))
            }
            _ => {
                trace!("json: refusing to append to {}", list);
                let shown = list.clone();
                DataResult::error_partial(
                    move || format!("merge_to_list called with not a list: {shown}"),
                    list.clone(),
                )
            }
        }
    }

    fn merge_to_map(&self, map: &Value, key: Value, value: Value) -> DataResult<Value> {
        self.merge_to_map_many(map, alloc::vec![(key, value)])
    }

    fn merge_to_map_many(&self, map: &Value, entries: Vec<(Value, Value)>) -> DataResult<Value> {
        let mut merged = match map {
            Value::Null => Map::new(),
            Value::Object(existing) => existing.clone(),
            _ => {
                let shown = map.clone();
                return DataResult::error_partial(
                    move || format!("merge_to_map called with not a map: {shown}"),
                    map.clone(),
                );
            }
        };
        for (key, value) in entries {
            match key {
                Value::String(key) => {
                    merged.insert(key, value);
                }
                other => {
                    debug!("json: map key {} is not a string", other);
                    return DataResult::error_partial(
                        move || format!("key is not a string: {other}"),
                        Value::Object(merged),
                    );
                }
            }
        }
        DataResult::success(Value::Object(merged))
    }

    fn remove(&self, input: &Value, key: &str) -> Value {
        match input {
            Value::Object(map) if map.contains_key(key) => {
                let mut map = map.clone();
                map.shift_remove(key);
                Value::Object(map)
            }
            _ => input.clone(),
        }
    }
}

/// JSON has no representation for `NaN` or infinities.
fn finite(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynops_testhelpers::test;
    use insta::assert_snapshot;
    use serde_json::json;

    #[test]
    fn numbers_collapse_to_long_and_double() {
        let ops = JsonOps;
        let byte = ops.create_byte(3);
        assert_eq!(ops.get_number_value(&byte).into_value(), Some(Number::Long(3)));
        let float = ops.create_float(1.5);
        assert_eq!(ops.get_number_value(&float).into_value(), Some(Number::Double(1.5)));
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(JsonOps.create_double(f64::NAN), Value::Null);
        assert_eq!(JsonOps.create_float(f32::INFINITY), Value::Null);
    }

    #[test]
    fn booleans_and_numbers_read_each_other() {
        assert_eq!(JsonOps.get_bool_value(&json!(0)).into_value(), Some(false));
        assert_eq!(JsonOps.get_bool_value(&json!(2)).into_value(), Some(true));
        assert_eq!(
            JsonOps.get_number_value(&json!(true)).into_value(),
            Some(Number::Byte(1))
        );
    }

    #[test]
    fn merge_errors() {
        let not_a_map = JsonOps.merge_to_map(&json!(1), json!("a"), json!(2));
        assert_snapshot!(not_a_map.error_message().unwrap(), @"merge_to_map called with not a map: 1");
        assert_eq!(not_a_map.partial(), Some(&json!(1)));

        let bad_key = JsonOps.merge_to_map(&json!({}), json!(1), json!(2));
        assert_snapshot!(bad_key.error_message().unwrap(), @"key is not a string: 1");

        let not_a_list = JsonOps.merge_to_list(&json!("x"), json!(1));
        assert_snapshot!(not_a_list.error_message().unwrap(), @r#"merge_to_list called with not a list: "x""#);
    }

    #[test]
    fn create_map_stringifies_keys() {
        let map = JsonOps.create_map(vec![(json!(1), json!(true)), (json!("b"), json!(null))]);
        assert_eq!(map, json!({"1": true, "b": null}));
    }

    #[test]
    fn remove_keeps_order() {
        let input = json!({"a": 1, "b": 2, "c": 3});
        let removed = JsonOps.remove(&input, "b");
        assert_snapshot!(removed.to_string(), @r#"{"a":1,"c":3}"#);
        assert_eq!(JsonOps.remove(&json!(5), "b"), json!(5));
    }
}

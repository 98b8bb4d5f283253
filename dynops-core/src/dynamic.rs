use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::{DataResult, DynamicOps, Number};

/// A value paired with the ops that understand it.
pub struct Dynamic<'a, O: DynamicOps> {
    ops: &'a O,
    value: O::Value,
}

impl<'a, O: DynamicOps> Dynamic<'a, O> {
    /// Pair a value with its ops.
    pub fn new(ops: &'a O, value: O::Value) -> Self {
        Self { ops, value }
    }

    /// The ops.
    pub fn ops(&self) -> &'a O {
        self.ops
    }

    /// The wrapped value.
    pub fn value(&self) -> &O::Value {
        &self.value
    }

    /// Unwrap the value.
    pub fn into_value(self) -> O::Value {
        self.value
    }

    /// Look up a string key.
    pub fn get(&self, key: &str) -> DataResult<Dynamic<'a, O>> {
        let ops = self.ops;
        ops.get(&self.value, key).map(|value| Dynamic::new(ops, value))
    }

    /// Read as a number.
    pub fn as_number(&self) -> DataResult<Number> {
        self.ops.get_number_value(&self.value)
    }

    /// Read as a string.
    pub fn as_string(&self) -> DataResult<String> {
        self.ops.get_string_value(&self.value)
    }

    /// Read as a boolean.
    pub fn as_bool(&self) -> DataResult<bool> {
        self.ops.get_bool_value(&self.value)
    }

    /// Read as a list of dynamics.
    pub fn as_list(&self) -> DataResult<Vec<Dynamic<'a, O>>> {
        let ops = self.ops;
        ops.get_stream(&self.value)
            .map(|items| items.map(|value| Dynamic::new(ops, value)).collect())
    }

    /// Set a string key. Non-maps come back unchanged.
    pub fn set(self, key: &str, value: O::Value) -> Self {
        let value = self.ops.set(&self.value, key, value);
        Dynamic::new(self.ops, value)
    }

    /// Remove a string key. Non-maps come back unchanged.
    pub fn remove(self, key: &str) -> Self {
        let value = self.ops.remove(&self.value, key);
        Dynamic::new(self.ops, value)
    }

    /// Transform the wrapped value, keeping the ops.
    pub fn map_value(self, f: impl FnOnce(O::Value) -> O::Value) -> Self {
        Dynamic::new(self.ops, f(self.value))
    }

    /// Copy into another backend.
    pub fn convert<'b, U: DynamicOps>(&self, out: &'b U) -> Dynamic<'b, U> {
        Dynamic::new(out, self.ops.convert_to(out, &self.value))
    }
}

impl<O: DynamicOps> Clone for Dynamic<'_, O> {
    fn clone(&self) -> Self {
        Dynamic::new(self.ops, self.value.clone())
    }
}

impl<O: DynamicOps> PartialEq for Dynamic<'_, O> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<O: DynamicOps> fmt::Debug for Dynamic<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dynamic").field(&self.value).finish()
    }
}

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::DynamicOps;

/// A read-only view over a map-shaped value.
///
/// [`entries`](MapLike::entries) hands out a fresh iterator on every call,
/// so a view can be walked as many times as needed.
pub trait MapLike<T> {
    /// Look up a key.
    fn get(&self, key: &T) -> Option<T>;

    /// Look up a string key.
    fn get_str(&self, key: &str) -> Option<T>;

    /// Iterate over all entries.
    fn entries(&self) -> Box<dyn Iterator<Item = (T, T)> + '_>;
}

impl<T: fmt::Debug> fmt::Debug for dyn MapLike<T> + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MapLike[")?;
        f.debug_map().entries(self.entries()).finish()?;
        f.write_str("]")
    }
}

/// A [`MapLike`] over an owned list of entries.
///
/// Lookups scan from the back, so a key that appears twice resolves to its
/// last occurrence.
pub struct VecMapLike<'a, O: DynamicOps> {
    ops: &'a O,
    entries: Vec<(O::Value, O::Value)>,
}

impl<'a, O: DynamicOps> VecMapLike<'a, O> {
    /// Wrap a list of entries.
    pub fn new(ops: &'a O, entries: Vec<(O::Value, O::Value)>) -> Self {
        Self { ops, entries }
    }

    /// Number of stored entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<O: DynamicOps> MapLike<O::Value> for VecMapLike<'_, O> {
    fn get(&self, key: &O::Value) -> Option<O::Value> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn get_str(&self, key: &str) -> Option<O::Value> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| {
                self.ops
                    .get_string_value(k)
                    .value()
                    .is_some_and(|s| s.as_str() == key)
            })
            .map(|(_, v)| v.clone())
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (O::Value, O::Value)> + '_> {
        Box::new(self.entries.iter().cloned())
    }
}

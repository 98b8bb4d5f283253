//! Error-accumulating builders for maps and lists.

use alloc::vec::Vec;

use crate::tracing_macros::debug;
use crate::{DataResult, DynamicOps, Lifecycle, Message};

fn push_error(errors: &mut Option<Message>, message: Message) {
    *errors = Some(match errors.take() {
        Some(existing) => existing.join(&message),
        None => message,
    });
}

/// Builds one map-shaped value out of independently produced entries.
///
/// Field codecs each add their entry; the first failure poisons the build
/// but later failures are still recorded, so the final message lists every
/// broken field.
pub struct RecordBuilder<'a, O: DynamicOps> {
    ops: &'a O,
    entries: Vec<(O::Value, O::Value)>,
    errors: Option<Message>,
    lifecycle: Lifecycle,
}

impl<'a, O: DynamicOps> RecordBuilder<'a, O> {
    /// An empty builder.
    pub fn new(ops: &'a O) -> Self {
        Self {
            ops,
            entries: Vec::new(),
            errors: None,
            lifecycle: Lifecycle::Stable,
        }
    }

    /// The ops this builder writes with.
    pub fn ops(&self) -> &'a O {
        self.ops
    }

    /// Returns `true` once any error was recorded.
    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    /// Add an entry.
    pub fn add(&mut self, key: O::Value, value: O::Value) -> &mut Self {
        self.entries.push((key, value));
        self
    }

    /// Add an entry whose value may have failed.
    pub fn add_result(&mut self, key: O::Value, value: DataResult<O::Value>) -> &mut Self {
        match value {
            DataResult::Success { value, lifecycle } => {
                self.lifecycle = self.lifecycle.add(lifecycle);
                self.entries.push((key, value));
            }
            DataResult::Error {
                message, lifecycle, ..
            } => {
                self.lifecycle = self.lifecycle.add(lifecycle);
                push_error(&mut self.errors, message);
            }
        }
        self
    }

    /// Add an entry whose key and value may both have failed.
    pub fn add_results(
        &mut self,
        key: DataResult<O::Value>,
        value: DataResult<O::Value>,
    ) -> &mut Self {
        match key.apply2(value, |k, v| (k, v)) {
            DataResult::Success {
                value: (k, v),
                lifecycle,
            } => {
                self.lifecycle = self.lifecycle.add(lifecycle);
                self.entries.push((k, v));
            }
            DataResult::Error {
                message, lifecycle, ..
            } => {
                self.lifecycle = self.lifecycle.add(lifecycle);
                push_error(&mut self.errors, message);
            }
        }
        self
    }

    /// Add an entry under a string key.
    pub fn add_str(&mut self, key: &str, value: O::Value) -> &mut Self {
        let key = self.ops.create_string(key);
        self.add(key, value)
    }

    /// Add an entry under a string key whose value may have failed.
    pub fn add_str_result(&mut self, key: &str, value: DataResult<O::Value>) -> &mut Self {
        let key = self.ops.create_string(key);
        self.add_result(key, value)
    }

    /// Record an error that does not belong to a single entry.
    pub fn add_error(&mut self, message: Message) -> &mut Self {
        push_error(&mut self.errors, message);
        self
    }

    /// Record the error (and lifecycle) of an unrelated result.
    pub fn with_errors_from<R>(&mut self, result: &DataResult<R>) -> &mut Self {
        self.lifecycle = self.lifecycle.add(result.lifecycle());
        if let Some(message) = result.message() {
            push_error(&mut self.errors, message.clone());
        }
        self
    }

    /// Replace the accumulated lifecycle.
    pub fn set_lifecycle(&mut self, lifecycle: Lifecycle) -> &mut Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Combine a lifecycle into the accumulated one.
    pub fn add_lifecycle(&mut self, lifecycle: Lifecycle) -> &mut Self {
        self.lifecycle = self.lifecycle.add(lifecycle);
        self
    }

    /// Take the builder apart into its entries, its recorded errors and its
    /// lifecycle, for handing them over to a builder of another backend.
    #[allow(clippy::type_complexity)]
    pub fn into_parts(self) -> (Vec<(O::Value, O::Value)>, Option<Message>, Lifecycle) {
        (self.entries, self.errors, self.lifecycle)
    }

    /// Merge every entry into `prefix`.
    ///
    /// Fails without a partial value if anything was recorded as an error.
    pub fn build(self, prefix: O::Value) -> DataResult<O::Value> {
        if let Some(errors) = self.errors {
            debug!("record build failed: {}", errors);
            return DataResult::error_with(errors, None, self.lifecycle);
        }
        self.ops
            .merge_to_map_many(&prefix, self.entries)
            .add_lifecycle(self.lifecycle)
    }

    /// Merge the entries that succeeded into `prefix`, and report every
    /// recorded error with that merge as the partial value.
    pub fn build_lenient(self, prefix: O::Value) -> DataResult<O::Value> {
        let merged = self
            .ops
            .merge_to_map_many(&prefix, self.entries)
            .add_lifecycle(self.lifecycle);
        match self.errors {
            None => merged,
            Some(errors) => match merged {
                DataResult::Success { value, lifecycle } => {
                    DataResult::error_with(errors, Some(value), lifecycle)
                }
                DataResult::Error {
                    message, lifecycle, ..
                } => DataResult::error_with(errors.join(&message), None, lifecycle),
            },
        }
    }
}

/// Builds one list-shaped value out of independently produced elements.
pub struct ListBuilder<'a, O: DynamicOps> {
    ops: &'a O,
    items: Vec<O::Value>,
    errors: Option<Message>,
    lifecycle: Lifecycle,
}

impl<'a, O: DynamicOps> ListBuilder<'a, O> {
    /// An empty builder.
    pub fn new(ops: &'a O) -> Self {
        Self {
            ops,
            items: Vec::new(),
            errors: None,
            lifecycle: Lifecycle::Stable,
        }
    }

    /// The ops this builder writes with.
    pub fn ops(&self) -> &'a O {
        self.ops
    }

    /// Add an element.
    pub fn add(&mut self, value: O::Value) -> &mut Self {
        self.items.push(value);
        self
    }

    /// Add an element that may have failed.
    pub fn add_result(&mut self, value: DataResult<O::Value>) -> &mut Self {
        match value {
            DataResult::Success { value, lifecycle } => {
                self.lifecycle = self.lifecycle.add(lifecycle);
                self.items.push(value);
            }
            DataResult::Error {
                message, lifecycle, ..
            } => {
                self.lifecycle = self.lifecycle.add(lifecycle);
                push_error(&mut self.errors, message);
            }
        }
        self
    }

    /// Record an error that does not belong to a single element.
    pub fn add_error(&mut self, message: Message) -> &mut Self {
        push_error(&mut self.errors, message);
        self
    }

    /// Record the error (and lifecycle) of an unrelated result.
    pub fn with_errors_from<R>(&mut self, result: &DataResult<R>) -> &mut Self {
        self.lifecycle = self.lifecycle.add(result.lifecycle());
        if let Some(message) = result.message() {
            push_error(&mut self.errors, message.clone());
        }
        self
    }

    /// Combine a lifecycle into the accumulated one.
    pub fn add_lifecycle(&mut self, lifecycle: Lifecycle) -> &mut Self {
        self.lifecycle = self.lifecycle.add(lifecycle);
        self
    }

    /// Append every element to `prefix`, failing if anything was recorded
    /// as an error.
    pub fn build(self, prefix: O::Value) -> DataResult<O::Value> {
        if let Some(errors) = self.errors {
            debug!("list build failed: {}", errors);
            return DataResult::error_with(errors, None, self.lifecycle);
        }
        self.ops
            .merge_to_list_many(&prefix, self.items)
            .add_lifecycle(self.lifecycle)
    }
}

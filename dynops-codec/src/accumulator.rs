use dynops_core::{DataResult, Lifecycle, Message};

/// Collects the errors and lifecycles of many independent results.
pub(crate) struct Accumulator {
    errors: Option<Message>,
    lifecycle: Lifecycle,
}

impl Accumulator {
    pub(crate) fn new() -> Self {
        Self {
            errors: None,
            lifecycle: Lifecycle::Stable,
        }
    }

    /// Record `result`, handing back its value or partial.
    pub(crate) fn record<R>(&mut self, result: DataResult<R>) -> Option<R> {
        match result {
            DataResult::Success { value, lifecycle } => {
                self.lifecycle = self.lifecycle.add(lifecycle);
                Some(value)
            }
            DataResult::Error {
                message,
                partial,
                lifecycle,
            } => {
                self.lifecycle = self.lifecycle.add(lifecycle);
                self.push(message);
                partial
            }
        }
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.errors = Some(match self.errors.take() {
            Some(existing) => existing.join(&message),
            None => message,
        });
    }

    pub(crate) fn is_clean(&self) -> bool {
        self.errors.is_none()
    }

    /// Success if nothing failed, otherwise an error with `value` as partial.
    pub(crate) fn finish<R>(self, value: R) -> DataResult<R> {
        self.finish_partial(Some(value))
    }

    /// Like [`finish`](Self::finish), but the value itself may be missing.
    pub(crate) fn finish_partial<R>(self, value: Option<R>) -> DataResult<R> {
        match (self.errors, value) {
            (None, Some(value)) => DataResult::success_with(value, self.lifecycle),
            (Some(message), partial) => DataResult::error_with(message, partial, self.lifecycle),
            (None, None) => DataResult::error_with(
                Message::from("no value was produced"),
                None,
                self.lifecycle,
            ),
        }
    }
}

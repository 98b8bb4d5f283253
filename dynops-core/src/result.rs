//! Three-state results: success, error, and error carrying a partial value.

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use crate::Lifecycle;

/// A lazily rendered error message.
///
/// Messages are only formatted when somebody asks for them, so combinators
/// that try several alternatives do not pay for the messages they discard.
#[derive(Clone)]
pub struct Message(Arc<dyn Fn() -> String + Send + Sync>);

impl Message {
    /// Create a message from a closure that renders it.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Message(Arc::new(render))
    }

    /// Render the message.
    pub fn render(&self) -> String {
        (self.0)()
    }

    /// `self; other`
    pub fn join(&self, other: &Message) -> Message {
        let first = self.clone();
        let second = other.clone();
        Message::new(move || alloc::format!("{}; {}", first.render(), second.render()))
    }
}

impl From<String> for Message {
    fn from(message: String) -> Self {
        let message: Arc<str> = message.into();
        Message::new(move || String::from(&*message))
    }
}

impl From<&str> for Message {
    fn from(message: &str) -> Self {
        Message::from(String::from(message))
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.render(), f)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.render() == other.render()
    }
}

/// The outcome of every encode, decode, and backend read.
///
/// An [`Error`](DataResult::Error) may still carry a best-effort `partial`
/// value, for instance a record whose other fields decoded fine. Both
/// branches carry the combined [`Lifecycle`] of everything the operation
/// touched.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub enum DataResult<R> {
    /// The operation succeeded.
    Success {
        /// The produced value.
        value: R,
        /// Combined lifecycle of the operation.
        lifecycle: Lifecycle,
    },
    /// The operation failed.
    Error {
        /// What went wrong.
        message: Message,
        /// Best-effort value recovered despite the failure.
        partial: Option<R>,
        /// Combined lifecycle of the operation.
        lifecycle: Lifecycle,
    },
}

impl<R> DataResult<R> {
    /// A stable success.
    pub fn success(value: R) -> Self {
        DataResult::Success {
            value,
            lifecycle: Lifecycle::Stable,
        }
    }

    /// A success with an explicit lifecycle.
    pub fn success_with(value: R, lifecycle: Lifecycle) -> Self {
        DataResult::Success { value, lifecycle }
    }

    /// An error without a partial value.
    pub fn error<F>(message: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        DataResult::Error {
            message: Message::new(message),
            partial: None,
            lifecycle: Lifecycle::Stable,
        }
    }

    /// An error carrying a partial value.
    pub fn error_partial<F>(message: F, partial: R) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        DataResult::Error {
            message: Message::new(message),
            partial: Some(partial),
            lifecycle: Lifecycle::Stable,
        }
    }

    /// An error built from its parts.
    pub fn error_with(message: Message, partial: Option<R>, lifecycle: Lifecycle) -> Self {
        DataResult::Error {
            message,
            partial,
            lifecycle,
        }
    }

    /// Success if `value` is present, otherwise an error rendered by `message`.
    pub fn from_option<F>(value: Option<R>, message: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        match value {
            Some(value) => DataResult::success(value),
            None => DataResult::error(message),
        }
    }

    /// The value, if this is a success.
    pub fn value(&self) -> Option<&R> {
        match self {
            DataResult::Success { value, .. } => Some(value),
            DataResult::Error { .. } => None,
        }
    }

    /// The value, if this is a success.
    pub fn into_value(self) -> Option<R> {
        match self {
            DataResult::Success { value, .. } => Some(value),
            DataResult::Error { .. } => None,
        }
    }

    /// The partial value, if this is an error that carries one.
    pub fn partial(&self) -> Option<&R> {
        match self {
            DataResult::Success { .. } => None,
            DataResult::Error { partial, .. } => partial.as_ref(),
        }
    }

    /// The value of a success or the partial value of an error.
    pub fn result_or_partial(&self) -> Option<&R> {
        match self {
            DataResult::Success { value, .. } => Some(value),
            DataResult::Error { partial, .. } => partial.as_ref(),
        }
    }

    /// The value of a success or the partial value of an error.
    pub fn into_result_or_partial(self) -> Option<R> {
        match self {
            DataResult::Success { value, .. } => Some(value),
            DataResult::Error { partial, .. } => partial,
        }
    }

    /// Like [`into_result_or_partial`](Self::into_result_or_partial), but
    /// reports the error message to `on_error` first.
    pub fn into_result_or_partial_with(self, on_error: impl FnOnce(String)) -> Option<R> {
        match self {
            DataResult::Success { value, .. } => Some(value),
            DataResult::Error {
                message, partial, ..
            } => {
                on_error(message.render());
                partial
            }
        }
    }

    /// Returns `true` for a success.
    pub fn is_success(&self) -> bool {
        matches!(self, DataResult::Success { .. })
    }

    /// Returns `true` for an error, with or without a partial value.
    pub fn is_error(&self) -> bool {
        matches!(self, DataResult::Error { .. })
    }

    /// Returns `true` for a success or an error carrying a partial value.
    pub fn has_result_or_partial(&self) -> bool {
        match self {
            DataResult::Success { .. } => true,
            DataResult::Error { partial, .. } => partial.is_some(),
        }
    }

    /// The rendered error message, if this is an error.
    pub fn error_message(&self) -> Option<String> {
        self.message().map(Message::render)
    }

    /// The unrendered error message, if this is an error.
    pub fn message(&self) -> Option<&Message> {
        match self {
            DataResult::Success { .. } => None,
            DataResult::Error { message, .. } => Some(message),
        }
    }

    /// The combined lifecycle.
    pub fn lifecycle(&self) -> Lifecycle {
        match self {
            DataResult::Success { lifecycle, .. } | DataResult::Error { lifecycle, .. } => *lifecycle,
        }
    }

    /// Replace the lifecycle.
    pub fn set_lifecycle(self, lifecycle: Lifecycle) -> Self {
        match self {
            DataResult::Success { value, .. } => DataResult::Success { value, lifecycle },
            DataResult::Error {
                message, partial, ..
            } => DataResult::Error {
                message,
                partial,
                lifecycle,
            },
        }
    }

    /// Combine `lifecycle` into the current one.
    pub fn add_lifecycle(self, lifecycle: Lifecycle) -> Self {
        let combined = self.lifecycle().add(lifecycle);
        self.set_lifecycle(combined)
    }

    /// Transform the value or the partial value.
    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> DataResult<T> {
        match self {
            DataResult::Success { value, lifecycle } => DataResult::Success {
                value: f(value),
                lifecycle,
            },
            DataResult::Error {
                message,
                partial,
                lifecycle,
            } => DataResult::Error {
                message,
                partial: partial.map(f),
                lifecycle,
            },
        }
    }

    /// Chain a fallible computation.
    ///
    /// An error with a partial value still runs `f` on the partial: the
    /// result stays an error, keeps whatever partial `f` produced, and appends
    /// `f`'s message if it failed too.
    pub fn flat_map<T>(self, f: impl FnOnce(R) -> DataResult<T>) -> DataResult<T> {
        match self {
            DataResult::Success { value, lifecycle } => f(value).add_lifecycle(lifecycle),
            DataResult::Error {
                message,
                partial: None,
                lifecycle,
            } => DataResult::Error {
                message,
                partial: None,
                lifecycle,
            },
            DataResult::Error {
                message,
                partial: Some(partial),
                lifecycle,
            } => match f(partial) {
                DataResult::Success {
                    value,
                    lifecycle: second,
                } => DataResult::Error {
                    message,
                    partial: Some(value),
                    lifecycle: lifecycle.add(second),
                },
                DataResult::Error {
                    message: second_message,
                    partial,
                    lifecycle: second,
                } => DataResult::Error {
                    message: message.join(&second_message),
                    partial,
                    lifecycle: lifecycle.add(second),
                },
            },
        }
    }

    /// Applicative combination of two results.
    ///
    /// Messages join first-then-second. The combined partial only exists if
    /// both sides produced a value or a partial.
    pub fn apply2<B, T>(self, second: DataResult<B>, f: impl FnOnce(R, B) -> T) -> DataResult<T> {
        let lifecycle = self.lifecycle().add(second.lifecycle());
        match (self, second) {
            (DataResult::Success { value: a, .. }, DataResult::Success { value: b, .. }) => {
                DataResult::success_with(f(a, b), lifecycle)
            }
            (DataResult::Success { value: a, .. }, DataResult::Error { message, partial, .. }) => {
                DataResult::error_with(message, partial.map(|b| f(a, b)), lifecycle)
            }
            (DataResult::Error { message, partial, .. }, DataResult::Success { value: b, .. }) => {
                DataResult::error_with(message, partial.map(|a| f(a, b)), lifecycle)
            }
            (
                DataResult::Error {
                    message: first,
                    partial: a,
                    ..
                },
                DataResult::Error {
                    message: second,
                    partial: b,
                    ..
                },
            ) => {
                let partial = match (a, b) {
                    (Some(a), Some(b)) => Some(f(a, b)),
                    _ => None,
                };
                DataResult::error_with(first.join(&second), partial, lifecycle)
            }
        }
    }

    /// Rewrite the error message.
    pub fn map_error<F>(self, f: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        match self {
            success @ DataResult::Success { .. } => success,
            DataResult::Error {
                message,
                partial,
                lifecycle,
            } => DataResult::Error {
                message: Message::new(move || f(message.render())),
                partial,
                lifecycle,
            },
        }
    }

    /// Attach a partial value to an error. Successes are unchanged.
    pub fn set_partial(self, partial: R) -> Self {
        match self {
            success @ DataResult::Success { .. } => success,
            DataResult::Error {
                message, lifecycle, ..
            } => DataResult::Error {
                message,
                partial: Some(partial),
                lifecycle,
            },
        }
    }

    /// Turn an error with a partial value into a success, reporting the
    /// message to `on_error`. Errors without a partial also report, and stay
    /// errors.
    pub fn promote_partial(self, on_error: impl FnOnce(String)) -> Self {
        match self {
            success @ DataResult::Success { .. } => success,
            DataResult::Error {
                message,
                partial: Some(partial),
                lifecycle,
            } => {
                on_error(message.render());
                DataResult::Success {
                    value: partial,
                    lifecycle,
                }
            }
            DataResult::Error {
                message,
                partial: None,
                lifecycle,
            } => {
                on_error(message.render());
                DataResult::Error {
                    message,
                    partial: None,
                    lifecycle,
                }
            }
        }
    }

    /// Convert into a standard `Result`, dropping any partial value.
    pub fn into_result(self) -> Result<R, DataError> {
        match self {
            DataResult::Success { value, .. } => Ok(value),
            DataResult::Error {
                message, lifecycle, ..
            } => Err(DataError { message, lifecycle }),
        }
    }
}

impl<R> From<R> for DataResult<R> {
    fn from(value: R) -> Self {
        DataResult::success(value)
    }
}

/// A failed [`DataResult`] converted into a standard error.
#[derive(Clone, Debug)]
pub struct DataError {
    message: Message,
    lifecycle: Lifecycle,
}

impl DataError {
    /// The rendered message.
    pub fn message(&self) -> String {
        self.message.render()
    }

    /// The lifecycle the failing operation had accumulated.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message.render())
    }
}

impl core::error::Error for DataError {}

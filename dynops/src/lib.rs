#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use dynops_core::*;

pub use dynops_codec::*;

pub use dynops_value::{Value, ValueOps, ValueType};

/// The `serde_json::Value` backend.
#[cfg(feature = "json")]
pub mod json {
    pub use dynops_json::*;
}

pub use static_assertions;

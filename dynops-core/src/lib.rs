#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod tracing_macros;

mod lifecycle;
pub use lifecycle::*;

mod result;
pub use result::*;

mod number;
pub use number::*;

mod map_like;
pub use map_like::*;

mod ops;
pub use ops::*;

mod builder;
pub use builder::*;

mod dynamic;
pub use dynamic::*;

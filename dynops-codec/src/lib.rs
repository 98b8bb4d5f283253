#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod accumulator;
mod tracing_macros;

mod codec;
pub use codec::*;

mod xmap;
pub use xmap::*;

mod lifecycle;
pub use lifecycle::*;

mod primitive;
pub use primitive::*;

mod list;
pub use list::*;

mod compound_list;
pub use compound_list::*;

mod unbounded_map;
pub use unbounded_map::*;

mod either;
pub use either::*;

mod map_codec;
pub use map_codec::*;

mod field;
pub use field::*;

mod record;
pub use record::*;

mod dispatch;
pub use dispatch::*;

mod erased;

mod boxed;
pub use boxed::*;

mod recursive;
pub use recursive::*;

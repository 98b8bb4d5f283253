//! The in-memory tree.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use bytes::Bytes;
use core::fmt::{self, Debug, Display, Formatter};
use core::hash::{Hash, Hasher};
use dynops_core::Number;
use indexmap::IndexMap;

/// Enum distinguishing the value types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueType {
    /// The absent value
    Empty,
    /// Boolean
    Bool,
    /// Any numeric sub-kind
    Number,
    /// String (UTF-8)
    String,
    /// Specialized byte list
    ByteList,
    /// Specialized int list
    IntList,
    /// Specialized long list
    LongList,
    /// Generic list
    List,
    /// Key-value map
    Map,
}

/// An immutable tree value. Cloning is cheap: containers are shared.
#[derive(Clone, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    Empty,
    /// A boolean.
    Bool(bool),
    /// An 8-bit integer.
    Byte(i8),
    /// A 16-bit integer.
    Short(i16),
    /// A 32-bit integer.
    Int(i32),
    /// A 64-bit integer.
    Long(i64),
    /// A 32-bit float.
    Float(f32),
    /// A 64-bit float.
    Double(f64),
    /// A string.
    String(Arc<str>),
    /// A list of bytes.
    ByteList(Bytes),
    /// A list of ints.
    IntList(Arc<[i32]>),
    /// A list of longs.
    LongList(Arc<[i64]>),
    /// A list of arbitrary values.
    List(Arc<[Value]>),
    /// An insertion-ordered map.
    Map(Arc<IndexMap<Value, Value>>),
}

impl Value {
    /// Build a generic list.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// Build a map. A repeated key keeps its first position and its last value.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(Arc::new(entries.into_iter().collect()))
    }

    /// Build a specialized byte list.
    pub fn byte_list(bytes: impl Into<Bytes>) -> Self {
        Value::ByteList(bytes.into())
    }

    /// Build a specialized int list.
    pub fn int_list(values: impl Into<Arc<[i32]>>) -> Self {
        Value::IntList(values.into())
    }

    /// Build a specialized long list.
    pub fn long_list(values: impl Into<Arc<[i64]>>) -> Self {
        Value::LongList(values.into())
    }

    /// The type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Empty => ValueType::Empty,
            Value::Bool(_) => ValueType::Bool,
            Value::Byte(_)
            | Value::Short(_)
            | Value::Int(_)
            | Value::Long(_)
            | Value::Float(_)
            | Value::Double(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::ByteList(_) => ValueType::ByteList,
            Value::IntList(_) => ValueType::IntList,
            Value::LongList(_) => ValueType::LongList,
            Value::List(_) => ValueType::List,
            Value::Map(_) => ValueType::Map,
        }
    }

    /// Returns `true` for [`Value::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Returns `true` for any list representation.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::ByteList(_) | Value::IntList(_) | Value::LongList(_)
        )
    }

    /// Returns `true` for a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is one.
    pub fn as_number(&self) -> Option<Number> {
        match *self {
            Value::Byte(v) => Some(Number::Byte(v)),
            Value::Short(v) => Some(Number::Short(v)),
            Value::Int(v) => Some(Number::Int(v)),
            Value::Long(v) => Some(Number::Long(v)),
            Value::Float(v) => Some(Number::Float(v)),
            Value::Double(v) => Some(Number::Double(v)),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is a generic list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a map.
    pub fn as_map(&self) -> Option<&IndexMap<Value, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a string key, if this is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(&Value::from(key))
    }

    /// Any list representation widened to generic elements.
    pub(crate) fn list_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.to_vec()),
            Value::ByteList(bytes) => Some(bytes.iter().map(|b| Value::Byte(*b as i8)).collect()),
            Value::IntList(ints) => Some(ints.iter().copied().map(Value::Int).collect()),
            Value::LongList(longs) => Some(longs.iter().copied().map(Value::Long).collect()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::ByteList(a), Value::ByteList(b)) => a == b,
            (Value::IntList(a), Value::IntList(b)) => a == b,
            (Value::LongList(a), Value::LongList(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Empty => {}
            Value::Bool(v) => v.hash(state),
            Value::Byte(v) => v.hash(state),
            Value::Short(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::ByteList(v) => v.hash(state),
            Value::IntList(v) => v.hash(state),
            Value::LongList(v) => v.hash(state),
            Value::List(v) => v.hash(state),
            // maps compare regardless of order
            Value::Map(v) => v.len().hash(state),
        }
    }
}

fn write_seq<T>(
    f: &mut Formatter<'_>,
    prefix: &str,
    items: impl IntoIterator<Item = T>,
    mut write: impl FnMut(&mut Formatter<'_>, T) -> fmt::Result,
) -> fmt::Result {
    f.write_str("[")?;
    f.write_str(prefix)?;
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write(f, item)?;
    }
    f.write_str("]")
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("empty"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}b"),
            Value::Short(v) => write!(f, "{v}s"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}L"),
            Value::Float(v) => write!(f, "{v:?}f"),
            Value::Double(v) => write!(f, "{v:?}d"),
            Value::String(v) => write!(f, "{:?}", &**v),
            Value::ByteList(v) => write_seq(f, "B; ", v.iter(), |f, b| write!(f, "{}b", *b as i8)),
            Value::IntList(v) => write_seq(f, "I; ", v.iter(), |f, i| write!(f, "{i}")),
            Value::LongList(v) => write_seq(f, "L; ", v.iter(), |f, l| write!(f, "{l}L")),
            Value::List(v) => write_seq(f, "", v.iter(), |f, item| write!(f, "{item}")),
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

macro_rules! from_scalar {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

from_scalar!(
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Bytes => ByteList
);

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Byte(v) => Value::Byte(v),
            Number::Short(v) => Value::Short(v),
            Number::Int(v) => Value::Int(v),
            Number::Long(v) => Value::Long(v),
            Number::Float(v) => Value::Float(v),
            Number::Double(v) => Value::Double(v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }
}

impl From<IndexMap<Value, Value>> for Value {
    fn from(map: IndexMap<Value, Value>) -> Self {
        Value::Map(Arc::new(map))
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::list(iter)
    }
}

impl FromIterator<(Value, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Value::map(iter)
    }
}

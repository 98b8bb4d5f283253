use core::fmt;

/// A numeric primitive with its sub-kind preserved.
///
/// Backends that distinguish byte/short/int/long/float/double hand these
/// back exactly as they were created. Backends that do not are free to
/// collapse them, as long as conversions out of a richer backend still see
/// the original kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// 8-bit signed integer
    Byte(i8),
    /// 16-bit signed integer
    Short(i16),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
}

/// The sub-kind of a [`Number`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumberKind {
    /// [`Number::Byte`]
    Byte,
    /// [`Number::Short`]
    Short,
    /// [`Number::Int`]
    Int,
    /// [`Number::Long`]
    Long,
    /// [`Number::Float`]
    Float,
    /// [`Number::Double`]
    Double,
}

macro_rules! narrowing {
    ($($(#[$meta:meta])* $name:ident -> $ty:ty;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(self) -> $ty {
                match self {
                    Number::Byte(v) => v as $ty,
                    Number::Short(v) => v as $ty,
                    Number::Int(v) => v as $ty,
                    Number::Long(v) => v as $ty,
                    Number::Float(v) => v as $ty,
                    Number::Double(v) => v as $ty,
                }
            }
        )*
    };
}

impl Number {
    /// Which sub-kind this number is.
    pub fn kind(&self) -> NumberKind {
        match self {
            Number::Byte(_) => NumberKind::Byte,
            Number::Short(_) => NumberKind::Short,
            Number::Int(_) => NumberKind::Int,
            Number::Long(_) => NumberKind::Long,
            Number::Float(_) => NumberKind::Float,
            Number::Double(_) => NumberKind::Double,
        }
    }

    /// Returns `true` for the four integer kinds.
    pub fn is_integral(&self) -> bool {
        !matches!(self, Number::Float(_) | Number::Double(_))
    }

    narrowing! {
        /// Convert with `as` semantics (wrapping for integers, saturating for floats).
        as_i8 -> i8;
        /// Convert with `as` semantics.
        as_i16 -> i16;
        /// Convert with `as` semantics.
        as_i32 -> i32;
        /// Convert with `as` semantics.
        as_i64 -> i64;
        /// Convert with `as` semantics.
        as_f32 -> f32;
        /// Convert with `as` semantics.
        as_f64 -> f64;
    }
}

macro_rules! from_primitive {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl From<$ty> for Number {
                fn from(v: $ty) -> Self {
                    Number::$variant(v)
                }
            }
        )*
    };
}

from_primitive!(i8 => Byte, i16 => Short, i32 => Int, i64 => Long, f32 => Float, f64 => Double);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Byte(v) => write!(f, "{v}"),
            Number::Short(v) => write!(f, "{v}"),
            Number::Int(v) => write!(f, "{v}"),
            Number::Long(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v}"),
            Number::Double(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynops_testhelpers::test;

    #[test]
    fn narrowing_follows_casts() {
        assert_eq!(Number::Int(300).as_i8(), 300i32 as i8);
        assert_eq!(Number::Double(1.9).as_i32(), 1);
        assert_eq!(Number::Float(f32::MAX).as_i64(), i64::MAX);
        assert_eq!(Number::Long(-1).as_f64(), -1.0);
    }

    #[test]
    fn kinds_survive_from() {
        assert_eq!(Number::from(1i8).kind(), NumberKind::Byte);
        assert_eq!(Number::from(1i16).kind(), NumberKind::Short);
        assert_eq!(Number::from(1.5f32).kind(), NumberKind::Float);
        assert!(Number::from(3i64).is_integral());
        assert!(!Number::from(3.0f64).is_integral());
    }
}

#![forbid(unsafe_code)]

//! The closed set of primitive kinds a tag can store.
//!
//! [`TagType`] is the discriminator, [`Value`] is the matching tagged union
//! used wherever the concrete kind is not known statically, and
//! [`TagValue`] binds each primitive to its discriminator and factory
//! defaults.
//!
//! | Kind           | Rust type | min        | max        | alarm low | alarm high |
//! |----------------|-----------|------------|------------|-----------|------------|
//! | `Bool`         | `bool`    | `false`    | `true`     | `false`   | `true`     |
//! | `Int`          | `i32`     | `i32::MIN` | `i32::MAX` | 0         | 100        |
//! | `Unsigned`     | `u32`     | 0          | `u32::MAX` | 0         | 100        |
//! | `LongInt`      | `i64`     | `i64::MIN` | `i64::MAX` | 0         | 100        |
//! | `LongUnsigned` | `u64`     | 0          | `u64::MAX` | 0         | 100        |
//! | `Float`        | `f32`     | `f32::MIN` | `f32::MAX` | 0.0       | 100.0      |
//! | `Double`       | `f64`     | `f64::MIN` | `f64::MAX` | 0.0       | 100.0      |
//!
//! Every kind defaults to zero (`false` for `Bool`).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Discriminator over the primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TagType {
    Bool,
    /// 32-bit signed.
    Int,
    /// 32-bit unsigned.
    Unsigned,
    /// 64-bit signed.
    LongInt,
    /// 64-bit unsigned.
    LongUnsigned,
    /// 32-bit IEEE float.
    Float,
    /// 64-bit IEEE float.
    Double,
}

impl TagType {
    /// All kinds in declaration order.
    pub const ALL: [TagType; 7] = [
        TagType::Bool,
        TagType::Int,
        TagType::Unsigned,
        TagType::LongInt,
        TagType::LongUnsigned,
        TagType::Float,
        TagType::Double,
    ];

    /// Stable name, suitable for logs and configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Unsigned => "Unsigned",
            Self::LongInt => "LongInt",
            Self::LongUnsigned => "LongUnsigned",
            Self::Float => "Float",
            Self::Double => "Double",
        }
    }

    /// Whether the kind is one of the integer kinds.
    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Unsigned | Self::LongInt | Self::LongUnsigned
        )
    }

    /// Whether the kind is one of the IEEE floating-point kinds.
    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag value with its kind attached.
///
/// Equality follows the primitive's own `==`, so `Value::Double(NAN)` is
/// never equal to itself.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    Bool(bool),
    Int(i32),
    Unsigned(u32),
    LongInt(i64),
    LongUnsigned(u64),
    Float(f32),
    Double(f64),
}

impl Value {
    /// The discriminator of the carried value.
    #[must_use]
    pub const fn tag_type(&self) -> TagType {
        match self {
            Self::Bool(_) => TagType::Bool,
            Self::Int(_) => TagType::Int,
            Self::Unsigned(_) => TagType::Unsigned,
            Self::LongInt(_) => TagType::LongInt,
            Self::LongUnsigned(_) => TagType::LongUnsigned,
            Self::Float(_) => TagType::Float,
            Self::Double(_) => TagType::Double,
        }
    }

    /// Extract the primitive if the kind matches `T`.
    #[must_use]
    pub fn get<T: TagValue>(self) -> Option<T> {
        T::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::LongInt(v) => write!(f, "{v}"),
            Self::LongUnsigned(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

/// Payload handed to type-erased listeners: the value after the write and
/// the last notified value before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub new: Value,
    pub previous: Value,
}

impl Change {
    /// The kind of both values.
    #[must_use]
    pub const fn tag_type(&self) -> TagType {
        self.new.tag_type()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A primitive that can be stored in a tag.
///
/// Implemented for exactly the seven primitives of [`TagType`]; the trait is
/// sealed so the set stays closed.
pub trait TagValue:
    Copy + PartialEq + PartialOrd + Default + fmt::Debug + fmt::Display + 'static + sealed::Sealed
{
    /// Discriminator for this primitive.
    const KIND: TagType;
    /// Factory lower bound.
    const MIN: Self;
    /// Factory upper bound.
    const MAX: Self;
    /// Factory baseline value.
    const DEFAULT: Self;
    /// Factory low alarm threshold.
    const ALARM_LOW: Self;
    /// Factory high alarm threshold.
    const ALARM_HIGH: Self;

    /// Wrap in the matching [`Value`] variant.
    fn into_value(self) -> Value;

    /// Unwrap from a [`Value`] of the matching kind.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_tag_value {
    ($ty:ty, $variant:ident, $min:expr, $max:expr, $default:expr, $low:expr, $high:expr) => {
        impl sealed::Sealed for $ty {}

        impl TagValue for $ty {
            const KIND: TagType = TagType::$variant;
            const MIN: Self = $min;
            const MAX: Self = $max;
            const DEFAULT: Self = $default;
            const ALARM_LOW: Self = $low;
            const ALARM_HIGH: Self = $high;

            #[inline]
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            #[inline]
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            #[inline]
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_tag_value!(bool, Bool, false, true, false, false, true);
impl_tag_value!(i32, Int, i32::MIN, i32::MAX, 0, 0, 100);
impl_tag_value!(u32, Unsigned, u32::MIN, u32::MAX, 0, 0, 100);
impl_tag_value!(i64, LongInt, i64::MIN, i64::MAX, 0, 0, 100);
impl_tag_value!(u64, LongUnsigned, u64::MIN, u64::MAX, 0, 0, 100);
impl_tag_value!(f32, Float, f32::MIN, f32::MAX, 0.0, 0.0, 100.0);
impl_tag_value!(f64, Double, f64::MIN, f64::MAX, 0.0, 0.0, 100.0);

use crate::{Error, Result, Value};
use std::any;
use time::{Date, OffsetDateTime};

/// Conversion between native scalar types and the dynamically typed [`Value`].
///
/// Every type implementing `AsValue` maps onto exactly one Spanner column
/// type. Integers narrower than 64 bits are widened into `Value::Int64` and
/// range checked on the way back, `f32` is widened into `Value::Float64`.
///
/// # Examples
/// ```rust
/// use extrude_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int64(Some(42))));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed NULL for this type.
    fn as_empty_value() -> Value;
    /// Convert this value into its owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    ///
    /// Accepts the canonical variant for the type and fails with a message
    /// naming both the value and the target type otherwise.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Value::String(Some(value.into()))
    }
}

pub(crate) fn cannot_convert<T: ?Sized>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {value:?} to {}",
        any::type_name::<T>(),
    ))
}

macro_rules! impl_as_value_integer {
    ($($source:ty),+ $(,)?) => {$(
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                Value::Int64(None)
            }
            fn as_value(self) -> Value {
                Value::Int64(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Int64(Some(v)) => <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {v}: i64 is out of range for {}",
                            any::type_name::<Self>(),
                        ))
                    }),
                    _ => Err(cannot_convert::<Self>(&value)),
                }
            }
        }
    )+};
}
impl_as_value_integer!(i8, i16, i32, i64, isize, u8, u16, u32);

macro_rules! impl_as_value {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v as _),
                    _ => Err(cannot_convert::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value!(bool, Value::Bool);
impl_as_value!(f64, Value::Float64);
impl_as_value!(f32, Value::Float64);

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::String(None)
    }
    fn as_value(self) -> Value {
        Value::String(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(Some(v)) => Ok(v),
            _ => Err(cannot_convert::<Self>(&value)),
        }
    }
}

impl AsValue for OffsetDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            _ => Err(cannot_convert::<Self>(&value)),
        }
    }
}

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            _ => Err(cannot_convert::<Self>(&value)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
}

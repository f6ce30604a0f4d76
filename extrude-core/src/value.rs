use crate::ColumnType;
use std::fmt::{self, Display, Formatter};
use time::{Date, OffsetDateTime};

/// Dynamically typed column value.
///
/// Every variant except `Null` wraps an `Option`, a `None` inside a variant is a
/// NULL that still remembers its column type.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Bool(Option<bool>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    String(Option<String>),
    Bytes(Option<Box<[u8]>>),
    Timestamp(Option<OffsetDateTime>),
    Date(Option<Date>),
    Array(Option<Box<[Value]>>, /* element: */ Box<Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(l), Self::Bool(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::String(l), Self::String(r)) => l == r,
            (Self::Bytes(l), Self::Bytes(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Array(l, ..), Self::Array(r, ..)) => l == r && self.same_type(other),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Bool(None)
                | Value::Int64(None)
                | Value::Float64(None)
                | Value::String(None)
                | Value::Bytes(None)
                | Value::Timestamp(None)
                | Value::Date(None)
                | Value::Array(None, ..)
        )
    }

    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Array(.., l), Self::Array(.., r)) => l.same_type(r),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }

    /// Column type of the value, arrays report their element type.
    pub fn column_type(&self) -> Option<ColumnType> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(..) => ColumnType::Bool,
            Value::Int64(..) => ColumnType::Int64,
            Value::Float64(..) => ColumnType::Float64,
            Value::String(..) => ColumnType::String,
            Value::Bytes(..) => ColumnType::Bytes,
            Value::Timestamp(..) => ColumnType::Timestamp,
            Value::Date(..) => ColumnType::Date,
            Value::Array(.., element) => return element.column_type(),
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Bool(Some(v)) => write!(f, "{}", v),
            Value::Int64(Some(v)) => write!(f, "{}", v),
            Value::Float64(Some(v)) => write!(f, "{}", v),
            Value::String(Some(v)) => write!(f, "{:?}", v),
            Value::Bytes(Some(v)) => {
                f.write_str("b'")?;
                for byte in v.iter() {
                    write!(f, "{:02X}", byte)?;
                }
                f.write_str("'")
            }
            Value::Timestamp(Some(v)) => write!(f, "{}", v),
            Value::Date(Some(v)) => write!(f, "{}", v),
            Value::Array(Some(values), ..) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            _ => f.write_str("NULL"),
        }
    }
}

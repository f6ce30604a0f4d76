use crate::{AsValue, Error, ExtrudeError, Result, Value, as_value::cannot_convert};
use std::{
    any::{self, TypeId},
    sync::Arc,
};
use time::{Date, OffsetDateTime};

/// Static description of a type, produced by [`Reflect::type_info`].
#[derive(Clone, Copy, Debug)]
pub struct TypeInfo {
    /// Full type name, as reported by `std::any::type_name`.
    pub name: &'static str,
    pub kind: Kind,
}

#[derive(Clone, Copy, Debug)]
pub enum Kind {
    Struct(StructInfo),
    Scalar(Scalar),
    /// `Option<T>`.
    Nullable(fn() -> TypeInfo),
    /// `Vec<T>` and `[T; N]`.
    Sequence(fn() -> TypeInfo),
    /// `Box<T>`, `Arc<T>`, `&T`, `&mut T`.
    Pointer(fn() -> TypeInfo),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
    Timestamp,
    Date,
}

#[derive(Clone, Copy, Debug)]
pub struct StructInfo {
    pub id: TypeId,
    /// Declared identifier of the struct.
    pub name: &'static str,
    /// Named fields in declaration order.
    pub fields: &'static [FieldInfo],
}

#[derive(Clone, Copy, Debug)]
pub struct FieldInfo {
    pub ident: &'static str,
    /// Declaration index, the argument to [`Reflect::field`].
    pub index: usize,
    /// Visibility other than inherited.
    pub public: bool,
    pub embedded: bool,
    pub attributes: FieldAttributes,
    /// Absent for fields the derive does not map.
    pub type_info: Option<fn() -> TypeInfo>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldAttributes {
    pub column: Option<&'static str>,
    pub excluded: bool,
    pub primary_key: bool,
    /// Declared maximum length, 0 means `MAX`.
    pub length: u32,
}

impl TypeInfo {
    /// Remove every pointer layer.
    pub fn strip_pointers(self) -> TypeInfo {
        let mut info = self;
        while let Kind::Pointer(inner) = info.kind {
            info = inner();
        }
        info
    }

    pub fn as_struct(&self) -> Option<&StructInfo> {
        match &self.kind {
            Kind::Struct(info) => Some(info),
            _ => None,
        }
    }

    pub fn is_byte(&self) -> bool {
        matches!(self.kind, Kind::Scalar(Scalar::U8))
    }
}

#[doc(hidden)]
pub trait AsReflect {
    fn as_reflect(&self) -> &dyn Reflect;
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;
    fn reflect_type(&self) -> TypeInfo;
}

impl<T: Reflect> AsReflect for T {
    fn as_reflect(&self) -> &dyn Reflect {
        self
    }
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }
    fn reflect_type(&self) -> TypeInfo {
        T::type_info()
    }
}

/// Runtime introspection over records, scalars and their containers.
///
/// Records implement it with `#[derive(Reflect)]`, which generates the static
/// field table and the positional field accessors. The crate provides the
/// implementations for the supported scalars, `Option<T>`, `Vec<T>`, `[T; N]`
/// and the pointer wrappers.
pub trait Reflect: AsReflect + Send + Sync {
    fn type_info() -> TypeInfo
    where
        Self: Sized;

    /// Build a value of this type out of a column value.
    fn from_value(value: Value) -> Result<Self>
    where
        Self: Sized,
    {
        Err(cannot_convert::<Self>(&value))
    }

    /// Typed NULL of the column this type maps to.
    fn empty_value() -> Value
    where
        Self: Sized,
    {
        Value::Null
    }

    /// The value behind every pointer layer.
    fn target(&self) -> &dyn Reflect {
        self.as_reflect()
    }

    fn target_mut(&mut self) -> &mut dyn Reflect {
        self.as_reflect_mut()
    }

    /// Field at the declaration index.
    fn field(&self, _index: usize) -> Option<&dyn Reflect> {
        None
    }

    fn field_mut(&mut self, _index: usize) -> Option<&mut dyn Reflect> {
        None
    }

    /// Number of elements, `None` when this is not a sequence.
    fn sequence_len(&self) -> Option<usize> {
        None
    }

    fn element(&self, _index: usize) -> Option<&dyn Reflect> {
        None
    }

    fn element_mut(&mut self, _index: usize) -> Option<&mut dyn Reflect> {
        None
    }

    fn get_value(&self) -> Result<Value> {
        Err(not_a_value(self.reflect_type().name))
    }

    fn set_value(&mut self, _value: Value) -> Result<()> {
        Err(not_a_value(self.reflect_type().name))
    }
}

fn not_a_value(found: &'static str) -> Error {
    ExtrudeError::TypeMismatch {
        expected: "a column value",
        found,
    }
    .into()
}

macro_rules! impl_reflect_scalar {
    ($($source:ty => $scalar:ident),+ $(,)?) => {$(
        impl Reflect for $source {
            fn type_info() -> TypeInfo {
                TypeInfo {
                    name: any::type_name::<Self>(),
                    kind: Kind::Scalar(Scalar::$scalar),
                }
            }
            fn from_value(value: Value) -> Result<Self> {
                <Self as AsValue>::try_from_value(value)
            }
            fn empty_value() -> Value {
                <Self as AsValue>::as_empty_value()
            }
            fn get_value(&self) -> Result<Value> {
                Ok(<Self as Clone>::clone(self).as_value())
            }
            fn set_value(&mut self, value: Value) -> Result<()> {
                *self = <Self as AsValue>::try_from_value(value)?;
                Ok(())
            }
        }
    )+};
}
impl_reflect_scalar!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    f32 => F32,
    f64 => F64,
    String => String,
    OffsetDateTime => Timestamp,
    Date => Date,
);

// Written as INT64 and range checked both ways, u64 has no column mapping.
macro_rules! impl_reflect_unsigned {
    ($($source:ty => $scalar:ident),+ $(,)?) => {$(
        impl Reflect for $source {
            fn type_info() -> TypeInfo {
                TypeInfo {
                    name: any::type_name::<Self>(),
                    kind: Kind::Scalar(Scalar::$scalar),
                }
            }
            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Int64(Some(v)) => <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {}: i64 is out of range for {}",
                            v,
                            any::type_name::<Self>()
                        ))
                    }),
                    _ => Err(cannot_convert::<Self>(&value)),
                }
            }
            fn empty_value() -> Value {
                Value::Int64(None)
            }
            fn get_value(&self) -> Result<Value> {
                i64::try_from(*self)
                    .map(|v| Value::Int64(Some(v)))
                    .map_err(|_| {
                        Error::msg(format!(
                            "Value {}: {} is out of range for i64",
                            self,
                            any::type_name::<Self>()
                        ))
                    })
            }
            fn set_value(&mut self, value: Value) -> Result<()> {
                *self = Self::from_value(value)?;
                Ok(())
            }
        }
    )+};
}
impl_reflect_unsigned!(u64 => U64, usize => Usize);

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo {
            name: any::type_name::<Self>(),
            kind: Kind::Nullable(T::type_info),
        }
    }
    fn from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(T::from_value(value)?)
        })
    }
    fn empty_value() -> Value {
        T::empty_value()
    }
    fn get_value(&self) -> Result<Value> {
        match self {
            Some(v) => v.get_value(),
            None => Ok(T::empty_value()),
        }
    }
    fn set_value(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        match self {
            Some(v) => v.set_value(value),
            None => {
                *self = Some(T::from_value(value)?);
                Ok(())
            }
        }
    }
}

/// Sequences of `u8`, behind any pointer layer, are BYTES.
fn is_byte_sequence<T: Reflect>() -> bool {
    T::type_info().strip_pointers().is_byte()
}

fn sequence_from_value<S: ?Sized, T: Reflect>(value: Value) -> Result<Vec<T>> {
    match value {
        Value::Bytes(Some(bytes)) if is_byte_sequence::<T>() => bytes
            .iter()
            .map(|b| T::from_value(Value::Int64(Some(*b as i64))))
            .collect(),
        Value::Array(Some(values), ..) => {
            values.into_vec().into_iter().map(T::from_value).collect()
        }
        v if v.is_null() => Ok(Vec::new()),
        v => Err(cannot_convert::<S>(&v)),
    }
}

fn sequence_empty_value<T: Reflect>() -> Value {
    if is_byte_sequence::<T>() {
        Value::Bytes(None)
    } else {
        Value::Array(None, Box::new(T::empty_value()))
    }
}

fn sequence_value<T: Reflect>(items: &[T]) -> Result<Value> {
    if is_byte_sequence::<T>() {
        let bytes = items
            .iter()
            .map(|v| u8::try_from_value(v.get_value()?))
            .collect::<Result<Box<[u8]>>>()?;
        return Ok(Value::Bytes(Some(bytes)));
    }
    let values = items
        .iter()
        .map(|v| v.get_value())
        .collect::<Result<Box<[Value]>>>()?;
    Ok(Value::Array(Some(values), Box::new(T::empty_value())))
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo {
            name: any::type_name::<Self>(),
            kind: Kind::Sequence(T::type_info),
        }
    }
    fn from_value(value: Value) -> Result<Self> {
        sequence_from_value::<Self, T>(value)
    }
    fn empty_value() -> Value {
        sequence_empty_value::<T>()
    }
    fn sequence_len(&self) -> Option<usize> {
        Some(self.len())
    }
    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|v| v as &mut dyn Reflect)
    }
    fn get_value(&self) -> Result<Value> {
        sequence_value(self.as_slice())
    }
    fn set_value(&mut self, value: Value) -> Result<()> {
        *self = Self::from_value(value)?;
        Ok(())
    }
}

/// Writes fail unless the value holds exactly `N` elements, NULL holds none.
impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo {
            name: any::type_name::<Self>(),
            kind: Kind::Sequence(T::type_info),
        }
    }
    fn from_value(value: Value) -> Result<Self> {
        let values = sequence_from_value::<Self, T>(value)?;
        let len = values.len();
        values.try_into().map_err(|_| {
            Error::msg(format!(
                "Expected {} elements for {}, found {}",
                N,
                any::type_name::<Self>(),
                len
            ))
        })
    }
    fn empty_value() -> Value {
        sequence_empty_value::<T>()
    }
    fn sequence_len(&self) -> Option<usize> {
        Some(N)
    }
    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|v| v as &mut dyn Reflect)
    }
    fn get_value(&self) -> Result<Value> {
        sequence_value(self.as_slice())
    }
    fn set_value(&mut self, value: Value) -> Result<()> {
        *self = Self::from_value(value)?;
        Ok(())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> TypeInfo {
        TypeInfo {
            name: any::type_name::<Self>(),
            kind: Kind::Pointer(T::type_info),
        }
    }
    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }
    fn empty_value() -> Value {
        T::empty_value()
    }
    fn target(&self) -> &dyn Reflect {
        (**self).target()
    }
    fn target_mut(&mut self) -> &mut dyn Reflect {
        (**self).target_mut()
    }
    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        (**self).field(index)
    }
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        (**self).field_mut(index)
    }
    fn sequence_len(&self) -> Option<usize> {
        (**self).sequence_len()
    }
    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        (**self).element(index)
    }
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        (**self).element_mut(index)
    }
    fn get_value(&self) -> Result<Value> {
        (**self).get_value()
    }
    fn set_value(&mut self, value: Value) -> Result<()> {
        (**self).set_value(value)
    }
}

/// Writes go through `Arc::get_mut` and fail while the value is shared.
impl<T: Reflect> Reflect for Arc<T> {
    fn type_info() -> TypeInfo {
        TypeInfo {
            name: any::type_name::<Self>(),
            kind: Kind::Pointer(T::type_info),
        }
    }
    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Arc::new)
    }
    fn empty_value() -> Value {
        T::empty_value()
    }
    fn target(&self) -> &dyn Reflect {
        (**self).target()
    }
    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        (**self).field(index)
    }
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        Arc::get_mut(self)?.field_mut(index)
    }
    fn sequence_len(&self) -> Option<usize> {
        (**self).sequence_len()
    }
    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        (**self).element(index)
    }
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        Arc::get_mut(self)?.element_mut(index)
    }
    fn get_value(&self) -> Result<Value> {
        (**self).get_value()
    }
    fn set_value(&mut self, value: Value) -> Result<()> {
        match Arc::get_mut(self) {
            Some(v) => v.set_value(value),
            None => Err(Error::msg(format!(
                "Cannot write through a shared {}",
                any::type_name::<Self>()
            ))),
        }
    }
}

impl<T: Reflect> Reflect for &T {
    fn type_info() -> TypeInfo {
        TypeInfo {
            name: any::type_name::<Self>(),
            kind: Kind::Pointer(T::type_info),
        }
    }
    fn empty_value() -> Value {
        T::empty_value()
    }
    fn target(&self) -> &dyn Reflect {
        (**self).target()
    }
    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        (**self).field(index)
    }
    fn sequence_len(&self) -> Option<usize> {
        (**self).sequence_len()
    }
    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        (**self).element(index)
    }
    fn get_value(&self) -> Result<Value> {
        (**self).get_value()
    }
}

impl<T: Reflect> Reflect for &mut T {
    fn type_info() -> TypeInfo {
        TypeInfo {
            name: any::type_name::<Self>(),
            kind: Kind::Pointer(T::type_info),
        }
    }
    fn empty_value() -> Value {
        T::empty_value()
    }
    fn target(&self) -> &dyn Reflect {
        (**self).target()
    }
    fn target_mut(&mut self) -> &mut dyn Reflect {
        (**self).target_mut()
    }
    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        (**self).field(index)
    }
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        (**self).field_mut(index)
    }
    fn sequence_len(&self) -> Option<usize> {
        (**self).sequence_len()
    }
    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        (**self).element(index)
    }
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        (**self).element_mut(index)
    }
    fn get_value(&self) -> Result<Value> {
        (**self).get_value()
    }
    fn set_value(&mut self, value: Value) -> Result<()> {
        (**self).set_value(value)
    }
}

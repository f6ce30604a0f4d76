use crate::{
    ExtrudeError, FieldInfo, Kind, Reflect, Result, RowNames, Scalar, StructInfo, TypeInfo,
};
use std::{
    any::TypeId,
    fmt::{self, Display, Formatter},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int64,
    String,
    Bool,
    Float64,
    Bytes,
    Timestamp,
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int64 => "INT64",
            ColumnType::String => "STRING",
            ColumnType::Bool => "BOOL",
            ColumnType::Float64 => "FLOAT64",
            ColumnType::Bytes => "BYTES",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Date => "DATE",
        }
    }

    /// Only STRING and BYTES carry a length, `(N)` or `(MAX)`.
    pub fn has_length(&self) -> bool {
        matches!(self, ColumnType::String | ColumnType::Bytes)
    }

    /// Column type of a scalar, `None` for the ones without a mapping.
    pub fn from_scalar(scalar: Scalar) -> Option<ColumnType> {
        Some(match scalar {
            Scalar::Bool => ColumnType::Bool,
            Scalar::I8
            | Scalar::I16
            | Scalar::I32
            | Scalar::I64
            | Scalar::Isize
            | Scalar::U8
            | Scalar::U16
            | Scalar::U32
            | Scalar::Usize => ColumnType::Int64,
            Scalar::U64 => return None,
            Scalar::F32 | Scalar::F64 => ColumnType::Float64,
            Scalar::String => ColumnType::String,
            Scalar::Timestamp => ColumnType::Timestamp,
            Scalar::Date => ColumnType::Date,
        })
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one field maps to one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub column_index: usize,
    /// Declaration indexes leading from the record to the field, through the embedded records.
    pub path: Box<[usize]>,
    pub column_type: ColumnType,
    pub array: bool,
    pub nullable: bool,
    /// Declared maximum length, 0 means `MAX`.
    pub length: u32,
    pub primary_key: bool,
    pub type_name: &'static str,
}

impl FieldDescriptor {
    /// Read accessor for this field of `instance`.
    pub fn value<'a>(&self, instance: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        self.path
            .iter()
            .try_fold(instance.target(), |v, i| v.field(*i))
    }

    /// Write accessor for this field of `instance`.
    pub fn value_mut<'a>(&self, instance: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        self.path
            .iter()
            .try_fold(instance.target_mut(), |v, i| v.field_mut(*i))
    }
}

/// Cached mapping of a record type to its table.
#[derive(Debug)]
pub struct TypeDescriptor {
    pub(crate) id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) table: &'static str,
    pub(crate) fields: Box<[FieldDescriptor]>,
    pub(crate) primary_key: Box<[usize]>,
    pub(crate) labels: RowNames,
}

impl TypeDescriptor {
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Table name, the record's declared identifier.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Column mappings in column index order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|v| v.name == name)
    }

    /// Primary key columns in traversal order.
    pub fn primary_key(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.primary_key.iter().map(|i| &self.fields[*i])
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|v| v.name)
    }

    /// Column names shared by every row produced from this descriptor.
    pub fn labels(&self) -> &RowNames {
        &self.labels
    }

    /// Fails unless `instance`, with pointers removed, is a value of the described type.
    pub fn check(&self, instance: &dyn Reflect) -> Result<()> {
        let found = instance.target().reflect_type();
        match found.as_struct() {
            Some(info) if info.id == self.id => Ok(()),
            _ => Err(ExtrudeError::TypeMismatch {
                expected: self.type_name,
                found: found.name,
            }
            .into()),
        }
    }

    pub(crate) fn build(info: &TypeInfo) -> Result<TypeDescriptor> {
        let resolved = info.strip_pointers();
        let Some(record) = resolved.as_struct() else {
            return Err(ExtrudeError::NotAStruct {
                type_name: info.name,
            }
            .into());
        };
        let mut builder = Builder {
            table: record.name,
            fields: Vec::new(),
            path: Vec::new(),
            embedding: vec![record.id],
        };
        builder.walk(record)?;
        let fields = builder.fields.into_boxed_slice();
        let primary_key = fields
            .iter()
            .filter(|v| v.primary_key)
            .map(|v| v.column_index)
            .collect();
        let labels = fields.iter().map(|v| v.name.to_string()).collect();
        Ok(TypeDescriptor {
            id: record.id,
            type_name: resolved.name,
            table: record.name,
            fields,
            primary_key,
            labels,
        })
    }
}

struct Builder {
    table: &'static str,
    fields: Vec<FieldDescriptor>,
    path: Vec<usize>,
    embedding: Vec<TypeId>,
}

impl Builder {
    fn walk(&mut self, record: &StructInfo) -> Result<()> {
        for field in record.fields {
            if !field.public && !field.embedded {
                continue;
            }
            if field.attributes.excluded {
                continue;
            }
            let Some(type_info) = field.type_info else {
                continue;
            };
            let type_info = type_info();
            self.path.push(field.index);
            if field.embedded {
                self.embed(record, field, &type_info)?;
            } else {
                self.column(field, &type_info)?;
            }
            self.path.pop();
        }
        Ok(())
    }

    fn embed(&mut self, owner: &StructInfo, field: &FieldInfo, info: &TypeInfo) -> Result<()> {
        let Some(inner) = info.strip_pointers().as_struct().copied() else {
            return Err(ExtrudeError::UnsupportedType {
                field: field.ident,
                type_name: info.name,
            }
            .into());
        };
        if self.embedding.contains(&inner.id) {
            return Err(ExtrudeError::RecursiveEmbedding {
                type_name: owner.name,
                field: field.ident,
            }
            .into());
        }
        self.embedding.push(inner.id);
        self.walk(&inner)?;
        self.embedding.pop();
        Ok(())
    }

    fn column(&mut self, field: &FieldInfo, info: &TypeInfo) -> Result<()> {
        let Some(shape) = resolve(info) else {
            return Err(ExtrudeError::UnsupportedType {
                field: field.ident,
                type_name: info.name,
            }
            .into());
        };
        let name = field.attributes.column.unwrap_or(field.ident);
        if self.fields.iter().any(|v| v.name == name) {
            return Err(ExtrudeError::DuplicateColumn {
                table: self.table,
                column: name,
            }
            .into());
        }
        let length = field.attributes.length;
        if length != 0 && !shape.column_type.has_length() {
            return Err(ExtrudeError::InvalidLength {
                column: name,
                column_type: shape.column_type,
            }
            .into());
        }
        self.fields.push(FieldDescriptor {
            name,
            column_index: self.fields.len(),
            path: self.path.as_slice().into(),
            column_type: shape.column_type,
            array: shape.array,
            nullable: shape.nullable,
            length,
            primary_key: field.attributes.primary_key,
            type_name: info.name,
        });
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Shape {
    pub(crate) column_type: ColumnType,
    pub(crate) array: bool,
    pub(crate) nullable: bool,
}

/// Column shape of a field type, `None` when it has no mapping.
pub(crate) fn resolve(info: &TypeInfo) -> Option<Shape> {
    shape(info, false, false)
}

fn shape(info: &TypeInfo, in_option: bool, in_array: bool) -> Option<Shape> {
    match info.kind {
        Kind::Pointer(inner) => shape(&inner(), in_option, in_array),
        Kind::Scalar(scalar) => Some(Shape {
            column_type: ColumnType::from_scalar(scalar)?,
            array: in_array,
            nullable: in_option,
        }),
        Kind::Nullable(inner) => {
            if in_option {
                return None;
            }
            shape(&inner(), true, in_array)
        }
        Kind::Sequence(inner) => {
            if in_array {
                return None;
            }
            let element = inner();
            if element.strip_pointers().is_byte() {
                return Some(Shape {
                    column_type: ColumnType::Bytes,
                    array: false,
                    nullable: in_option,
                });
            }
            let element = shape(&element, false, true)?;
            Some(Shape {
                nullable: in_option || element.nullable,
                ..element
            })
        }
        Kind::Struct(..) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::OffsetDateTime;

    fn shape_of<T: Reflect>() -> Option<Shape> {
        resolve(&T::type_info())
    }

    #[test]
    fn scalars_are_not_null() {
        let expected = |column_type| {
            Some(Shape {
                column_type,
                array: false,
                nullable: false,
            })
        };
        assert_eq!(shape_of::<i8>(), expected(ColumnType::Int64));
        assert_eq!(shape_of::<u32>(), expected(ColumnType::Int64));
        assert_eq!(shape_of::<f32>(), expected(ColumnType::Float64));
        assert_eq!(shape_of::<bool>(), expected(ColumnType::Bool));
        assert_eq!(shape_of::<String>(), expected(ColumnType::String));
        assert_eq!(shape_of::<Vec<u8>>(), expected(ColumnType::Bytes));
        assert_eq!(
            shape_of::<OffsetDateTime>(),
            expected(ColumnType::Timestamp)
        );
        assert_eq!(shape_of::<Box<Arc<i64>>>(), expected(ColumnType::Int64));
    }

    #[test]
    fn nullable_and_arrays() {
        assert_eq!(
            shape_of::<Option<String>>(),
            Some(Shape {
                column_type: ColumnType::String,
                array: false,
                nullable: true,
            })
        );
        assert_eq!(
            shape_of::<Vec<Option<String>>>(),
            Some(Shape {
                column_type: ColumnType::String,
                array: true,
                nullable: true,
            })
        );
        assert_eq!(
            shape_of::<Vec<i64>>(),
            Some(Shape {
                column_type: ColumnType::Int64,
                array: true,
                nullable: false,
            })
        );
        assert_eq!(
            shape_of::<Option<Vec<u8>>>(),
            Some(Shape {
                column_type: ColumnType::Bytes,
                array: false,
                nullable: true,
            })
        );
        assert_eq!(
            shape_of::<Option<Vec<bool>>>(),
            Some(Shape {
                column_type: ColumnType::Bool,
                array: true,
                nullable: true,
            })
        );
    }

    #[test]
    fn unmapped_types() {
        assert_eq!(shape_of::<u64>(), None);
        assert_eq!(shape_of::<Option<Option<i64>>>(), None);
        assert_eq!(shape_of::<Vec<Vec<i64>>>(), None);
        assert_eq!(shape_of::<Vec<Vec<u8>>>(), None);
        assert_eq!(shape_of::<Vec<Option<Option<bool>>>>(), None);
    }
}

use crate::{ColumnType, Key};
use thiserror::Error;

/// Failures reported by descriptor construction, translation and the session.
///
/// These travel inside [`crate::Error`] and can be recovered with
/// `error.downcast_ref::<ExtrudeError>()`.
#[derive(Debug, Error)]
pub enum ExtrudeError {
    /// The described type is not a record, even after removing pointer layers.
    #[error("Type `{type_name}` is not a struct")]
    NotAStruct { type_name: &'static str },

    /// A field has a type with no column mapping.
    #[error("Field `{field}` has unsupported type `{type_name}`")]
    UnsupportedType {
        field: &'static str,
        type_name: &'static str,
    },

    /// An instance was given to a descriptor of a different type.
    #[error("Expected a value of type `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A multi-record operation received something other than a sequence.
    #[error("Expected a sequence of records, found `{type_name}`")]
    UnsupportedShape { type_name: &'static str },

    /// A record embeds itself, directly or through another embedded record.
    #[error("Type `{type_name}` embeds itself through field `{field}`")]
    RecursiveEmbedding {
        type_name: &'static str,
        field: &'static str,
    },

    /// Two columns of the same table resolve to the same name.
    #[error("Table `{table}` declares column `{column}` more than once")]
    DuplicateColumn {
        table: &'static str,
        column: &'static str,
    },

    /// A declared length on a column type that has none.
    #[error("Column `{column}` of type {column_type} cannot declare a length")]
    InvalidLength {
        column: &'static str,
        column_type: ColumnType,
    },

    /// A read did not return the row for this key.
    #[error("Row {key} was not found")]
    NotFound { key: Key },
}

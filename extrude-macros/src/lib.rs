mod decode_field;
mod decode_record;
mod encode_reflect;

use decode_record::decode_record;
use encode_reflect::encode_reflect;
use proc_macro::TokenStream;
use syn::{ItemStruct, parse_macro_input};

/// Derive `extrude::Reflect` for a struct with named fields.
///
/// Field attributes, all inside `#[extrude(...)]`:
/// - `column = "Name"` column name, `column = "-"` excludes the field
/// - `skip` excludes the field
/// - `id` the field is part of the primary key
/// - `embed` the fields of this record are inlined into the owner
/// - `length = N` maximum length of a STRING or BYTES column
///
/// Only `pub` fields and embedded records become columns.
#[proc_macro_derive(Reflect, attributes(extrude))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemStruct);
    match decode_record(item) {
        Ok(record) => encode_reflect(&record).into(),
        Err(e) => e.into_compile_error().into(),
    }
}

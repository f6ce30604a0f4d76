use crate::{FieldDescriptor, TypeDescriptor, separated_by};

/// Append the `CREATE TABLE` statement of `descriptor` to `out`.
///
/// Every column sits on its own line, tab indented and followed by a comma:
/// ```text
/// CREATE TABLE Article (
/// 	ID	INT64	NOT NULL,
/// 	Title	STRING(MAX)	NOT NULL,
/// ) PRIMARY KEY (ID)
/// ```
pub fn write_create_table(out: &mut String, descriptor: &TypeDescriptor) {
    let estimated = 64 + descriptor.fields().len() * 48 + descriptor.primary_key.len() * 16;
    out.reserve(estimated);
    out.push_str("CREATE TABLE ");
    out.push_str(descriptor.table());
    out.push_str(" (\n");
    for field in descriptor.fields() {
        out.push('\t');
        write_column(out, field);
        out.push_str(",\n");
    }
    out.push_str(") PRIMARY KEY (");
    separated_by(
        out,
        descriptor.primary_key(),
        |out, v| out.push_str(v.name),
        ", ",
    );
    out.push(')');
}

/// Column definition: name, type and the `NOT NULL` constraint, tab separated.
pub fn write_column(out: &mut String, field: &FieldDescriptor) {
    out.push_str(field.name);
    out.push('\t');
    if field.array {
        out.push_str("ARRAY<");
    }
    write_column_type(out, field);
    if field.array {
        out.push('>');
    }
    if !field.nullable {
        out.push_str("\tNOT NULL");
    }
}

pub fn write_column_type(out: &mut String, field: &FieldDescriptor) {
    out.push_str(field.column_type.as_str());
    if field.column_type.has_length() {
        if field.length == 0 {
            out.push_str("(MAX)");
        } else {
            out.push('(');
            out.push_str(&field.length.to_string());
            out.push(')');
        }
    }
}

impl TypeDescriptor {
    pub fn create_table(&self) -> String {
        let mut out = String::new();
        write_create_table(&mut out, self);
        out
    }
}

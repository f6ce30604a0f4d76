use crate::decode_field::{FieldMetadata, decode_field};
use syn::{Error, Fields, ItemStruct, Result, ext::IdentExt, spanned::Spanned};

pub(crate) struct RecordMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldMetadata>,
}

pub(crate) fn decode_record(item: ItemStruct) -> Result<RecordMetadata> {
    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Reflect cannot be derived for generic structs",
        ));
    }
    if let Some(attr) = item.attrs.iter().find(|v| v.path().is_ident("extrude")) {
        return Err(Error::new(
            attr.span(),
            "`extrude` attributes belong on the fields, not on the struct",
        ));
    }
    let Fields::Named(named) = &item.fields else {
        return Err(Error::new(
            item.fields.span(),
            "Reflect can only be derived for structs with named fields",
        ));
    };
    let fields = named
        .named
        .iter()
        .enumerate()
        .map(|(i, f)| decode_field(f, i))
        .collect::<Result<Vec<_>>>()?;
    Ok(RecordMetadata {
        name: item.ident.unraw().to_string(),
        item,
        fields,
    })
}

use quote::ToTokens;
use syn::{
    Error, Field, Ident, LitInt, LitStr, Result, Type, Visibility, ext::IdentExt,
    parse::ParseBuffer, spanned::Spanned,
};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    /// Identifier without the raw prefix.
    pub(crate) name: String,
    pub(crate) index: usize,
    pub(crate) ty: Type,
    pub(crate) public: bool,
    pub(crate) embedded: bool,
    pub(crate) column: Option<String>,
    pub(crate) excluded: bool,
    pub(crate) primary_key: bool,
    pub(crate) length: u32,
}

impl FieldMetadata {
    /// Fields the descriptor can reach: visible or embedded, and not excluded.
    pub(crate) fn mapped(&self) -> bool {
        !self.excluded && (self.public || self.embedded)
    }
}

pub(crate) fn decode_field(field: &Field, index: usize) -> Result<FieldMetadata> {
    let Some(ident) = field.ident.clone() else {
        return Err(Error::new(field.span(), "Field is expected to have a name"));
    };
    let mut metadata = FieldMetadata {
        name: ident.unraw().to_string(),
        ident,
        index,
        ty: field.ty.clone(),
        public: !matches!(field.vis, Visibility::Inherited),
        embedded: false,
        column: None,
        excluded: false,
        primary_key: false,
        length: 0,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("extrude") {
            continue;
        }
        let list = meta.require_list().map_err(|e| {
            Error::new(
                e.span(),
                "Error while parsing `extrude`, use it like: `#[extrude(attribute = value, ...)]`",
            )
        })?;
        list.parse_nested_meta(|arg| {
            if arg.path.is_ident("column") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    return Err(arg.error(
                        "Error while parsing `column`, use it like: `#[extrude(column = \"Name\")]`",
                    ));
                };
                let v = v.value();
                if v == "-" {
                    metadata.excluded = true;
                } else if v.is_empty() {
                    return Err(arg.error("Column name cannot be empty"));
                } else {
                    metadata.column = Some(v);
                }
            } else if arg.path.is_ident("skip") {
                // value() is Err for Meta::Path
                let Err(..) = arg.value() else {
                    return Err(arg.error(
                        "Error while parsing `skip`, use it like: `#[extrude(skip)]`",
                    ));
                };
                metadata.excluded = true;
            } else if arg.path.is_ident("id") {
                let Err(..) = arg.value() else {
                    return Err(
                        arg.error("Error while parsing `id`, use it like: `#[extrude(id)]`")
                    );
                };
                metadata.primary_key = true;
            } else if arg.path.is_ident("embed") {
                let Err(..) = arg.value() else {
                    return Err(
                        arg.error("Error while parsing `embed`, use it like: `#[extrude(embed)]`")
                    );
                };
                metadata.embedded = true;
            } else if arg.path.is_ident("length") {
                let Ok(v) = arg
                    .value()
                    .and_then(ParseBuffer::parse::<LitInt>)
                    .and_then(|v| v.base10_parse::<u32>())
                else {
                    return Err(arg.error(
                        "Error while parsing `length`, use it like: `#[extrude(length = 255)]`",
                    ));
                };
                metadata.length = v;
            } else {
                return Err(arg.error(format!(
                    "Unknown attribute `{}` inside extrude macro",
                    arg.path.to_token_stream()
                )));
            }
            Ok(())
        })?;
    }
    if metadata.embedded
        && (metadata.column.is_some() || metadata.primary_key || metadata.length != 0)
    {
        return Err(Error::new(
            field.span(),
            format!(
                "Embedded field `{}` cannot declare `column`, `id` or `length`",
                metadata.name
            ),
        ));
    }
    if !metadata.public
        && !metadata.embedded
        && !metadata.excluded
        && (metadata.column.is_some() || metadata.primary_key || metadata.length != 0)
    {
        return Err(Error::new(
            field.span(),
            format!(
                "Field `{}` is not pub, `column`, `id` and `length` have no effect on it",
                metadata.name
            ),
        ));
    }
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{ItemStruct, parse_quote};

    fn decode(item: ItemStruct) -> Result<FieldMetadata> {
        let field = item.fields.iter().next().expect("One field is expected");
        decode_field(field, 0)
    }

    #[test]
    fn public_field_attributes() {
        let metadata = decode(parse_quote! {
            struct Record {
                #[extrude(id, column = "Key", length = 16)]
                pub r#key: String,
            }
        })
        .unwrap();
        assert_eq!(metadata.name, "key");
        assert_eq!(metadata.column.as_deref(), Some("Key"));
        assert!(metadata.primary_key);
        assert_eq!(metadata.length, 16);
        assert!(metadata.mapped());
    }

    #[test]
    fn private_field_attributes() {
        for item in [
            parse_quote! { struct Record { #[extrude(id)] id: i64 } },
            parse_quote! { struct Record { #[extrude(column = "Name")] name: String } },
            parse_quote! { struct Record { #[extrude(length = 8)] code: String } },
        ] {
            let error = decode(item).err().expect("Private field attributes must fail");
            assert!(error.to_string().contains("is not pub"), "{}", error);
        }
        let metadata = decode(parse_quote! { struct Record { #[extrude(skip)] cache: u64 } })
            .unwrap();
        assert!(!metadata.mapped());
        let metadata = decode(parse_quote! { struct Record { hidden: i32 } }).unwrap();
        assert!(!metadata.mapped());
    }

    #[test]
    fn unknown_and_conflicting_attributes() {
        let error = decode(parse_quote! { struct Record { #[extrude(index)] pub id: i64 } })
            .err()
            .expect("Unknown attributes must fail");
        assert!(error.to_string().contains("Unknown attribute `index`"), "{}", error);
        let error = decode(parse_quote! {
            struct Record {
                #[extrude(embed, id)]
                pub inner: Inner,
            }
        })
        .err()
        .expect("Embedded fields cannot be keys");
        assert!(error.to_string().contains("cannot declare"), "{}", error);
    }
}

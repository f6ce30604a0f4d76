use crate::decode_record::RecordMetadata;
use proc_macro2::TokenStream;
use quote::quote;

fn quote_option(value: &Option<String>) -> TokenStream {
    match value {
        None => quote! { None },
        Some(v) => quote! { Some(#v) },
    }
}

pub(crate) fn encode_reflect(record: &RecordMetadata) -> TokenStream {
    let ident = &record.item.ident;
    let name = &record.name;
    let count = record.fields.len();
    let infos = record.fields.iter().map(|f| {
        let field = &f.name;
        let index = f.index;
        let public = f.public;
        let embedded = f.embedded;
        let column = quote_option(&f.column);
        let excluded = f.excluded;
        let primary_key = f.primary_key;
        let length = f.length;
        let type_info = if f.mapped() {
            let ty = &f.ty;
            quote!(Some(<#ty as ::extrude::Reflect>::type_info as fn() -> ::extrude::TypeInfo))
        } else {
            quote!(None)
        };
        quote! {
            ::extrude::FieldInfo {
                ident: #field,
                index: #index,
                public: #public,
                embedded: #embedded,
                attributes: ::extrude::FieldAttributes {
                    column: #column,
                    excluded: #excluded,
                    primary_key: #primary_key,
                    length: #length,
                },
                type_info: #type_info,
            }
        }
    });
    let mapped = record.fields.iter().filter(|f| f.mapped());
    let field_arms = mapped.clone().map(|f| {
        let index = f.index;
        let field = &f.ident;
        quote!(#index => Some(&self.#field as &dyn ::extrude::Reflect))
    });
    let field_mut_arms = mapped.map(|f| {
        let index = f.index;
        let field = &f.ident;
        quote!(#index => Some(&mut self.#field as &mut dyn ::extrude::Reflect))
    });
    quote! {
        impl ::extrude::Reflect for #ident {
            fn type_info() -> ::extrude::TypeInfo {
                static FIELDS: [::extrude::FieldInfo; #count] = [#(#infos),*];
                ::extrude::TypeInfo {
                    name: ::std::any::type_name::<Self>(),
                    kind: ::extrude::Kind::Struct(::extrude::StructInfo {
                        id: ::std::any::TypeId::of::<Self>(),
                        name: #name,
                        fields: &FIELDS,
                    }),
                }
            }

            fn field(&self, index: usize) -> Option<&dyn ::extrude::Reflect> {
                match index {
                    #(#field_arms,)*
                    _ => None,
                }
            }

            fn field_mut(&mut self, index: usize) -> Option<&mut dyn ::extrude::Reflect> {
                match index {
                    #(#field_mut_arms,)*
                    _ => None,
                }
            }
        }
    }
}

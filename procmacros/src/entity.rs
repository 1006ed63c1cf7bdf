//! `#[derive(Entity)]` implementation.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Error, Field, Ident, Result, Type};
use tabula_types::Annotations;
use tabula_types::mysql::SemanticType;

use crate::common::{
    doc_text, extract_named_fields, has_skip_attribute, reference_target, type_ident,
    unwrap_option,
};
use crate::paths;

/// How a persisted field maps onto its column
enum ColumnKind<'a> {
    Plain(SemanticType),
    Reference(&'a Type),
}

struct ColumnField<'a> {
    ident: &'a Ident,
    column: String,
    ty: &'a Type,
    kind: ColumnKind<'a>,
    nullable: bool,
    doc: String,
    primary_key: bool,
}

impl<'a> ColumnField<'a> {
    fn parse(field: &'a Field) -> Result<Self> {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new_spanned(field, "Entity fields must be named"))?;
        let ty = &field.ty;
        let inner = unwrap_option(ty);
        let nullable = !std::ptr::eq(inner, ty);

        if matches!(inner, Type::Reference(_)) {
            return Err(Error::new_spanned(
                ty,
                "borrowed fields can't be loaded from a row, use an owned type such as String",
            ));
        }

        let kind = match reference_target(inner) {
            Some(target) => ColumnKind::Reference(target),
            None => match type_ident(inner).as_deref().and_then(SemanticType::from_rust_ident) {
                Some(SemanticType::Reference) | None => {
                    return Err(Error::new_spanned(
                        ty,
                        "unsupported column type, expected String, an integer, f32, f64, bool, \
                         NaiveDateTime, Ref<T> or an Option of these; \
                         mark the field #[entity(skip)] to leave it out",
                    ));
                }
                Some(semantic) => ColumnKind::Plain(semantic),
            },
        };

        let doc = doc_text(&field.attrs);
        let annotations = Annotations::parse(&doc)
            .map_err(|err| Error::new_spanned(ident, format!("invalid annotation: {err}")))?;

        Ok(Self {
            ident,
            column: ident.unraw().to_string(),
            ty,
            kind,
            nullable,
            doc,
            primary_key: annotations.primary_key,
        })
    }

    fn declaration(&self) -> TokenStream {
        let field_decl = paths::core::field_decl();
        let column = &self.column;

        let mut decl = match &self.kind {
            ColumnKind::Plain(semantic) => {
                let semantic_type = paths::types::semantic_type();
                let variant = Ident::new(&format!("{semantic:?}"), Span::call_site());
                quote!(#field_decl::typed(#column, #semantic_type::#variant))
            }
            ColumnKind::Reference(target) => quote!(#field_decl::reference::<#target>(#column)),
        };
        if self.nullable {
            decl = quote!(#decl.nullable());
        }
        if !self.doc.is_empty() {
            let doc = &self.doc;
            decl = quote!(#decl.doc(#doc));
        }
        decl
    }
}

pub(crate) fn derive_entity_impl(input: &DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let entity_name = struct_name.unraw().to_string();

    let mut columns = Vec::new();
    let mut skipped = Vec::new();
    for field in extract_named_fields(input)? {
        if has_skip_attribute(field)? {
            skipped.push(field.ident.as_ref());
        } else {
            columns.push(ColumnField::parse(field)?);
        }
    }

    let entity = paths::core::entity();
    let field_decl = paths::core::field_decl();
    let row = paths::core::row();
    let value = paths::core::value();
    let value_error = paths::core::value_error();
    let to_value = paths::core::to_value();
    let from_value = paths::core::from_value();

    let declarations = columns.iter().map(ColumnField::declaration);
    let column_count = columns.len();

    let to_row = columns.iter().map(|c| {
        let (ident, column) = (c.ident, &c.column);
        quote!(row.insert(#column, #to_value::to_value(&self.#ident));)
    });

    let from_row = columns.iter().map(|c| {
        let (ident, column, ty) = (c.ident, &c.column, c.ty);
        quote! {
            #ident: <#ty as #from_value>::from_value(
                row.remove(#column).ok_or_else(|| #value_error::MissingColumn {
                    column: ::std::string::ToString::to_string(#column),
                })?,
                #column,
            )?,
        }
    });

    let assign = columns.iter().map(|c| {
        let (ident, column, ty) = (c.ident, &c.column, c.ty);
        quote! {
            #column => {
                self.#ident = <#ty as #from_value>::from_value(value, column)?;
                ::std::result::Result::Ok(())
            }
        }
    });

    let primary_key = columns.iter().filter(|c| c.primary_key).map(|c| {
        let ident = c.ident;
        quote!(#to_value::to_value(&self.#ident))
    });

    Ok(quote! {
        #[automatically_derived]
        impl #entity for #struct_name {
            const NAME: &'static str = #entity_name;

            fn fields() -> ::std::vec::Vec<#field_decl> {
                ::std::vec![#(#declarations),*]
            }

            fn to_row(&self) -> #row {
                let mut row = #row::with_capacity(#column_count);
                #(#to_row)*
                row
            }

            #[allow(unused_mut)]
            fn from_row(mut row: #row) -> ::std::result::Result<Self, #value_error> {
                ::std::result::Result::Ok(Self {
                    #(#from_row)*
                    #(#skipped: ::std::default::Default::default(),)*
                })
            }

            fn assign(
                &mut self,
                column: &str,
                value: #value,
            ) -> ::std::result::Result<(), #value_error> {
                match column {
                    #(#assign)*
                    _ => ::std::result::Result::Err(#value_error::UnknownColumn {
                        column: ::std::string::ToString::to_string(column),
                    }),
                }
            }

            fn primary_key(&self) -> ::std::vec::Vec<#value> {
                ::std::vec![#(#primary_key),*]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand(input: DeriveInput) -> String {
        derive_entity_impl(&input).unwrap().to_string()
    }

    #[test]
    fn test_car_expansion() {
        let output = expand(parse_quote! {
            struct Car {
                /// @autoIncrement
                /// @primaryKey
                id: u32,
                /// @varchar(50)
                brand: String,
                price: Option<f64>,
                #[entity(skip)]
                cache: Vec<u8>,
            }
        });

        assert!(output.contains("const NAME : & 'static str = \"Car\""));
        assert!(output.contains(
            "tabula :: core :: FieldDecl :: typed (\"id\" , tabula :: types :: mysql :: SemanticType :: Integer)"
        ));
        assert!(output.contains("SemanticType :: Float) . nullable ()"));
        assert!(output.contains(". doc (\" @varchar(50)\")"));
        assert!(output.contains("cache : :: std :: default :: Default :: default ()"));
        assert!(!output.contains("\"cache\""));
        // once in to_row, once in primary_key
        assert_eq!(output.matches("to_value (& self . id)").count(), 2);
        assert_eq!(output.matches("to_value (& self . brand)").count(), 1);
    }

    #[test]
    fn test_reference_field() {
        let output = expand(parse_quote! {
            struct Car {
                /// @onDelete(CASCADE)
                owner: Option<Ref<Person>>,
            }
        });
        assert!(output.contains("FieldDecl :: reference :: < Person > (\"owner\") . nullable ()"));
    }

    #[test]
    fn test_raw_identifier_column() {
        let output = expand(parse_quote! {
            struct Item {
                r#type: String,
            }
        });
        assert!(output.contains("typed (\"type\""));
    }

    #[test]
    fn test_unsupported_type() {
        let input: DeriveInput = parse_quote! {
            struct Car { tags: Vec<String> }
        };
        let err = derive_entity_impl(&input).unwrap_err();
        assert!(err.to_string().starts_with("unsupported column type"));

        let input: DeriveInput = parse_quote! {
            struct Car { brand: &'static str }
        };
        assert!(derive_entity_impl(&input).is_err());
    }

    #[test]
    fn test_invalid_annotation() {
        let input: DeriveInput = parse_quote! {
            struct Car {
                /// @decimal(10)
                price: f64,
            }
        };
        let err = derive_entity_impl(&input).unwrap_err();
        assert!(err.to_string().starts_with("invalid annotation"));
    }
}

//! Shared helper functions for procedural macro code generation.

use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Attribute, Data, DeriveInput, Error, Expr, ExprLit, Field, Fields, Lit, Meta, Result};

/// Named fields of a struct.
///
/// # Errors
///
/// Returns an error for enums, unions, tuple structs, unit structs and
/// generic structs.
pub(crate) fn extract_named_fields(input: &DeriveInput) -> Result<&Punctuated<Field, Comma>> {
    let struct_name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }
    match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(Error::new_spanned(
                struct_name,
                "Entity can only be derived for structs with named fields",
            )),
        },
        _ => Err(Error::new_spanned(
            struct_name,
            "Entity can only be derived for structs",
        )),
    }
}

/// Concatenated `///` lines of an item, one per line
pub(crate) fn doc_text(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether the field carries `#[entity(skip)]`
pub(crate) fn has_skip_attribute(field: &Field) -> Result<bool> {
    let mut skip = false;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("entity")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

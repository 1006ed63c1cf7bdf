//! Centralized path definitions for generated code.
//!
//! Paths use the `tabula::` prefix without a leading `::` so crates inside the
//! workspace can provide a `mod tabula { ... }` shim.

use proc_macro2::TokenStream;
use quote::quote;

pub mod core {
    use super::*;

    pub fn entity() -> TokenStream {
        quote!(tabula::core::Entity)
    }

    pub fn field_decl() -> TokenStream {
        quote!(tabula::core::FieldDecl)
    }

    pub fn row() -> TokenStream {
        quote!(tabula::core::Row)
    }

    pub fn value() -> TokenStream {
        quote!(tabula::core::Value)
    }

    pub fn value_error() -> TokenStream {
        quote!(tabula::core::ValueError)
    }

    pub fn to_value() -> TokenStream {
        quote!(tabula::core::ToValue)
    }

    pub fn from_value() -> TokenStream {
        quote!(tabula::core::FromValue)
    }
}

pub mod types {
    use super::*;

    pub fn semantic_type() -> TokenStream {
        quote!(tabula::types::mysql::SemanticType)
    }
}

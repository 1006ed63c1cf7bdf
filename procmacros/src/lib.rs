//! Derive macros for Tabula entities.

mod common;
mod entity;
mod paths;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derive `Entity` for a struct with named fields.
///
/// Each field becomes a column. Its documentation carries the column
/// annotations, one per line, and the remaining lines become the column
/// comment.
///
/// Supported field types are `String`, `i8`..`i64`, `u8`..`u32`, `f32`,
/// `f64`, `bool`, `chrono::NaiveDateTime`, `Ref<T>` for a foreign key to `T`,
/// and `Option` of any of these for nullable columns. Fields marked
/// `#[entity(skip)]` are not persisted and are filled with `Default::default()`.
///
/// # Example
///
/// ```ignore
/// #[derive(Entity)]
/// struct Car {
///     /// @autoIncrement
///     /// @unsigned
///     /// @primaryKey
///     /// The car identifier.
///     id: u32,
///     /// @varchar(50)
///     brand: String,
///     price: Option<f64>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match entity::derive_entity_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

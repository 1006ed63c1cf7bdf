//! Shared helpers for inspecting derive input.

mod helpers;
mod type_utils;

pub(crate) use helpers::{doc_text, extract_named_fields, has_skip_attribute};
pub(crate) use type_utils::{reference_target, type_ident, unwrap_option};

//! Shared type definitions for Tabula
//!
//! This crate provides the vocabulary used by both the schema engine and the
//! derive macro, including:
//!
//! - MySQL type families and semantic column types in the [`mysql`] module
//! - Referential actions in [`mysql::ddl`]
//! - The doc-comment annotation parser in [`annotation`]
//!
//! # Features
//!
//! - `serde` - Enable serde serialization/deserialization of the vocabulary enums

pub mod annotation;
pub mod mysql;

pub use annotation::{AnnotationError, Annotations};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::annotation::Annotations;
    pub use crate::mysql::ddl::ReferentialAction;
    pub use crate::mysql::{MySqlType, SemanticType, SqlTypeSpec};
}

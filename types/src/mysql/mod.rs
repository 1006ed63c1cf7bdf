//! MySQL type definitions
//!
//! This module provides the MySQL vocabulary shared by the schema engine and
//! the derive macro:
//! - [`MySqlType`] and [`SqlTypeSpec`] - column type families
//! - [`SemanticType`] - Rust-side value kinds and their candidate families
//! - [`ddl::ReferentialAction`] - ON UPDATE / ON DELETE actions

pub mod ddl;
mod sql_type;
mod type_category;

pub use sql_type::{MySqlType, SqlTypeSpec};
pub use type_category::{DEFAULT_VARCHAR_WIDTH, SemanticType};

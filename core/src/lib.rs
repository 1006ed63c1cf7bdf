//! Schema derivation and SQL generation engine for Tabula.
//!
//! Entities describe their fields through [`Entity`]; the [`SchemaRegistry`]
//! turns those declarations into MySQL column definitions, and the
//! [`QueryBuilder`] renders DDL and DML text that a [`Database`] hands to an
//! [`Executor`].

pub mod column;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod escape;
pub mod filter;
pub mod order;
pub mod query;
pub mod reference;
pub mod schema;
pub mod tracing;
pub mod value;

// Re-export key types and traits
pub use column::{Column, ColumnReference, FieldDecl, ReferenceDecl};
pub use config::DatabaseConfig;
pub use database::{Database, ExecutionError, Executor};
pub use entity::Record;
pub use error::{
    ConfigError, PersistenceError, QueryError, Result, SchemaError, TabulaError, ValueError,
};
pub use filter::{CompareOp, Comparison, Filter};
pub use order::{Direction, OrderBy};
pub use query::QueryBuilder;
pub use reference::Ref;
pub use schema::{Entity, EntitySchema, SchemaRegistry};
pub use value::{FromValue, Row, RowSet, ToValue, Value};

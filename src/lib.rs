//! # Tabula
//!
//! Schema derivation and SQL generation for MySQL. Entities are plain structs
//! whose field types and doc-comment annotations describe their columns.
//!
//! ## Quick Start
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! #[derive(Entity)]
//! struct Car {
//!     /// @autoIncrement
//!     /// @primaryKey
//!     id: u32,
//!     /// @varchar(50)
//!     brand: String,
//!     price: Option<f64>,
//! }
//!
//! // Executors own the connection; this one prints and returns nothing
//! struct Echo;
//!
//! impl Executor for Echo {
//!     fn execute(&self, sql: &str) -> std::result::Result<RowSet, ExecutionError> {
//!         println!("{sql}");
//!         Ok(RowSet::new())
//!     }
//!
//!     fn last_inserted_id(&self) -> i64 {
//!         1
//!     }
//! }
//!
//! # fn main() -> tabula::Result<()> {
//! let db = Database::new(&DatabaseConfig::new("garage"), Echo);
//! db.create_table::<Car>(true)?;
//!
//! let mut car = db.instantiate::<Car, _>([Value::from("Volvo"), Value::Null])?;
//! car.save(&db)?;
//! assert_eq!(car.id, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Annotations
//!
//! | Annotation            | Effect                                         |
//! |-----------------------|------------------------------------------------|
//! | `@varchar(50)` etc.   | Explicit MySQL type, checked against the field |
//! | `@primaryKey`         | Part of the primary key                        |
//! | `@autoIncrement`      | Generated by the server on insert              |
//! | `@unique`             | UNIQUE constraint                              |
//! | `@unsigned`           | UNSIGNED numeric column                        |
//! | `@onUpdate(CASCADE)`  | Referential action of a `Ref<T>` column        |
//! | `@onDelete(SET NULL)` | Referential action of a `Ref<T>` column        |
//! | `@comment(text)`      | Column comment                                 |

pub use tabula_core::error::Result;

pub use tabula_core::row;
pub use tabula_macros::Entity;

pub mod error {
    pub use tabula_core::error::{
        ConfigError, PersistenceError, QueryError, SchemaError, TabulaError, ValueError,
    };
    pub use tabula_types::AnnotationError;
}

/// The engine: schemas, values, filters and the database handle
pub use tabula_core as core;

/// MySQL type vocabulary and the annotation parser
pub use tabula_types as types;

pub use tabula_core::{
    Database, DatabaseConfig, Direction, ExecutionError, Executor, Filter, OrderBy, Record, Ref,
    Row, RowSet, Value,
};

/// Import this for entity declarations and everyday queries.
pub mod prelude {
    pub use tabula_macros::Entity;

    pub use tabula_core::row;
    pub use tabula_core::{
        Column, CompareOp, Database, DatabaseConfig, Direction, Entity, ExecutionError, Executor,
        Filter, FromValue, OrderBy, Record, Ref, Row, RowSet, TabulaError, ToValue, Value,
    };
    pub use tabula_types::mysql::ddl::ReferentialAction;
    pub use tabula_types::mysql::{MySqlType, SemanticType};
}

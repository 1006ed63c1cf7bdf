//! Database handle and the executor contract

use std::sync::Arc;

use crate::column::Column;
use crate::config::DatabaseConfig;
use crate::error::{PersistenceError, Result};
use crate::query::QueryBuilder;
use crate::schema::{Entity, EntitySchema, SchemaRegistry};
use crate::tabula_trace_query;
use crate::value::RowSet;

/// Failure reported by an executor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("SQL error {code}: {message}")]
pub struct ExecutionError {
    pub code: u32,
    pub message: String,
}

impl ExecutionError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Runs SQL text against a MySQL server.
///
/// Transport, pooling and transactions belong to implementations.
pub trait Executor {
    fn execute(&self, sql: &str) -> std::result::Result<RowSet, ExecutionError>;

    /// Generated id of the last successful INSERT on this connection
    fn last_inserted_id(&self) -> i64;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, sql: &str) -> std::result::Result<RowSet, ExecutionError> {
        (**self).execute(sql)
    }

    fn last_inserted_id(&self) -> i64 {
        (**self).last_inserted_id()
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, sql: &str) -> std::result::Result<RowSet, ExecutionError> {
        (**self).execute(sql)
    }

    fn last_inserted_id(&self) -> i64 {
        (**self).last_inserted_id()
    }
}

/// An explicit database handle.
///
/// Owns the executor and the schema cache. Several handles may coexist, each
/// with its own cache.
#[derive(Debug)]
pub struct Database<E> {
    name: Option<String>,
    debug: bool,
    executor: E,
    registry: SchemaRegistry,
}

impl<E: Executor> Database<E> {
    pub fn new(config: &DatabaseConfig, executor: E) -> Self {
        Self {
            name: config.database.clone(),
            debug: config.debug,
            executor,
            registry: SchemaRegistry::new(),
        }
    }

    /// A handle without a database name; table names stay unqualified
    pub fn with_executor(executor: E) -> Self {
        Self::new(&DatabaseConfig::default(), executor)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Append the failing SQL to execution errors
    pub fn enable_debug(&mut self) {
        self.debug = true;
    }

    pub fn disable_debug(&mut self) {
        self.debug = false;
    }

    pub const fn executor(&self) -> &E {
        &self.executor
    }

    pub const fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn schema<T: Entity>(&self) -> Result<Arc<EntitySchema>> {
        Ok(self.registry.schema::<T>()?)
    }

    /// A column of `T`, for building filters and orderings
    pub fn column<T: Entity>(&self, name: &str) -> Result<Arc<Column>> {
        let schema = self.schema::<T>()?;
        Ok(Arc::clone(schema.column(name)?))
    }

    pub fn query_builder<'a>(&'a self, schema: &'a EntitySchema) -> QueryBuilder<'a> {
        QueryBuilder::new(self.name(), schema)
    }

    /// Run `sql` through the executor
    pub fn query(&self, sql: &str) -> Result<RowSet> {
        tabula_trace_query!(sql, "execute");
        self.executor.execute(sql).map_err(|err| {
            tabula_trace_query!(sql, "failed");
            let message = if self.debug {
                format!("{err}\n{sql}")
            } else {
                err.to_string()
            };
            PersistenceError::Execution { message }.into()
        })
    }

    pub fn last_inserted_id(&self) -> i64 {
        self.executor.last_inserted_id()
    }
}

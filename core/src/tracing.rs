//! Tracing utilities for statement and row lifecycle observability.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text handed to the executor.
///
/// ```ignore
/// tabula_trace_query!(&sql, "execute");
/// ```
#[macro_export]
macro_rules! tabula_trace_query {
    ($sql:expr, $stage:literal) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(sql = %$sql, stage = $stage, "tabula.query");
    };
}

/// Emit a trace-level event when an entity schema is derived.
///
/// ```ignore
/// tabula_trace_schema!("Car", "car", 3);
/// ```
#[macro_export]
macro_rules! tabula_trace_schema {
    ($entity:expr, $table:expr, $columns:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(entity = %$entity, table = %$table, columns = $columns, "tabula.schema");
    };
}

/// Emit an info-level event for row lifecycle transitions (insert, update, delete).
///
/// ```ignore
/// tabula_trace_lifecycle!("insert", "Car");
/// ```
#[macro_export]
macro_rules! tabula_trace_lifecycle {
    ($event:literal, $entity:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!(event = $event, entity = %$entity, "tabula.row");
    };
}

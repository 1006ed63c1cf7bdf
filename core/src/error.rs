use tabula_types::AnnotationError;
use tabula_types::mysql::{MySqlType, SemanticType};
use thiserror::Error;

/// Errors in an entity's declaration. Raised when the schema is first built
/// and never recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing type for {entity}::{field}")]
    MissingType { entity: String, field: String },

    #[error("{entity}::{field}: MySQL type \"{requested}\" doesn't match the {semantic} field type")]
    TypeMismatch {
        entity: String,
        field: String,
        requested: MySqlType,
        semantic: SemanticType,
    },

    #[error(
        "only single column foreign keys are supported, {entity} has {count} primary key columns"
    )]
    UnsupportedCompositeKey { entity: String, count: usize },

    #[error("{entity} has no primary key to look rows up by")]
    MissingPrimaryKey { entity: String },

    #[error("{entity}::{field}: {source}")]
    Annotation {
        entity: String,
        field: String,
        #[source]
        source: AnnotationError,
    },

    #[error("{entity}::{field}: auto-increment can only be used on integer columns")]
    InvalidAutoIncrement { entity: String, field: String },

    #[error("{entity}::{field}: UNSIGNED can only be used on numeric columns")]
    InvalidUnsigned { entity: String, field: String },

    #[error("{entity}::{field}: onUpdate and onDelete require a reference column")]
    ReferenceActionWithoutReference { entity: String, field: String },

    #[error("invalid column name \"{column}\" for {entity}")]
    UnknownColumn { entity: String, column: String },

    #[error("duplicate column \"{column}\" in {entity}")]
    DuplicateColumn { entity: String, column: String },

    #[error("primary key of {0} references itself")]
    ReferenceCycle(String),
}

/// Errors in a value handed to an entity, a filter or the row mapper.
/// The caller can retry with corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("column {column} can't be null")]
    NullNotAllowed { column: String },

    #[error("column {column} must be {expected}, {found} provided")]
    Type {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} of column {column} doesn't fit in {target}")]
    OutOfRange {
        column: String,
        value: String,
        target: &'static str,
    },

    #[error("missing value for \"{column}\" column")]
    MissingColumn { column: String },

    #[error("unknown column \"{column}\"")]
    UnknownColumn { column: String },

    #[error("{given} arguments specified, {expected} expected")]
    ArgumentCount { given: usize, expected: usize },
}

/// Errors while reading or writing persisted rows
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("can't delete a row that hasn't been inserted yet")]
    NotPersisted,

    #[error("primary key not found in the database for {entity}")]
    NotFound { entity: String },

    /// The executor rejected a statement
    #[error("{message}")]
    Execution { message: String },

    #[error("unexpected result: {0}")]
    UnexpectedResult(String),
}

/// Errors while assembling a statement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("nothing to update in {table}")]
    EmptyAssignment { table: String },
}

/// Errors while loading a database configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Any error returned by the public API, wrapping the per-concern enums above
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabulaError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Value error: {0}")]
    Value(#[from] ValueError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for schema and persistence operations
pub type Result<T> = std::result::Result<T, TabulaError>;

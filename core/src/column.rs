//! Column derivation
//!
//! A [`FieldDecl`] is what an entity says about one of its fields. A [`Column`]
//! is the resolved result: SQL type, nullability, keys and the referenced
//! primary key for foreign keys.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tabula_types::Annotations;
use tabula_types::mysql::ddl::ReferentialAction;
use tabula_types::mysql::{MySqlType, SemanticType};

use crate::error::{SchemaError, ValueError};
use crate::escape::{escape_identifier, escape_string};
use crate::schema::Entity;
use crate::value::{Value, coerce};

/// Declaration of an entity field
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: Cow<'static, str>,
    /// `None` when the field type has no column mapping
    pub semantic: Option<SemanticType>,
    pub nullable: bool,
    /// Raw documentation, annotations included
    pub doc: Cow<'static, str>,
    pub reference: Option<ReferenceDecl>,
}

impl FieldDecl {
    /// A field without a known type. Building a column from it fails.
    pub fn untyped(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            semantic: None,
            nullable: false,
            doc: Cow::Borrowed(""),
            reference: None,
        }
    }

    pub fn typed(name: impl Into<Cow<'static, str>>, semantic: SemanticType) -> Self {
        Self {
            semantic: Some(semantic),
            ..Self::untyped(name)
        }
    }

    /// A foreign key to the primary key of `T`
    pub fn reference<T: Entity>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            semantic: Some(SemanticType::Reference),
            reference: Some(ReferenceDecl::of::<T>()),
            ..Self::untyped(name)
        }
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<Cow<'static, str>>) -> Self {
        self.doc = doc.into();
        self
    }
}

/// Type-erased handle on a referenced entity
#[derive(Clone, Copy)]
pub struct ReferenceDecl {
    pub entity: &'static str,
    pub(crate) type_id: TypeId,
    pub(crate) fields: fn() -> Vec<FieldDecl>,
}

impl ReferenceDecl {
    pub fn of<T: Entity>() -> Self {
        Self {
            entity: T::NAME,
            type_id: TypeId::of::<T>(),
            fields: T::fields,
        }
    }
}

impl fmt::Debug for ReferenceDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceDecl")
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

/// Foreign key metadata of a reference column
#[derive(Debug, Clone)]
pub struct ColumnReference {
    pub entity: &'static str,
    /// The referenced primary key
    pub column: Arc<Column>,
    pub on_update: ReferentialAction,
    pub on_delete: ReferentialAction,
}

/// A fully resolved column definition. Immutable once built.
#[derive(Debug, Clone)]
pub struct Column {
    entity: String,
    table: String,
    name: String,
    semantic: SemanticType,
    family: MySqlType,
    /// SQL type without the NULL / NOT NULL suffix
    type_stem: String,
    nullable: bool,
    auto_increment: bool,
    primary_key: bool,
    unique: bool,
    reference: Option<ColumnReference>,
    comment: String,
}

impl Column {
    /// Resolve `decl` into a column.
    ///
    /// `resolve_key` returns the primary-key columns of a referenced entity.
    pub fn build(
        entity: &str,
        table: &str,
        decl: &FieldDecl,
        resolve_key: &mut dyn FnMut(&ReferenceDecl) -> Result<Vec<Arc<Column>>, SchemaError>,
    ) -> Result<Self, SchemaError> {
        let field = decl.name.to_string();
        let missing_type = || SchemaError::MissingType {
            entity: entity.to_string(),
            field: field.clone(),
        };

        let semantic = decl.semantic.ok_or_else(missing_type)?;
        let annotations =
            Annotations::parse(&decl.doc).map_err(|source| SchemaError::Annotation {
                entity: entity.to_string(),
                field: field.clone(),
                source,
            })?;

        let (family, type_stem, reference) = if semantic == SemanticType::Reference {
            let target = decl.reference.as_ref().ok_or_else(missing_type)?;
            let mut keys = resolve_key(target)?;
            if keys.len() != 1 {
                return Err(SchemaError::UnsupportedCompositeKey {
                    entity: target.entity.to_string(),
                    count: keys.len(),
                });
            }
            let key = keys.remove(0);

            if let Some(requested) = &annotations.sql_type
                && requested.family != key.family
            {
                return Err(SchemaError::TypeMismatch {
                    entity: entity.to_string(),
                    field,
                    requested: requested.family,
                    semantic: key.semantic,
                });
            }

            let reference = ColumnReference {
                entity: target.entity,
                on_update: annotations.on_update.unwrap_or_default(),
                on_delete: annotations.on_delete.unwrap_or_default(),
                column: key,
            };
            (
                reference.column.family,
                reference.column.type_stem.clone(),
                Some(reference),
            )
        } else {
            if annotations.on_update.is_some() || annotations.on_delete.is_some() {
                return Err(SchemaError::ReferenceActionWithoutReference {
                    entity: entity.to_string(),
                    field,
                });
            }

            let spec = match annotations.sql_type {
                Some(spec) if semantic.accepts(spec.family) => spec,
                Some(spec) => {
                    return Err(SchemaError::TypeMismatch {
                        entity: entity.to_string(),
                        field,
                        requested: spec.family,
                        semantic,
                    });
                }
                None => semantic.default_sql_type().ok_or_else(missing_type)?,
            };

            let mut stem = spec.to_string();
            if annotations.unsigned {
                if !spec.family.is_numeric() {
                    return Err(SchemaError::InvalidUnsigned {
                        entity: entity.to_string(),
                        field,
                    });
                }
                stem.push_str(" UNSIGNED");
            }
            (spec.family, stem, None)
        };

        if annotations.auto_increment && semantic != SemanticType::Integer {
            return Err(SchemaError::InvalidAutoIncrement {
                entity: entity.to_string(),
                field,
            });
        }

        Ok(Self {
            entity: entity.to_string(),
            table: table.to_string(),
            name: field,
            semantic,
            family,
            type_stem,
            nullable: decl.nullable,
            auto_increment: annotations.auto_increment,
            primary_key: annotations.primary_key,
            unique: annotations.unique,
            reference,
            comment: annotations.comment,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn escaped_name(&self) -> String {
        escape_identifier(&self.name)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub const fn semantic_type(&self) -> SemanticType {
        self.semantic
    }

    pub const fn family(&self) -> MySqlType {
        self.family
    }

    /// SQL type without the nullability suffix, e.g. `INT UNSIGNED`
    pub fn type_stem(&self) -> &str {
        &self.type_stem
    }

    /// Full SQL type, e.g. `VARCHAR(32) NOT NULL`
    pub fn sql_type(&self) -> String {
        let null = if self.nullable { "NULL" } else { "NOT NULL" };
        format!("{} {null}", self.type_stem)
    }

    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub const fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    pub const fn is_foreign_key(&self) -> bool {
        self.reference.is_some()
    }

    pub const fn reference(&self) -> Option<&ColumnReference> {
        self.reference.as_ref()
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Coerce `value` into the representation stored in this column
    pub fn parse_value(&self, value: impl Into<Value>) -> Result<Value, ValueError> {
        let value = value.into();
        if value.is_null() {
            return if self.nullable {
                Ok(Value::Null)
            } else {
                Err(ValueError::NullNotAllowed {
                    column: self.name.clone(),
                })
            };
        }
        match &self.reference {
            Some(reference) => reference
                .column
                .parse_value(value)
                .map_err(|err| rename_column(err, &self.name)),
            None => coerce(&self.name, self.semantic, value),
        }
    }

    /// Column definition inside `CREATE TABLE`
    pub fn to_column_sql(&self) -> String {
        let mut sql = format!("{} {}", self.escaped_name(), self.sql_type());
        if self.auto_increment {
            sql.push_str(" AUTO_INCREMENT");
        }
        if !self.comment.is_empty() {
            sql.push_str(&format!(" COMMENT '{}'", escape_string(&self.comment)));
        }
        sql
    }
}

/// Report errors from a referenced key under the referencing column's name
fn rename_column(err: ValueError, column: &str) -> ValueError {
    let column = column.to_string();
    match err {
        ValueError::NullNotAllowed { .. } => ValueError::NullNotAllowed { column },
        ValueError::Type {
            expected, found, ..
        } => ValueError::Type {
            column,
            expected,
            found,
        },
        ValueError::OutOfRange { value, target, .. } => ValueError::OutOfRange {
            column,
            value,
            target,
        },
        other => other,
    }
}

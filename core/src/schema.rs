//! Entity schemas and the per-handle schema cache

use std::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;
use heck::ToSnakeCase;
use tabula_types::Annotations;

use crate::column::{Column, FieldDecl, ReferenceDecl};
use crate::error::{SchemaError, ValueError};
use crate::escape::qualified_table_name;
use crate::tabula_trace_schema;
use crate::value::{Row, Value};

/// A type persisted as one table row.
///
/// Usually implemented with `#[derive(Entity)]`.
pub trait Entity: Sized + 'static {
    /// Simple type name, snake-cased into the table name
    const NAME: &'static str;

    /// Field declarations in column order
    fn fields() -> Vec<FieldDecl>;

    /// Current field values keyed by column name
    fn to_row(&self) -> Row;

    /// Build an instance from coerced column values
    fn from_row(row: Row) -> Result<Self, ValueError>;

    /// Overwrite a single field
    fn assign(&mut self, column: &str, value: Value) -> Result<(), ValueError>;

    /// Values of the primary-key fields, in declaration order
    fn primary_key(&self) -> Vec<Value>;
}

/// Table name derived from an entity name
pub fn table_name(entity: &str) -> String {
    entity.to_snake_case()
}

/// The resolved table layout of one entity
#[derive(Debug)]
pub struct EntitySchema {
    entity: String,
    table: String,
    columns: Vec<Arc<Column>>,
}

impl EntitySchema {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Table name qualified with `database` when given
    pub fn qualified_name(&self, database: Option<&str>) -> String {
        qualified_table_name(database, &self.table)
    }

    pub fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&Arc<Column>, SchemaError> {
        self.columns
            .iter()
            .find(|column| column.name() == name)
            .ok_or_else(|| SchemaError::UnknownColumn {
                entity: self.entity.clone(),
                column: name.to_string(),
            })
    }

    pub fn primary_key(&self) -> Vec<&Arc<Column>> {
        self.columns.iter().filter(|c| c.is_primary_key()).collect()
    }

    pub fn auto_increment(&self) -> Option<&Arc<Column>> {
        self.columns.iter().find(|c| c.is_auto_increment())
    }

    pub fn primary_key_name(&self) -> String {
        format!("pk_{}", self.table)
    }

    pub fn foreign_key_name(&self, column: &Column) -> Option<String> {
        let reference = column.reference()?;
        Some(format!(
            "fk_{}_{}",
            self.table,
            reference.column.table()
        ))
    }

    pub fn unique_key_name(&self, column: &Column) -> String {
        format!("uniq_{}_{}", self.table, column.name())
    }
}

/// Caches entity schemas by type.
///
/// Schemas are built outside the lock; when two threads race, the first
/// inserted schema wins and both observe it.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeId, Arc<EntitySchema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema of `T`, built on first use
    pub fn schema<T: Entity>(&self) -> Result<Arc<EntitySchema>, SchemaError> {
        let id = TypeId::of::<T>();
        if let Some(schema) = self.cached(id) {
            return Ok(schema);
        }

        let schema = Arc::new(self.build(T::NAME, &T::fields())?);
        tabula_trace_schema!(schema.entity, schema.table, schema.columns.len());

        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(schemas.entry(id).or_insert(schema)))
    }

    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, id: TypeId) -> Option<Arc<EntitySchema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn build(&self, entity: &str, fields: &[FieldDecl]) -> Result<EntitySchema, SchemaError> {
        let table = table_name(entity);
        let mut columns: Vec<Arc<Column>> = Vec::with_capacity(fields.len());

        for decl in fields {
            let column = Column::build(entity, &table, decl, &mut |target| {
                self.key_columns(target, &mut Vec::new())
            })?;
            if columns.iter().any(|c| c.name() == column.name()) {
                return Err(SchemaError::DuplicateColumn {
                    entity: entity.to_string(),
                    column: column.name().to_string(),
                });
            }
            columns.push(Arc::new(column));
        }

        Ok(EntitySchema {
            entity: entity.to_string(),
            table,
            columns,
        })
    }

    /// Primary-key columns of a referenced entity.
    ///
    /// Only key fields are built, so entities may reference themselves or
    /// each other through non-key columns. `visiting` tracks the chain of
    /// keys being resolved.
    fn key_columns(
        &self,
        target: &ReferenceDecl,
        visiting: &mut Vec<TypeId>,
    ) -> Result<Vec<Arc<Column>>, SchemaError> {
        if let Some(schema) = self.cached(target.type_id) {
            return Ok(schema.primary_key().into_iter().cloned().collect());
        }
        if visiting.contains(&target.type_id) {
            return Err(SchemaError::ReferenceCycle(target.entity.to_string()));
        }
        visiting.push(target.type_id);

        let table = table_name(target.entity);
        let mut keys = Vec::new();
        for decl in (target.fields)() {
            if !is_primary_key(target.entity, &decl)? {
                continue;
            }
            let column = Column::build(target.entity, &table, &decl, &mut |next| {
                self.key_columns(next, visiting)
            })?;
            keys.push(Arc::new(column));
        }

        visiting.pop();
        Ok(keys)
    }
}

fn is_primary_key(entity: &str, decl: &FieldDecl) -> Result<bool, SchemaError> {
    Annotations::parse(&decl.doc)
        .map(|annotations| annotations.primary_key)
        .map_err(|source| SchemaError::Annotation {
            entity: entity.to_string(),
            field: decl.name.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FromValue, ToValue};
    use tabula_types::mysql::SemanticType;

    #[derive(Debug)]
    struct Person {
        id: i64,
        mentor: Option<i64>,
    }

    impl Entity for Person {
        const NAME: &'static str = "Person";

        fn fields() -> Vec<FieldDecl> {
            vec![
                FieldDecl::typed("id", SemanticType::Integer)
                    .doc("@autoIncrement\n@unsigned\n@primaryKey"),
                FieldDecl::reference::<Person>("mentor")
                    .nullable()
                    .doc("@onDelete(SET NULL)"),
            ]
        }

        fn to_row(&self) -> Row {
            crate::row! { "id" => self.id, "mentor" => self.mentor }
        }

        fn from_row(mut row: Row) -> Result<Self, ValueError> {
            Ok(Self {
                id: i64::from_value(row.remove("id").unwrap_or_default(), "id")?,
                mentor: FromValue::from_value(row.remove("mentor").unwrap_or_default(), "mentor")?,
            })
        }

        fn assign(&mut self, column: &str, value: Value) -> Result<(), ValueError> {
            match column {
                "id" => self.id = FromValue::from_value(value, column)?,
                "mentor" => self.mentor = FromValue::from_value(value, column)?,
                _ => {
                    return Err(ValueError::UnknownColumn {
                        column: column.to_string(),
                    });
                }
            }
            Ok(())
        }

        fn primary_key(&self) -> Vec<Value> {
            vec![self.id.to_value()]
        }
    }

    struct Loop;

    impl Entity for Loop {
        const NAME: &'static str = "LoopNode";

        fn fields() -> Vec<FieldDecl> {
            vec![FieldDecl::reference::<Loop>("id").doc("@primaryKey")]
        }

        fn to_row(&self) -> Row {
            Row::new()
        }

        fn from_row(_: Row) -> Result<Self, ValueError> {
            Ok(Self)
        }

        fn assign(&mut self, _: &str, _: Value) -> Result<(), ValueError> {
            Ok(())
        }

        fn primary_key(&self) -> Vec<Value> {
            Vec::new()
        }
    }

    #[test]
    fn test_self_reference() {
        let registry = SchemaRegistry::new();
        let schema = registry.schema::<Person>().unwrap();

        assert_eq!(schema.table_name(), "person");
        let mentor = schema.column("mentor").unwrap();
        assert_eq!(mentor.sql_type(), "INT UNSIGNED NULL");
        assert_eq!(
            schema.foreign_key_name(mentor).as_deref(),
            Some("fk_person_person")
        );
        assert_eq!(schema.primary_key().len(), 1);
        assert!(schema.auto_increment().is_some());
    }

    #[test]
    fn test_schema_is_cached() {
        let registry = SchemaRegistry::new();
        let first = registry.schema::<Person>().unwrap();
        let second = registry.schema::<Person>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_key_cycle() {
        let registry = SchemaRegistry::new();
        assert_eq!(
            registry.schema::<Loop>().unwrap_err(),
            SchemaError::ReferenceCycle("LoopNode".into())
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_column() {
        let registry = SchemaRegistry::new();
        let schema = registry.schema::<Person>().unwrap();
        assert!(matches!(
            schema.column("nope"),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_table_names() {
        assert_eq!(table_name("Car"), "car");
        assert_eq!(table_name("CarOwner"), "car_owner");
    }
}

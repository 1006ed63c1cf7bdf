//! Row lifecycle: instantiation, loading, saving and deleting entities.

use std::ops::{Deref, DerefMut};

use crate::database::{Database, Executor};
use crate::error::{PersistenceError, Result, SchemaError, ValueError};
use crate::filter::Filter;
use crate::order::OrderBy;
use crate::reference::Ref;
use crate::schema::{Entity, EntitySchema};
use crate::tabula_trace_lifecycle;
use crate::value::{Row, Value};

#[derive(Debug, Clone, PartialEq)]
enum RowState {
    New,
    /// Values as last written to or read from the database
    Persisted(Row),
}

/// An entity together with its persistence state.
///
/// Dereferences to the entity, so fields can be read and edited directly
/// before calling [`save`](Record::save).
#[derive(Debug, Clone)]
pub struct Record<T> {
    entity: T,
    state: RowState,
}

impl<T: Entity> Record<T> {
    /// A row that will be inserted on the first save
    pub const fn new(entity: T) -> Self {
        Self {
            entity,
            state: RowState::New,
        }
    }

    const fn persisted(entity: T, snapshot: Row) -> Self {
        Self {
            entity,
            state: RowState::Persisted(snapshot),
        }
    }

    pub const fn is_new_row(&self) -> bool {
        matches!(self.state, RowState::New)
    }

    pub const fn entity(&self) -> &T {
        &self.entity
    }

    pub fn into_inner(self) -> T {
        self.entity
    }

    /// INSERT a new row or UPDATE a persisted one.
    ///
    /// After an insert the generated id is written back into the
    /// auto-increment field. Updates match the row on the values it was last
    /// persisted with: the primary key, or every column when there is none.
    pub fn save<E: Executor>(&mut self, db: &Database<E>) -> Result<()> {
        let schema = db.schema::<T>()?;
        let mut row = current_row(&schema, &self.entity)?;

        match &self.state {
            RowState::New => {
                db.query(&db.query_builder(&schema).insert(&row)?)?;

                // The row exists from here on, even if the id doesn't fit the field
                let mut assigned = Ok(());
                if let Some(column) = schema.auto_increment() {
                    let id = Value::Integer(db.last_inserted_id());
                    row.insert(column.name(), id.clone());
                    assigned = self.entity.assign(column.name(), id);
                }
                tabula_trace_lifecycle!("insert", T::NAME);
                self.state = RowState::Persisted(row);
                assigned?;
                return Ok(());
            }
            RowState::Persisted(snapshot) => {
                let filter = match_filter(&schema, snapshot)?;
                let has_key = !schema.primary_key().is_empty();
                // key columns are only written when they changed
                let assignments: Row = row
                    .iter()
                    .filter(|(name, value)| {
                        !has_key
                            || schema.column(name).is_ok_and(|c| !c.is_primary_key())
                            || snapshot.get(name) != Some(*value)
                    })
                    .map(|(name, value)| (name, value.clone()))
                    .collect();

                if assignments.is_empty() {
                    self.state = RowState::Persisted(row);
                    return Ok(());
                }
                let sql = db
                    .query_builder(&schema)
                    .update(&assignments, Some(&filter))?;
                db.query(&sql)?;
                tabula_trace_lifecycle!("update", T::NAME);
            }
        }

        self.state = RowState::Persisted(row);
        Ok(())
    }

    /// DELETE the persisted row. The record becomes new again.
    pub fn delete<E: Executor>(&mut self, db: &Database<E>) -> Result<()> {
        let RowState::Persisted(snapshot) = &self.state else {
            return Err(PersistenceError::NotPersisted.into());
        };
        let schema = db.schema::<T>()?;
        let filter = match_filter(&schema, snapshot)?;
        db.query(&db.query_builder(&schema).delete(Some(&filter)))?;

        tabula_trace_lifecycle!("delete", T::NAME);
        self.state = RowState::New;
        Ok(())
    }

    /// Re-read the persisted row and copy every column into the entity
    pub fn reload<E: Executor>(&mut self, db: &Database<E>) -> Result<()> {
        let RowState::Persisted(snapshot) = &self.state else {
            return Err(PersistenceError::NotPersisted.into());
        };
        let schema = db.schema::<T>()?;
        let filter = match_filter(&schema, snapshot)?;
        let sql = db
            .query_builder(&schema)
            .select(Some(&filter), Some(1), None, None);

        let row = db.query(&sql)?.into_iter().next().ok_or_else(|| {
            PersistenceError::NotFound {
                entity: T::NAME.to_string(),
            }
        })?;
        let row = coerce_row(&schema, row, RowMode::Load)?;
        for (name, value) in row.iter() {
            self.entity.assign(name, value.clone())?;
        }
        self.state = RowState::Persisted(row);
        Ok(())
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.entity
    }
}

impl<T> DerefMut for Record<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.entity
    }
}

/// Entity fields coerced through their columns
fn current_row<T: Entity>(schema: &EntitySchema, entity: &T) -> Result<Row> {
    let mut row = entity.to_row();
    for column in schema.columns() {
        if let Some(value) = row.remove(column.name()) {
            row.insert(column.name(), column.parse_value(value)?);
        }
    }
    Ok(row)
}

/// WHERE clause identifying a persisted row
fn match_filter(schema: &EntitySchema, snapshot: &Row) -> Result<Filter> {
    let primary_key = schema.primary_key();
    let columns: Vec<_> = if primary_key.is_empty() {
        schema.columns().iter().collect()
    } else {
        primary_key
    };

    let mut filter = Filter::and([]);
    for column in columns {
        let value = snapshot.get(column.name()).cloned().unwrap_or_default();
        filter.push(Filter::eq(column, value)?);
    }
    Ok(filter)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowMode {
    /// Values for a row that doesn't exist yet; auto-increment columns get 0
    Instantiate,
    /// Values read back from the database; auto-increment columns may be absent
    Load,
}

/// Coerce every schema column of `row`, in schema order
fn coerce_row(
    schema: &EntitySchema,
    mut row: Row,
    mode: RowMode,
) -> std::result::Result<Row, ValueError> {
    let mut coerced = Row::with_capacity(schema.columns().len());
    for column in schema.columns() {
        if column.is_auto_increment() && mode == RowMode::Instantiate {
            coerced.insert(column.name(), Value::Integer(0));
            continue;
        }
        match row.remove(column.name()) {
            Some(value) => {
                coerced.insert(column.name(), column.parse_value(value)?);
            }
            None if column.is_auto_increment() => {
                coerced.insert(column.name(), Value::Integer(0));
            }
            None => {
                return Err(ValueError::MissingColumn {
                    column: column.name().to_string(),
                });
            }
        }
    }
    Ok(coerced)
}

impl<E: Executor> Database<E> {
    /// CREATE TABLE for `T`
    pub fn create_table<T: Entity>(&self, if_not_exists: bool) -> Result<()> {
        let schema = self.schema::<T>()?;
        self.query(&self.query_builder(&schema).create_table(if_not_exists))?;
        Ok(())
    }

    /// DROP TABLE for `T`
    pub fn drop_table<T: Entity>(&self, if_exists: bool) -> Result<()> {
        let schema = self.schema::<T>()?;
        self.query(&self.query_builder(&schema).drop_table(if_exists))?;
        Ok(())
    }

    /// A new row from positional values, one per non auto-increment column
    pub fn instantiate<T, I>(&self, values: I) -> Result<Record<T>>
    where
        T: Entity,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let schema = self.schema::<T>()?;
        let expected = schema
            .columns()
            .iter()
            .filter(|c| !c.is_auto_increment())
            .count();
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.len() != expected {
            return Err(ValueError::ArgumentCount {
                given: values.len(),
                expected,
            }
            .into());
        }

        let mut values = values.into_iter();
        let row: Row = schema
            .columns()
            .iter()
            .filter(|c| !c.is_auto_increment())
            .filter_map(|c| Some((c.name(), values.next()?)))
            .collect();
        self.instantiate_from_row(row)
    }

    /// A new row from named values. Auto-increment columns are ignored and set to 0.
    pub fn instantiate_from_row<T: Entity>(&self, row: Row) -> Result<Record<T>> {
        let schema = self.schema::<T>()?;
        for name in row.names() {
            schema.column(name)?;
        }
        let row = coerce_row(&schema, row, RowMode::Instantiate)?;
        Ok(Record::new(T::from_row(row)?))
    }

    /// An already persisted row, typically straight from the executor
    pub fn load<T: Entity>(&self, row: Row) -> Result<Record<T>> {
        let schema = self.schema::<T>()?;
        let row = coerce_row(&schema, row, RowMode::Load)?;
        let entity = T::from_row(row.clone())?;
        Ok(Record::persisted(entity, row))
    }

    /// A lazy reference to the row with the given primary key
    pub fn lazy<T, I>(&self, key: I) -> Result<Ref<T>>
    where
        T: Entity,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let schema = self.schema::<T>()?;
        let mut values = key_values(&schema, key)?;
        if values.len() != 1 {
            return Err(SchemaError::UnsupportedCompositeKey {
                entity: T::NAME.to_string(),
                count: values.len(),
            }
            .into());
        }
        Ok(Ref::new(values.remove(0)))
    }

    /// Instantiate from `row` and INSERT it
    pub fn create<T: Entity>(&self, row: Row) -> Result<Record<T>> {
        let mut record = self.instantiate_from_row::<T>(row)?;
        record.save(self)?;
        Ok(record)
    }

    /// The row with the given primary key
    pub fn get<T, I>(&self, key: I) -> Result<Record<T>>
    where
        T: Entity,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let schema = self.schema::<T>()?;
        let values = key_values(&schema, key)?;

        let mut filter = Filter::and([]);
        for (column, value) in schema.primary_key().into_iter().zip(values) {
            filter.push(Filter::eq(column, value)?);
        }

        self.find::<T>(Some(&filter), Some(1), Some(1), None)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                PersistenceError::NotFound {
                    entity: T::NAME.to_string(),
                }
                .into()
            })
    }

    /// Rows matching `filter`, see [`QueryBuilder::select`](crate::query::QueryBuilder::select)
    pub fn find<T: Entity>(
        &self,
        filter: Option<&Filter>,
        page_size: Option<u64>,
        page: Option<u64>,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Record<T>>> {
        let schema = self.schema::<T>()?;
        let sql = self
            .query_builder(&schema)
            .select(filter, page_size, page, order);
        self.query(&sql)?
            .into_iter()
            .map(|row| self.load::<T>(row))
            .collect()
    }

    /// Number of rows matching `filter`
    pub fn count<T: Entity>(&self, filter: Option<&Filter>) -> Result<u64> {
        let schema = self.schema::<T>()?;
        let rows = self.query(&self.query_builder(&schema).count(filter))?;
        let value = rows
            .first()
            .and_then(|row| row.get("count"))
            .ok_or_else(|| PersistenceError::UnexpectedResult("missing count column".into()))?;

        let count = match value {
            Value::Integer(n) => u64::try_from(*n).ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        count.ok_or_else(|| {
            PersistenceError::UnexpectedResult(format!("invalid count {value:?}")).into()
        })
    }
}

/// Coerced primary-key values, checking their number
fn key_values<I>(schema: &EntitySchema, key: I) -> Result<Vec<Value>>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let primary_key = schema.primary_key();
    if primary_key.is_empty() {
        return Err(SchemaError::MissingPrimaryKey {
            entity: schema.entity().to_string(),
        }
        .into());
    }
    let values: Vec<Value> = key.into_iter().map(Into::into).collect();
    if values.len() != primary_key.len() {
        return Err(ValueError::ArgumentCount {
            given: values.len(),
            expected: primary_key.len(),
        }
        .into());
    }

    let mut coerced = Vec::with_capacity(values.len());
    for (column, value) in primary_key.into_iter().zip(values) {
        coerced.push(column.parse_value(value)?);
    }
    Ok(coerced)
}

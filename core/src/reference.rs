//! Foreign-key fields

use crate::database::{Database, Executor};
use crate::error::{PersistenceError, Result, SchemaError, ValueError};
use crate::schema::Entity;
use crate::value::{FromValue, ToValue, Value};

/// A reference to another entity by its single-column primary key.
///
/// Rows loaded from the database hold a [`Ref::Reference`]; calling
/// [`resolve`](Ref::resolve) fetches the target once and keeps it.
#[derive(Debug, Clone)]
pub enum Ref<T> {
    /// Only the key is known
    Reference(Value),
    Loaded { key: Value, entity: Box<T> },
}

impl<T> Ref<T> {
    /// A lazy reference to the row keyed by `key`
    pub fn new(key: impl Into<Value>) -> Self {
        Self::Reference(key.into())
    }

    pub const fn is_lazy(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    pub const fn key(&self) -> &Value {
        match self {
            Self::Reference(key) | Self::Loaded { key, .. } => key,
        }
    }

    /// The referenced entity if it has been loaded
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Reference(_) => None,
            Self::Loaded { entity, .. } => Some(&**entity),
        }
    }

    pub fn into_loaded(self) -> Option<T> {
        match self {
            Self::Reference(_) => None,
            Self::Loaded { entity, .. } => Some(*entity),
        }
    }
}

impl<T: Entity> Ref<T> {
    /// Wrap an already loaded entity.
    ///
    /// Fails when `T` doesn't have exactly one primary-key column.
    pub fn loaded(entity: T) -> std::result::Result<Self, SchemaError> {
        let mut key = entity.primary_key();
        if key.len() != 1 {
            return Err(SchemaError::UnsupportedCompositeKey {
                entity: T::NAME.to_string(),
                count: key.len(),
            });
        }
        Ok(Self::Loaded {
            key: key.remove(0),
            entity: Box::new(entity),
        })
    }

    /// Fetch the referenced row by primary key unless already loaded
    pub fn resolve<E: Executor>(&mut self, db: &Database<E>) -> Result<&T> {
        if let Self::Reference(key) = self {
            let key = key.clone();
            let record = db.get::<T, _>([key.clone()])?;
            *self = Self::Loaded {
                key,
                entity: Box::new(record.into_inner()),
            };
        }
        match self {
            Self::Loaded { entity, .. } => Ok(&**entity),
            Self::Reference(_) => Err(PersistenceError::NotFound {
                entity: T::NAME.to_string(),
            }
            .into()),
        }
    }
}

/// References are equal when their keys are
impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> ToValue for Ref<T> {
    fn to_value(&self) -> Value {
        self.key().clone()
    }
}

impl<T> FromValue for Ref<T> {
    fn from_value(value: Value, column: &str) -> std::result::Result<Self, ValueError> {
        if value.is_null() {
            return Err(ValueError::NullNotAllowed {
                column: column.to_string(),
            });
        }
        Ok(Self::Reference(value))
    }
}

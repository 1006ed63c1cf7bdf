//! Column values and row mapping
//!
//! [`Value`] is the dynamically typed cell the engine moves between entities,
//! filters and the executor. [`Row`] keeps column names in insertion order so
//! generated SQL is deterministic.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tabula_types::mysql::SemanticType;

use crate::error::ValueError;

/// Format used for DATETIME literals and string parsing
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid integer pattern"));
static FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("valid float pattern")
});

/// A single column value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in error messages
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "datetime",
        }
    }

    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Coerce a non-null value to the representation of `semantic`.
///
/// Null handling and reference resolution belong to the column; this only
/// converts between value kinds.
pub(crate) fn coerce(column: &str, semantic: SemanticType, value: Value) -> Result<Value, ValueError> {
    let type_error = |expected: &'static str, value: &Value| ValueError::Type {
        column: column.to_string(),
        expected,
        found: value.kind(),
    };

    match semantic {
        SemanticType::String => Ok(Value::String(match value {
            Value::String(s) => s,
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => String::from(if b { "1" } else { "0" }),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Value::Null => return Ok(Value::Null),
        })),
        SemanticType::Integer => match value {
            Value::Integer(_) => Ok(value),
            Value::String(ref s) if INTEGER.is_match(s) => {
                s.parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| ValueError::OutOfRange {
                        column: column.to_string(),
                        value: s.clone(),
                        target: "i64",
                    })
            }
            other => Err(type_error("an integer", &other)),
        },
        SemanticType::Float => match value {
            Value::Float(f) if f.is_finite() => Ok(value),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(Value::Float(i as f64)),
            Value::String(ref s) if FLOAT.is_match(s) => match s.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(type_error("a finite number", &value)),
            },
            other => Err(type_error("a float", &other)),
        },
        SemanticType::Boolean => match value {
            Value::Boolean(_) => Ok(value),
            Value::Integer(i) => Ok(Value::Boolean(i != 0)),
            Value::String(ref s) if s.is_empty() => Err(type_error("a boolean", &value)),
            Value::String(s) => Ok(Value::Boolean(
                !(s == "0" || s.eq_ignore_ascii_case("false")),
            )),
            other => Err(type_error("a boolean", &other)),
        },
        SemanticType::DateTime => match value {
            Value::DateTime(_) => Ok(value),
            Value::String(ref s) => NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .map(Value::DateTime)
                .map_err(|_| type_error("a datetime", &value)),
            other => Err(type_error("a datetime", &other)),
        },
        SemanticType::Reference => Ok(value),
    }
}

/// Conversion of a field into a column value
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Conversion of a column value back into a field.
///
/// `column` is only used to build error messages.
pub trait FromValue: Sized {
    fn from_value(value: Value, column: &str) -> Result<Self, ValueError>;
}

macro_rules! impl_to_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(self.clone())
                }
            }
        )*
    };
}

impl_to_value!(String, i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, NaiveDateTime);

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

fn null_or_type_error(value: &Value, column: &str, expected: &'static str) -> ValueError {
    if value.is_null() {
        ValueError::NullNotAllowed {
            column: column.to_string(),
        }
    } else {
        ValueError::Type {
            column: column.to_string(),
            expected,
            found: value.kind(),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value, column: &str) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(null_or_type_error(&other, column, "a string")),
        }
    }
}

macro_rules! impl_from_value_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value, column: &str) -> Result<Self, ValueError> {
                    match value {
                        Value::Integer(i) => <$ty>::try_from(i).map_err(|_| ValueError::OutOfRange {
                            column: column.to_string(),
                            value: i.to_string(),
                            target: stringify!($ty),
                        }),
                        other => Err(null_or_type_error(&other, column, "an integer")),
                    }
                }
            }
        )*
    };
}

impl_from_value_integer!(i8, i16, i32, i64, u8, u16, u32);

impl FromValue for f64 {
    fn from_value(value: Value, column: &str) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(i as f64),
            other => Err(null_or_type_error(&other, column, "a float")),
        }
    }
}

impl FromValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value, column: &str) -> Result<Self, ValueError> {
        f64::from_value(value, column).map(|f| f as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: Value, column: &str) -> Result<Self, ValueError> {
        match value {
            Value::Boolean(b) => Ok(b),
            Value::Integer(i) => Ok(i != 0),
            other => Err(null_or_type_error(&other, column, "a boolean")),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value, column: &str) -> Result<Self, ValueError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(null_or_type_error(&other, column, "a datetime")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value, column: &str) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, column).map(Some),
        }
    }
}

/// An ordered mapping from column name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set `name` to `value`, keeping the original position of an existing entry.
    /// Returns the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Rows returned by the executor, in result order
pub type RowSet = Vec<Row>;

/// Build a [`Row`] from `name => value` pairs.
///
/// ```
/// use tabula_core::{row, Value};
///
/// let row = row! { "brand" => "Ford", "price" => 45000.0 };
/// assert_eq!(row.get("brand"), Some(&Value::from("Ford")));
/// ```
#[macro_export]
macro_rules! row {
    () => { $crate::Row::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::Row::new();
        $( row.insert($name, $value); )+
        row
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap()
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(
            coerce("id", SemanticType::Integer, Value::from("-42")),
            Ok(Value::Integer(-42))
        );
        assert_eq!(
            coerce("id", SemanticType::Integer, Value::from("+7")),
            Ok(Value::Integer(7))
        );
        assert!(matches!(
            coerce("id", SemanticType::Integer, Value::from("4.2")),
            Err(ValueError::Type { .. })
        ));
        assert!(matches!(
            coerce("id", SemanticType::Integer, Value::from(1.0)),
            Err(ValueError::Type { .. })
        ));
        assert!(matches!(
            coerce("id", SemanticType::Integer, Value::from("99999999999999999999")),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(
            coerce("price", SemanticType::Float, Value::from("1.5e3")),
            Ok(Value::Float(1500.0))
        );
        assert_eq!(
            coerce("price", SemanticType::Float, Value::from(".5")),
            Ok(Value::Float(0.5))
        );
        assert_eq!(
            coerce("price", SemanticType::Float, Value::from(3)),
            Ok(Value::Float(3.0))
        );
        assert!(coerce("price", SemanticType::Float, Value::from("abc")).is_err());
        assert!(coerce("price", SemanticType::Float, Value::from(f64::NAN)).is_err());
        assert!(coerce("price", SemanticType::Float, Value::from(true)).is_err());
    }

    #[test]
    fn test_boolean_coercion() {
        for (raw, expected) in [
            ("1", true),
            ("TRUE", true),
            ("yes", true),
            ("0", false),
            ("False", false),
        ] {
            assert_eq!(
                coerce("active", SemanticType::Boolean, Value::from(raw)),
                Ok(Value::Boolean(expected))
            );
        }
        assert_eq!(
            coerce("active", SemanticType::Boolean, Value::from(0)),
            Ok(Value::Boolean(false))
        );
        let err = coerce("active", SemanticType::Boolean, Value::from("")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "column active must be a boolean, string provided"
        );
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(
            coerce("name", SemanticType::String, Value::from(12)),
            Ok(Value::from("12"))
        );
        assert_eq!(
            coerce("name", SemanticType::String, Value::from(false)),
            Ok(Value::from("0"))
        );
    }

    #[test]
    fn test_datetime_coercion() {
        assert_eq!(
            coerce("sold_at", SemanticType::DateTime, Value::from("2024-03-01 10:20:30")),
            Ok(Value::DateTime(dt("2024-03-01 10:20:30")))
        );
        assert!(coerce("sold_at", SemanticType::DateTime, Value::from("yesterday")).is_err());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(u8::from_value(Value::Integer(200), "n"), Ok(200));
        assert!(matches!(
            u8::from_value(Value::Integer(300), "n"),
            Err(ValueError::OutOfRange { target: "u8", .. })
        ));
        assert_eq!(
            String::from_value(Value::Null, "name"),
            Err(ValueError::NullNotAllowed {
                column: "name".into()
            })
        );
        assert_eq!(Option::<String>::from_value(Value::Null, "name"), Ok(None));
        assert_eq!(bool::from_value(Value::Integer(1), "flag"), Ok(true));
    }

    #[test]
    fn test_row_keeps_order() {
        let mut row = row! { "b" => 1, "a" => 2 };
        assert_eq!(row.insert("b", 3), Some(Value::Integer(1)));
        assert_eq!(row.names().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(row.remove("b"), Some(Value::Integer(3)));
        assert_eq!(row.len(), 1);
        assert!(!row.contains("b"));
    }
}

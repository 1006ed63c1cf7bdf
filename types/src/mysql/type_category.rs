//! Semantic column types
//!
//! A [`SemanticType`] is what a field holds on the Rust side. Each one maps to
//! an ordered list of acceptable MySQL families; the first is used when no
//! explicit type annotation is given.

use core::fmt;

use super::{MySqlType, SqlTypeSpec};

/// Default width of an unannotated string column.
pub const DEFAULT_VARCHAR_WIDTH: &str = "32";

const STRING_TYPES: &[MySqlType] = &[
    MySqlType::Varchar,
    MySqlType::Text,
    MySqlType::TinyText,
    MySqlType::MediumText,
    MySqlType::LongText,
    MySqlType::Blob,
    MySqlType::TinyBlob,
    MySqlType::MediumBlob,
    MySqlType::LongBlob,
];
const INTEGER_TYPES: &[MySqlType] = &[MySqlType::Int];
const FLOAT_TYPES: &[MySqlType] = &[MySqlType::Float, MySqlType::Double, MySqlType::Decimal];
const BOOLEAN_TYPES: &[MySqlType] = &[MySqlType::Boolean, MySqlType::Int];
const DATETIME_TYPES: &[MySqlType] = &[MySqlType::DateTime, MySqlType::Timestamp];

/// The kind of value a column stores.
///
/// # Examples
///
/// ```
/// use tabula_types::mysql::{MySqlType, SemanticType};
///
/// assert_eq!(SemanticType::String.default_sql_type().unwrap().to_string(), "VARCHAR(32)");
/// assert!(SemanticType::Boolean.accepts(MySqlType::Int));
/// assert!(!SemanticType::Integer.accepts(MySqlType::Varchar));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SemanticType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    /// Single-column primary key of another entity
    Reference,
}

impl SemanticType {
    /// Acceptable MySQL families, most preferred first.
    ///
    /// References have none: their type is copied from the referenced key.
    #[must_use]
    pub const fn candidates(&self) -> &'static [MySqlType] {
        match self {
            Self::String => STRING_TYPES,
            Self::Integer => INTEGER_TYPES,
            Self::Float => FLOAT_TYPES,
            Self::Boolean => BOOLEAN_TYPES,
            Self::DateTime => DATETIME_TYPES,
            Self::Reference => &[],
        }
    }

    #[must_use]
    pub fn accepts(&self, family: MySqlType) -> bool {
        self.candidates().contains(&family)
    }

    /// The type inferred when the field carries no type annotation
    #[must_use]
    pub fn default_sql_type(&self) -> Option<SqlTypeSpec> {
        let family = *self.candidates().first()?;
        Some(match family {
            MySqlType::Varchar => SqlTypeSpec::sized(family, DEFAULT_VARCHAR_WIDTH),
            _ => SqlTypeSpec::new(family),
        })
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Classify a Rust type by the last segment of its path.
    ///
    /// Used by the derive macro; `Option<T>` must already be unwrapped.
    #[must_use]
    pub fn from_rust_ident(ident: &str) -> Option<Self> {
        match ident {
            "String" | "str" => Some(Self::String),
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => Some(Self::Integer),
            "f32" | "f64" => Some(Self::Float),
            "bool" => Some(Self::Boolean),
            "NaiveDateTime" => Some(Self::DateTime),
            "Ref" => Some(Self::Reference),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Reference => "reference",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            SemanticType::Integer.default_sql_type(),
            Some(SqlTypeSpec::new(MySqlType::Int))
        );
        assert_eq!(
            SemanticType::Float.default_sql_type(),
            Some(SqlTypeSpec::new(MySqlType::Float))
        );
        assert_eq!(
            SemanticType::Boolean.default_sql_type(),
            Some(SqlTypeSpec::new(MySqlType::Boolean))
        );
        assert_eq!(SemanticType::Reference.default_sql_type(), None);
    }

    #[test]
    fn test_from_rust_ident() {
        assert_eq!(SemanticType::from_rust_ident("i64"), Some(SemanticType::Integer));
        assert_eq!(SemanticType::from_rust_ident("u32"), Some(SemanticType::Integer));
        assert_eq!(SemanticType::from_rust_ident("f64"), Some(SemanticType::Float));
        assert_eq!(SemanticType::from_rust_ident("Ref"), Some(SemanticType::Reference));
        // u64 does not fit the signed value representation
        assert_eq!(SemanticType::from_rust_ident("u64"), None);
        assert_eq!(SemanticType::from_rust_ident("Vec"), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SemanticType::DateTime).unwrap();
        assert_eq!(json, "\"date_time\"");
        let back: SemanticType = serde_json::from_str("\"reference\"").unwrap();
        assert_eq!(back, SemanticType::Reference);
    }
}

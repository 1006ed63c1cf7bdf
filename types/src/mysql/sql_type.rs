//! MySQL column type families
//!
//! Defines the SQL type families an annotation can request and the rendered
//! `FAMILY(size)` form used in column definitions.

use core::fmt;

/// Enum representing the MySQL type families known to the schema engine.
///
/// Integer widths (`@tinyint`, `@bigint`, ...) all collapse to [`MySqlType::Int`]
/// with a display width, so there is a single integer family.
///
/// # Examples
///
/// ```
/// use tabula_types::mysql::MySqlType;
///
/// assert_eq!(MySqlType::Varchar.as_sql(), "VARCHAR");
/// assert!(MySqlType::Decimal.is_numeric());
/// assert!(!MySqlType::LongText.is_numeric());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum MySqlType {
    Varchar,
    Text,
    TinyText,
    MediumText,
    LongText,
    Blob,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Int,
    Float,
    Double,
    Decimal,
    Boolean,
    DateTime,
    Timestamp,
}

impl MySqlType {
    /// Get the SQL keyword for this family
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
            Self::TinyText => "TINYTEXT",
            Self::MediumText => "MEDIUMTEXT",
            Self::LongText => "LONGTEXT",
            Self::Blob => "BLOB",
            Self::TinyBlob => "TINYBLOB",
            Self::MediumBlob => "MEDIUMBLOB",
            Self::LongBlob => "LONGBLOB",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Boolean => "BOOLEAN",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
        }
    }

    /// Whether `UNSIGNED` may follow this family
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Double | Self::Decimal)
    }

    /// Convert from an annotation name that carries no size (`@text`, `@longblob`, ...)
    #[must_use]
    pub fn from_annotation_name(name: &str) -> Option<Self> {
        match name {
            "tinytext" => Some(Self::TinyText),
            "text" => Some(Self::Text),
            "mediumtext" => Some(Self::MediumText),
            "longtext" => Some(Self::LongText),
            "tinyblob" => Some(Self::TinyBlob),
            "blob" => Some(Self::Blob),
            "mediumblob" => Some(Self::MediumBlob),
            "longblob" => Some(Self::LongBlob),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for MySqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A type family together with its optional size or precision argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SqlTypeSpec {
    pub family: MySqlType,
    /// Raw argument as written between the parentheses, e.g. `32` or `9,2`
    pub size: Option<String>,
}

impl SqlTypeSpec {
    #[must_use]
    pub const fn new(family: MySqlType) -> Self {
        Self { family, size: None }
    }

    #[must_use]
    pub fn sized(family: MySqlType, size: impl Into<String>) -> Self {
        Self {
            family,
            size: Some(size.into()),
        }
    }
}

impl fmt::Display for SqlTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.size {
            Some(size) => write!(f, "{}({size})", self.family),
            None => f.write_str(self.family.as_sql()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_annotation_name() {
        assert_eq!(
            MySqlType::from_annotation_name("mediumtext"),
            Some(MySqlType::MediumText)
        );
        assert_eq!(
            MySqlType::from_annotation_name("longblob"),
            Some(MySqlType::LongBlob)
        );
        assert_eq!(MySqlType::from_annotation_name("varchar"), None);
        assert_eq!(MySqlType::from_annotation_name("TEXT"), None);
    }

    #[test]
    fn test_spec_display() {
        assert_eq!(SqlTypeSpec::new(MySqlType::Text).to_string(), "TEXT");
        assert_eq!(
            SqlTypeSpec::sized(MySqlType::Varchar, "32").to_string(),
            "VARCHAR(32)"
        );
        assert_eq!(
            SqlTypeSpec::sized(MySqlType::Decimal, "9,2").to_string(),
            "DECIMAL(9,2)"
        );
    }
}

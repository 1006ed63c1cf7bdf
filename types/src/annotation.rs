//! Doc-comment annotation mini-language
//!
//! Column metadata is written one annotation per line inside a field's
//! documentation:
//!
//! ```text
//! /// @autoIncrement
//! /// @unsigned
//! /// @primaryKey
//! /// The car identifier.
//! ```
//!
//! A line is an annotation when it matches `@name` or `@name(value)`. Lines
//! that are not recognised annotations become the column comment.

use std::sync::LazyLock;

use regex::Regex;

use crate::mysql::ddl::ReferentialAction;
use crate::mysql::{DEFAULT_VARCHAR_WIDTH, MySqlType, SqlTypeSpec};

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@(?P<name>[^(]+)(?:\((?P<value>[^)]+)\))?$").expect("valid annotation pattern")
});
static WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid width pattern"));
static PRECISION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+,[0-9]+$").expect("valid precision pattern"));

/// Errors raised while reading annotations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    #[error("decimal type must define both integer and fractional lengths, got \"{0}\"")]
    InvalidDecimal(String),

    #[error(
        "invalid reference action \"{0}\", it must be one of: CASCADE, RESTRICT, NO ACTION, SET NULL or SET DEFAULT"
    )]
    InvalidReferenceAction(String),

    #[error("conflicting type annotations: {first} and {second}")]
    ConflictingTypeAnnotation {
        first: SqlTypeSpec,
        second: SqlTypeSpec,
    },
}

/// Structured result of reading a field's documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    /// Explicitly requested SQL type, if any
    pub sql_type: Option<SqlTypeSpec>,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub unsigned: bool,
    pub on_update: Option<ReferentialAction>,
    pub on_delete: Option<ReferentialAction>,
    /// Non-annotation lines, trimmed and space-joined
    pub comment: String,
}

impl Annotations {
    /// Parse a documentation block.
    ///
    /// # Examples
    ///
    /// ```
    /// use tabula_types::annotation::Annotations;
    ///
    /// let parsed = Annotations::parse("@varchar(64)\n@unique\nThe brand name.").unwrap();
    /// assert_eq!(parsed.sql_type.unwrap().to_string(), "VARCHAR(64)");
    /// assert!(parsed.unique);
    /// assert_eq!(parsed.comment, "The brand name.");
    /// ```
    pub fn parse(doc: &str) -> Result<Self, AnnotationError> {
        let mut annotations = Self::default();
        let mut comment = Vec::new();

        for line in doc.lines().map(clean_line).filter(|line| !line.is_empty()) {
            let Some(captures) = ANNOTATION.captures(line) else {
                comment.push(line);
                continue;
            };
            let name = &captures["name"];
            let value = captures.name("value").map(|m| m.as_str().trim());

            if name == "comment" {
                comment.extend(value);
                continue;
            }
            if !annotations.apply(name, value)? {
                comment.push(line);
            }
        }

        annotations.comment = comment.join(" ").trim().to_string();
        Ok(annotations)
    }

    /// Returns `false` when `name` is not a recognised annotation.
    fn apply(&mut self, name: &str, value: Option<&str>) -> Result<bool, AnnotationError> {
        let numeric = value.filter(|v| WIDTH.is_match(v));

        match name {
            "varchar" => self.set_type(SqlTypeSpec::sized(
                MySqlType::Varchar,
                numeric.unwrap_or(DEFAULT_VARCHAR_WIDTH),
            ))?,
            "decimal" => {
                let precision = value.unwrap_or_default().replace(' ', "");
                if !PRECISION.is_match(&precision) {
                    return Err(AnnotationError::InvalidDecimal(precision));
                }
                self.set_type(SqlTypeSpec::sized(MySqlType::Decimal, precision))?;
            }
            "tinyint" | "smallint" | "int" | "mediumint" | "bigint" => {
                let width = numeric.map_or_else(|| integer_width(name).to_string(), str::to_string);
                self.set_type(SqlTypeSpec::sized(MySqlType::Int, width))?;
            }
            "float" | "double" => {
                let family = if name == "float" {
                    MySqlType::Float
                } else {
                    MySqlType::Double
                };
                let spec = match value.filter(|v| WIDTH.is_match(v) || PRECISION.is_match(v)) {
                    Some(size) => SqlTypeSpec::sized(family, size),
                    None => SqlTypeSpec::new(family),
                };
                self.set_type(spec)?;
            }
            "datetime" | "timestamp" => {
                let family = if name == "datetime" {
                    MySqlType::DateTime
                } else {
                    MySqlType::Timestamp
                };
                let spec = match numeric {
                    Some(fsp) => SqlTypeSpec::sized(family, fsp),
                    None => SqlTypeSpec::new(family),
                };
                self.set_type(spec)?;
            }
            "autoIncrement" => self.auto_increment = true,
            "primaryKey" => self.primary_key = true,
            "unique" => self.unique = true,
            "unsigned" => self.unsigned = true,
            "onUpdate" => self.on_update = Some(reference_action(value)?),
            "onDelete" => self.on_delete = Some(reference_action(value)?),
            other => match MySqlType::from_annotation_name(other) {
                Some(family) => self.set_type(SqlTypeSpec::new(family))?,
                None => return Ok(false),
            },
        }

        Ok(true)
    }

    fn set_type(&mut self, spec: SqlTypeSpec) -> Result<(), AnnotationError> {
        if let Some(first) = self.sql_type.take() {
            return Err(AnnotationError::ConflictingTypeAnnotation {
                first,
                second: spec,
            });
        }
        self.sql_type = Some(spec);
        Ok(())
    }
}

/// Strip comment decoration left over from `/** ... */` style blocks.
fn clean_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '/' | '\0'))
}

/// Display width used when an integer annotation carries no explicit width.
fn integer_width(name: &str) -> u8 {
    match name {
        "tinyint" => 1,
        "smallint" => 2,
        "mediumint" => 4,
        "bigint" => 8,
        _ => 3,
    }
}

fn reference_action(value: Option<&str>) -> Result<ReferentialAction, AnnotationError> {
    let raw = value.unwrap_or_default();
    ReferentialAction::parse(raw)
        .ok_or_else(|| AnnotationError::InvalidReferenceAction(raw.to_string()))
}

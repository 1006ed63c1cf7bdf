//! MySQL identifier and literal escaping

use crate::value::{DATETIME_FORMAT, Value};

/// Wrap an identifier in backticks.
///
/// Already wrapped identifiers whose inner backticks are doubled pass through
/// unchanged, so escaping is idempotent.
///
/// ```
/// use tabula_core::escape::escape_identifier;
///
/// assert_eq!(escape_identifier("car"), "`car`");
/// assert_eq!(escape_identifier("`car`"), "`car`");
/// assert_eq!(escape_identifier("odd`name"), "`odd``name`");
/// ```
pub fn escape_identifier(name: &str) -> String {
    if is_escaped_identifier(name) {
        return name.to_string();
    }
    format!("`{}`", name.replace('`', "``"))
}

fn is_escaped_identifier(name: &str) -> bool {
    let Some(inner) = name.strip_prefix('`').and_then(|n| n.strip_suffix('`')) else {
        return false;
    };
    !inner.is_empty() && !inner.replace("``", "").contains('`')
}

/// `database`.`table`, or just `table` without a database
pub fn qualified_table_name(database: Option<&str>, table: &str) -> String {
    match database {
        Some(database) => format!(
            "{}.{}",
            escape_identifier(database),
            escape_identifier(table)
        ),
        None => escape_identifier(table),
    }
}

/// Render a value as a SQL literal
pub fn escape_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => format!("_utf8'{}'", escape_string(s)),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => String::from(if *b { "1" } else { "0" }),
        Value::DateTime(dt) => format!("_utf8'{}'", dt.format(DATETIME_FORMAT)),
    }
}

/// Escape the body of a single-quoted string literal
pub fn escape_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\x1a' => escaped.push_str("\\Z"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_escape_is_idempotent() {
        for name in ["car", "`", "``", "`a", "a`b`", "`car`", "we``ird"] {
            let once = escape_identifier(name);
            assert_eq!(escape_identifier(&once), once, "input {name:?}");
        }
        assert_eq!(escape_identifier("`"), "````");
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(qualified_table_name(Some("shop"), "car"), "`shop`.`car`");
        assert_eq!(qualified_table_name(None, "car"), "`car`");
    }

    #[test]
    fn test_literals() {
        assert_eq!(escape_literal(&Value::Null), "NULL");
        assert_eq!(escape_literal(&Value::from(true)), "1");
        assert_eq!(escape_literal(&Value::from(45000.0)), "45000");
        assert_eq!(escape_literal(&Value::from(1.5)), "1.5");
        assert_eq!(escape_literal(&Value::from(-3)), "-3");
        assert_eq!(
            escape_literal(&Value::from("O'Brien \\ co\n")),
            r"_utf8'O\'Brien \\ co\n'"
        );
    }
}

//! ORDER BY chains

use std::fmt;
use std::sync::Arc;

use crate::column::Column;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// An ordered list of sort keys, most significant first
#[derive(Debug, Clone)]
pub struct OrderBy {
    keys: Vec<(Arc<Column>, Direction)>,
}

impl OrderBy {
    pub fn new(column: &Arc<Column>, direction: Direction) -> Self {
        Self {
            keys: vec![(Arc::clone(column), direction)],
        }
    }

    pub fn asc(column: &Arc<Column>) -> Self {
        Self::new(column, Direction::Asc)
    }

    pub fn desc(column: &Arc<Column>) -> Self {
        Self::new(column, Direction::Desc)
    }

    /// Break ties with another key
    #[must_use]
    pub fn then(mut self, column: &Arc<Column>, direction: Direction) -> Self {
        self.keys.push((Arc::clone(column), direction));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Column, Direction)> {
        self.keys.iter().map(|(column, direction)| (column.as_ref(), *direction))
    }

    /// `ORDER BY ...` clause
    pub fn to_sql(&self) -> String {
        let keys: Vec<String> = self
            .iter()
            .map(|(column, direction)| format!("{} {direction}", column.escaped_name()))
            .collect();
        format!("ORDER BY {}", keys.join(", "))
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{FieldDecl, ReferenceDecl};
    use crate::error::SchemaError;
    use tabula_types::mysql::SemanticType;

    fn column(name: &'static str) -> Arc<Column> {
        let mut no_refs = |_: &ReferenceDecl| -> Result<Vec<Arc<Column>>, SchemaError> {
            Ok(Vec::new())
        };
        let decl = FieldDecl::typed(name, SemanticType::String);
        Arc::new(Column::build("Car", "car", &decl, &mut no_refs).unwrap())
    }

    #[test]
    fn test_chain() {
        let brand = column("brand");
        let model = column("model");
        let order = OrderBy::asc(&brand).then(&model, Direction::Desc);
        assert_eq!(order.to_sql(), "ORDER BY `brand` ASC, `model` DESC");
    }

    #[test]
    fn test_single_key_defaults_to_asc() {
        let brand = column("brand");
        assert_eq!(
            OrderBy::new(&brand, Direction::default()).to_string(),
            "ORDER BY `brand` ASC"
        );
    }
}

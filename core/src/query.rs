//! SQL statement generation.
//!
//! [`QueryBuilder`] is pure: it renders MySQL text for one entity schema and
//! never talks to the executor.

use crate::error::{QueryError, Result, SchemaError};
use crate::escape::{escape_identifier, escape_literal};
use crate::filter::Filter;
use crate::order::OrderBy;
use crate::schema::EntitySchema;
use crate::value::Row;

/// Renders statements for a single table
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    database: Option<&'a str>,
    schema: &'a EntitySchema,
}

impl<'a> QueryBuilder<'a> {
    pub const fn new(database: Option<&'a str>, schema: &'a EntitySchema) -> Self {
        Self { database, schema }
    }

    /// `db`.`table`, or `table` without a database
    pub fn table_name(&self) -> String {
        self.schema.qualified_name(self.database)
    }

    // =========================================================================
    // DDL
    // =========================================================================

    /// Generate CREATE TABLE SQL
    pub fn create_table(&self, if_not_exists: bool) -> String {
        let schema = self.schema;
        let mut definitions: Vec<String> = schema
            .columns()
            .iter()
            .map(|column| column.to_column_sql())
            .collect();

        let primary_key = schema.primary_key();
        if !primary_key.is_empty() {
            let columns = primary_key
                .iter()
                .map(|c| c.escaped_name())
                .collect::<Vec<_>>()
                .join(", ");
            definitions.push(format!(
                "CONSTRAINT {} PRIMARY KEY ({columns})",
                escape_identifier(&schema.primary_key_name()),
            ));
        }

        for column in schema.columns() {
            let (Some(reference), Some(name)) = (column.reference(), schema.foreign_key_name(column))
            else {
                continue;
            };
            definitions.push(format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON UPDATE {} ON DELETE {}",
                escape_identifier(&name),
                column.escaped_name(),
                escape_identifier(reference.column.table()),
                reference.column.escaped_name(),
                reference.on_update,
                reference.on_delete,
            ));
        }

        for column in schema.columns().iter().filter(|c| c.is_unique()) {
            definitions.push(format!(
                "CONSTRAINT {} UNIQUE ({})",
                escape_identifier(&schema.unique_key_name(column)),
                column.escaped_name(),
            ));
        }

        let mut parts = vec!["CREATE TABLE"];
        if if_not_exists {
            parts.push("IF NOT EXISTS");
        }
        format!(
            "{} {} ( {} );",
            parts.join(" "),
            self.table_name(),
            definitions.join(", ")
        )
    }

    /// Generate DROP TABLE SQL
    pub fn drop_table(&self, if_exists: bool) -> String {
        if if_exists {
            format!("DROP TABLE IF EXISTS {};", self.table_name())
        } else {
            format!("DROP TABLE {};", self.table_name())
        }
    }

    // =========================================================================
    // DML
    // =========================================================================

    /// INSERT of `values`, skipping auto-increment columns.
    ///
    /// Columns are emitted in schema order.
    pub fn insert(&self, values: &Row) -> Result<String> {
        self.check_columns(values)?;

        let (names, literals): (Vec<String>, Vec<String>) = self
            .schema
            .columns()
            .iter()
            .filter(|column| !column.is_auto_increment())
            .filter_map(|column| {
                let value = values.get(column.name())?;
                Some((column.escaped_name(), escape_literal(value)))
            })
            .unzip();

        Ok(format!(
            "INSERT INTO {} ( {} ) VALUES ( {} );",
            self.table_name(),
            names.join(", "),
            literals.join(", ")
        ))
    }

    /// SELECT of every column in schema order.
    ///
    /// Without `page_size` no LIMIT is emitted and `page` is ignored. The
    /// offset is the raw page index: pages up to 1 start at 0, page `n`
    /// starts at `n - 1`.
    pub fn select(
        &self,
        filter: Option<&Filter>,
        page_size: Option<u64>,
        page: Option<u64>,
        order: Option<&OrderBy>,
    ) -> String {
        let columns = self
            .schema
            .columns()
            .iter()
            .map(|c| c.escaped_name())
            .collect::<Vec<_>>()
            .join(", ");

        let mut parts = vec![format!("SELECT {columns} FROM {}", self.table_name())];
        parts.extend(where_clause(filter));
        parts.extend(order.map(OrderBy::to_sql));
        if let Some(size) = page_size {
            let offset = page.filter(|&p| p > 1).map_or(0, |p| p - 1);
            parts.push(format!("LIMIT {offset},{size}"));
        }
        format!("{};", parts.join(" "))
    }

    /// UPDATE setting `values`, in schema order
    pub fn update(&self, values: &Row, filter: Option<&Filter>) -> Result<String> {
        self.check_columns(values)?;

        let assignments: Vec<String> = self
            .schema
            .columns()
            .iter()
            .filter_map(|column| {
                let value = values.get(column.name())?;
                Some(format!("{} = {}", column.escaped_name(), escape_literal(value)))
            })
            .collect();

        if assignments.is_empty() {
            return Err(QueryError::EmptyAssignment {
                table: self.schema.table_name().to_string(),
            }
            .into());
        }

        let mut parts = vec![format!(
            "UPDATE {} SET {}",
            self.table_name(),
            assignments.join(", ")
        )];
        parts.extend(where_clause(filter));
        Ok(format!("{};", parts.join(" ")))
    }

    pub fn delete(&self, filter: Option<&Filter>) -> String {
        let mut parts = vec![format!("DELETE FROM {}", self.table_name())];
        parts.extend(where_clause(filter));
        format!("{};", parts.join(" "))
    }

    /// Row count, returned in a column named `count`
    pub fn count(&self, filter: Option<&Filter>) -> String {
        let mut parts = vec![format!(
            "SELECT COUNT(*) AS {} FROM {}",
            escape_identifier("count"),
            self.table_name()
        )];
        parts.extend(where_clause(filter));
        format!("{};", parts.join(" "))
    }

    fn check_columns(&self, values: &Row) -> std::result::Result<(), SchemaError> {
        for name in values.names() {
            self.schema.column(name)?;
        }
        Ok(())
    }
}

fn where_clause(filter: Option<&Filter>) -> Option<String> {
    filter
        .filter(|f| !f.is_empty())
        .map(|f| format!("WHERE {}", f.to_sql()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::FieldDecl;
    use crate::error::{TabulaError, ValueError};
    use crate::row;
    use crate::schema::{Entity, SchemaRegistry};
    use crate::value::Value;
    use tabula_types::mysql::SemanticType;

    struct Car;

    impl Entity for Car {
        const NAME: &'static str = "Car";

        fn fields() -> Vec<FieldDecl> {
            vec![
                FieldDecl::typed("id", SemanticType::Integer)
                    .doc("@autoIncrement\n@unsigned\n@primaryKey\nThe car identifier."),
                FieldDecl::typed("brand", SemanticType::String)
                    .doc("@varchar(50)\n@unique\nThe car brand."),
                FieldDecl::typed("price", SemanticType::Float).nullable(),
            ]
        }

        fn to_row(&self) -> Row {
            Row::new()
        }

        fn from_row(_: Row) -> std::result::Result<Self, ValueError> {
            Ok(Self)
        }

        fn assign(&mut self, _: &str, _: Value) -> std::result::Result<(), ValueError> {
            Ok(())
        }

        fn primary_key(&self) -> Vec<Value> {
            Vec::new()
        }
    }

    fn with_builder(test: impl FnOnce(QueryBuilder<'_>)) {
        let registry = SchemaRegistry::new();
        let schema = registry.schema::<Car>().unwrap();
        test(QueryBuilder::new(Some("shop"), &schema));
    }

    #[test]
    fn test_create_table() {
        with_builder(|qb| {
            assert_eq!(
                qb.create_table(true),
                "CREATE TABLE IF NOT EXISTS `shop`.`car` ( \
                 `id` INT UNSIGNED NOT NULL AUTO_INCREMENT COMMENT 'The car identifier.', \
                 `brand` VARCHAR(50) NOT NULL COMMENT 'The car brand.', \
                 `price` FLOAT NULL, \
                 CONSTRAINT `pk_car` PRIMARY KEY (`id`), \
                 CONSTRAINT `uniq_car_brand` UNIQUE (`brand`) );"
            );
            assert_eq!(qb.create_table(true), qb.create_table(true));
        });
    }

    #[test]
    fn test_drop_table() {
        with_builder(|qb| {
            assert_eq!(qb.drop_table(true), "DROP TABLE IF EXISTS `shop`.`car`;");
            assert_eq!(qb.drop_table(false), "DROP TABLE `shop`.`car`;");
        });
    }

    #[test]
    fn test_insert_skips_auto_increment() {
        with_builder(|qb| {
            let sql = qb
                .insert(&row! { "price" => 45000.0, "id" => 0, "brand" => "Ford" })
                .unwrap();
            assert_eq!(
                sql,
                "INSERT INTO `shop`.`car` ( `brand`, `price` ) VALUES ( _utf8'Ford', 45000 );"
            );
        });
    }

    #[test]
    fn test_insert_unknown_column() {
        with_builder(|qb| {
            let err = qb.insert(&row! { "color" => "red" }).unwrap_err();
            assert!(matches!(
                err,
                TabulaError::Schema(SchemaError::UnknownColumn { .. })
            ));
        });
    }

    #[test]
    fn test_select_pagination() {
        with_builder(|qb| {
            let base = "SELECT `id`, `brand`, `price` FROM `shop`.`car`";
            assert_eq!(qb.select(None, None, Some(3), None), format!("{base};"));
            assert_eq!(
                qb.select(None, Some(10), None, None),
                format!("{base} LIMIT 0,10;")
            );
            assert_eq!(
                qb.select(None, Some(10), Some(1), None),
                format!("{base} LIMIT 0,10;")
            );
            assert_eq!(
                qb.select(None, Some(10), Some(2), None),
                format!("{base} LIMIT 1,10;")
            );
        });
    }

    #[test]
    fn test_select_with_filter_and_order() {
        let registry = SchemaRegistry::new();
        let schema = registry.schema::<Car>().unwrap();
        let qb = QueryBuilder::new(None, &schema);
        let brand = schema.column("brand").unwrap();
        let filter = Filter::eq(brand, "Ford").unwrap();
        let order = OrderBy::desc(schema.column("price").unwrap());

        assert_eq!(
            qb.select(Some(&filter), Some(1), Some(1), Some(&order)),
            "SELECT `id`, `brand`, `price` FROM `car` WHERE `brand` = _utf8'Ford' \
             ORDER BY `price` DESC LIMIT 0,1;"
        );
    }

    #[test]
    fn test_empty_filter_omits_where() {
        with_builder(|qb| {
            let empty = Filter::and([]);
            assert_eq!(qb.delete(Some(&empty)), "DELETE FROM `shop`.`car`;");
            assert_eq!(
                qb.count(Some(&empty)),
                "SELECT COUNT(*) AS `count` FROM `shop`.`car`;"
            );
        });
    }

    #[test]
    fn test_update() {
        let registry = SchemaRegistry::new();
        let schema = registry.schema::<Car>().unwrap();
        let qb = QueryBuilder::new(Some("shop"), &schema);
        let filter = Filter::eq(schema.column("id").unwrap(), 7).unwrap();

        assert_eq!(
            qb.update(&row! { "price" => 1.5, "brand" => "Fiat" }, Some(&filter))
                .unwrap(),
            "UPDATE `shop`.`car` SET `brand` = _utf8'Fiat', `price` = 1.5 WHERE `id` = 7;"
        );
        assert!(matches!(
            qb.update(&Row::new(), Some(&filter)),
            Err(TabulaError::Query(QueryError::EmptyAssignment { .. }))
        ));
    }
}

mod common;

use std::io::Write;

use common::MockExecutor;
use common::schema::Person;
use tabula::error::{ConfigError, TabulaError};
use tabula::{Database, DatabaseConfig};

#[test]
fn test_database_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "host = \"mysql.internal\"\nuser = \"app\"\ndatabase = \"fleet\"\ndebug = true"
    )
    .unwrap();

    let config = DatabaseConfig::from_path(file.path()).unwrap();
    let db = Database::new(&config, MockExecutor::new());
    assert_eq!(db.name(), Some("fleet"));
    assert!(db.is_debug());

    db.drop_table::<Person>(true).unwrap();
    assert_eq!(
        db.executor().last_statement().unwrap(),
        "DROP TABLE IF EXISTS `fleet`.`person`;"
    );
}

#[test]
fn test_invalid_config_converts_into_tabula_error() {
    fn load(source: &str) -> tabula::Result<DatabaseConfig> {
        Ok(DatabaseConfig::from_toml_str(source)?)
    }

    assert!(matches!(
        load("host = \"\""),
        Err(TabulaError::Config(ConfigError::Invalid(_)))
    ));
    assert!(matches!(
        load("debug = \"sometimes\""),
        Err(TabulaError::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn test_debug_toggle() {
    let mut db = Database::with_executor(MockExecutor::new());
    assert!(!db.is_debug());
    db.enable_debug();
    assert!(db.is_debug());
    db.disable_debug();
    assert!(!db.is_debug());
}

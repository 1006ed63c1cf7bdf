//! Configuration types for tabula.toml

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Connection settings for a MySQL database.
///
/// The engine itself only reads `database` and `debug`; the connection fields
/// are for executor implementations.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Database name used to qualify table names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Append the offending SQL to execution errors
    #[serde(default)]
    pub debug: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: String::new(),
            password: None,
            database: None,
            debug: false,
        }
    }
}

impl DatabaseConfig {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Load configuration from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid("database name can't be empty".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host can't be empty".to_string()));
        }
        Ok(())
    }
}

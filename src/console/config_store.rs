//! Connection configuration store
//!
//! Holds the one `ConnectionConfig` the operator edits. Submitting
//! operations take a snapshot; nothing else mutates it.

use crate::model::{ConfigError, ConfigField, ConnectionConfig};

#[derive(Debug, Clone, Default)]
pub struct ConnectionConfigStore {
    config: ConnectionConfig,
}

impl ConnectionConfigStore {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Copy handed to a submitting operation
    pub fn snapshot(&self) -> ConnectionConfig {
        self.config.clone()
    }

    /// Update a field by wire key (`mysql_port`, `postgres_host`, ...)
    ///
    /// Port fields are coerced to integers; everything else is stored as is.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), ConfigError> {
        let field =
            ConfigField::from_key(name).ok_or_else(|| ConfigError::UnknownField(name.to_string()))?;
        self.set(field, raw);
        Ok(())
    }

    pub fn set(&mut self, field: ConfigField, raw: &str) {
        self.config.set(field, raw);
    }

    /// Current edit text of a field
    pub fn text(&self, field: ConfigField) -> String {
        self.config.text(field)
    }
}

//! Dual-endpoint connection configuration
//!
//! The operator edits ten fields as text. Host, username, password and
//! database are stored verbatim; ports are coerced to integers on write.
//!
//! Wire format (fixed by the backend): a flat object keyed
//! `mysql_*` for the source and `postgres_*` for the destination.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown configuration field: {0}")]
    UnknownField(String),

    #[error("{field} is not a number")]
    PortNotANumber { field: &'static str },

    #[error("{field} must be between 1 and 65535 (got {value})")]
    PortOutOfRange { field: &'static str, value: i64 },
}

/// Port value as stored after coercion
///
/// `NotANumber` is the sentinel produced by input with no leading digits.
/// It serializes as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Number(i64),
    NotANumber,
}

impl Port {
    /// Coerce raw text the way a numeric form input does:
    /// optional leading whitespace, optional sign, then leading digits.
    /// Anything after the digits is ignored. No digits → `NotANumber`.
    pub fn parse_lenient(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let digits: &str = {
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            &rest[..end]
        };
        if digits.is_empty() {
            return Port::NotANumber;
        }
        // Saturate absurdly long digit runs; validation rejects them anyway
        let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
        Port::Number(if negative { -magnitude } else { magnitude })
    }

    /// Text shown in the edit field
    pub fn as_text(&self) -> String {
        match self {
            Port::Number(n) => n.to_string(),
            Port::NotANumber => String::new(),
        }
    }

    /// Validated port number
    pub fn checked(&self, field: &'static str) -> Result<u16, ConfigError> {
        match *self {
            Port::NotANumber => Err(ConfigError::PortNotANumber { field }),
            Port::Number(n) if (1..=65535).contains(&n) => Ok(n as u16),
            Port::Number(n) => Err(ConfigError::PortOutOfRange { field, value: n }),
        }
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Port::Number(n) => serializer.serialize_i64(*n),
            Port::NotANumber => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<i64>::deserialize(deserializer)? {
            Some(n) => Port::Number(n),
            None => Port::NotANumber,
        })
    }
}

/// Which side of the migration an endpoint sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    /// Wire key prefix
    pub fn prefix(self) -> &'static str {
        match self {
            Side::Source => "mysql",
            Side::Destination => "postgres",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Source => "SOURCE DATABASE",
            Side::Destination => "DESTINATION DATABASE",
        }
    }
}

/// Field within one endpoint record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointField {
    Host,
    Port,
    Username,
    Password,
    Database,
}

impl EndpointField {
    pub const ALL: [EndpointField; 5] = [
        EndpointField::Host,
        EndpointField::Port,
        EndpointField::Username,
        EndpointField::Password,
        EndpointField::Database,
    ];

    fn suffix(self) -> &'static str {
        match self {
            EndpointField::Host => "host",
            EndpointField::Port => "port",
            EndpointField::Username => "username",
            EndpointField::Password => "password",
            EndpointField::Database => "database",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EndpointField::Host => "Host Address",
            EndpointField::Port => "Port",
            EndpointField::Username => "User",
            EndpointField::Password => "Password",
            EndpointField::Database => "DB Name",
        }
    }
}

/// Fully qualified configuration field (one of the ten wire keys)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigField {
    pub side: Side,
    pub field: EndpointField,
}

impl ConfigField {
    /// Form order: source fields, then destination fields
    pub const ALL: [ConfigField; 10] = [
        ConfigField::new(Side::Source, EndpointField::Host),
        ConfigField::new(Side::Source, EndpointField::Port),
        ConfigField::new(Side::Source, EndpointField::Username),
        ConfigField::new(Side::Source, EndpointField::Password),
        ConfigField::new(Side::Source, EndpointField::Database),
        ConfigField::new(Side::Destination, EndpointField::Host),
        ConfigField::new(Side::Destination, EndpointField::Port),
        ConfigField::new(Side::Destination, EndpointField::Username),
        ConfigField::new(Side::Destination, EndpointField::Password),
        ConfigField::new(Side::Destination, EndpointField::Database),
    ];

    pub const fn new(side: Side, field: EndpointField) -> Self {
        Self { side, field }
    }

    /// Wire key, e.g. `mysql_port`
    pub fn key(&self) -> String {
        format!("{}_{}", self.side.prefix(), self.field.suffix())
    }

    /// Look up a field by wire key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Whether the key names a port (coerced to integer on write)
    pub fn is_numeric(&self) -> bool {
        self.field == EndpointField::Port
    }

    pub fn is_secret(&self) -> bool {
        self.field == EndpointField::Password
    }
}

/// One database endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub host: String,
    pub port: Port,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl EndpointConfig {
    pub fn source_defaults() -> Self {
        Self {
            host: "localhost".to_string(),
            port: Port::Number(3306),
            username: "user".to_string(),
            password: "password".to_string(),
            database: "source_db".to_string(),
        }
    }

    pub fn destination_defaults() -> Self {
        Self {
            host: "localhost".to_string(),
            port: Port::Number(5432),
            username: "user".to_string(),
            password: "password".to_string(),
            database: "target_db".to_string(),
        }
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Source + destination configuration submitted with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireConfig", from = "WireConfig")]
pub struct ConnectionConfig {
    pub source: EndpointConfig,
    pub destination: EndpointConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            source: EndpointConfig::source_defaults(),
            destination: EndpointConfig::destination_defaults(),
        }
    }
}

impl ConnectionConfig {
    pub fn endpoint(&self, side: Side) -> &EndpointConfig {
        match side {
            Side::Source => &self.source,
            Side::Destination => &self.destination,
        }
    }

    fn endpoint_mut(&mut self, side: Side) -> &mut EndpointConfig {
        match side {
            Side::Source => &mut self.source,
            Side::Destination => &mut self.destination,
        }
    }

    /// Current value of a field as edit text
    pub fn text(&self, field: ConfigField) -> String {
        let endpoint = self.endpoint(field.side);
        match field.field {
            EndpointField::Host => endpoint.host.clone(),
            EndpointField::Port => endpoint.port.as_text(),
            EndpointField::Username => endpoint.username.clone(),
            EndpointField::Password => endpoint.password.clone(),
            EndpointField::Database => endpoint.database.clone(),
        }
    }

    /// Write raw operator text into a field (ports are coerced)
    pub fn set(&mut self, field: ConfigField, raw: &str) {
        let endpoint = self.endpoint_mut(field.side);
        match field.field {
            EndpointField::Host => endpoint.host = raw.to_string(),
            EndpointField::Port => endpoint.port = Port::parse_lenient(raw),
            EndpointField::Username => endpoint.username = raw.to_string(),
            EndpointField::Password => endpoint.password = raw.to_string(),
            EndpointField::Database => endpoint.database = raw.to_string(),
        }
    }

    /// Check the configuration is submittable
    ///
    /// Only ports are checked; the backend is the authority on everything else.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.port.checked("mysql_port")?;
        self.destination.port.checked("postgres_port")?;
        Ok(())
    }
}

/// Flat wire representation
#[derive(Serialize, Deserialize)]
struct WireConfig {
    mysql_host: String,
    mysql_port: Port,
    mysql_username: String,
    mysql_password: String,
    mysql_database: String,
    postgres_host: String,
    postgres_port: Port,
    postgres_username: String,
    postgres_password: String,
    postgres_database: String,
}

impl From<ConnectionConfig> for WireConfig {
    fn from(c: ConnectionConfig) -> Self {
        Self {
            mysql_host: c.source.host,
            mysql_port: c.source.port,
            mysql_username: c.source.username,
            mysql_password: c.source.password,
            mysql_database: c.source.database,
            postgres_host: c.destination.host,
            postgres_port: c.destination.port,
            postgres_username: c.destination.username,
            postgres_password: c.destination.password,
            postgres_database: c.destination.database,
        }
    }
}

impl From<WireConfig> for ConnectionConfig {
    fn from(w: WireConfig) -> Self {
        Self {
            source: EndpointConfig {
                host: w.mysql_host,
                port: w.mysql_port,
                username: w.mysql_username,
                password: w.mysql_password,
                database: w.mysql_database,
            },
            destination: EndpointConfig {
                host: w.postgres_host,
                port: w.postgres_port,
                username: w.postgres_username,
                password: w.postgres_password,
                database: w.postgres_database,
            },
        }
    }
}

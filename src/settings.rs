//! Startup settings
//!
//! Loaded once from TOML and then passed by value into each component.
//! Resolution order: `--config` → `$HASHBRIDGE_CONFIG` → `./hashbridge.toml`
//! → built-in defaults. `--base-url` wins over whatever the file says.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::model::{ConnectionConfig, EndpointConfig, Port};

/// Environment variable naming a settings file
pub const CONFIG_ENV: &str = "HASHBRIDGE_CONFIG";

/// File picked up from the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "hashbridge.toml";

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid base URL '{0}' (expected http:// or https://)")]
    InvalidBaseUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend root, e.g. `http://localhost:8000`
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout_secs: u64,

    /// Where a downloaded report is written
    pub report_path: PathBuf,

    pub polling: PollingSettings,
    pub notifications: NotificationSettings,
    pub logging: LoggingSettings,

    /// Initial source endpoint values
    pub source: EndpointOverrides,

    /// Initial destination endpoint values
    pub destination: EndpointOverrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub interval_ms: u64,
    /// 0 = unlimited
    pub max_polls: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub test_result_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Log file directory for TUI mode
    pub directory: PathBuf,
}

/// Partial endpoint; unset keys keep the built-in default for that side
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl EndpointOverrides {
    fn apply(&self, mut endpoint: EndpointConfig) -> EndpointConfig {
        if let Some(host) = &self.host {
            endpoint.host = host.clone();
        }
        if let Some(port) = self.port {
            endpoint.port = Port::Number(i64::from(port));
        }
        if let Some(username) = &self.username {
            endpoint.username = username.clone();
        }
        if let Some(password) = &self.password {
            endpoint.password = password.clone();
        }
        if let Some(database) = &self.database {
            endpoint.database = database.clone();
        }
        endpoint
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            report_path: PathBuf::from("secure_transfer_report.pdf"),
            polling: PollingSettings::default(),
            notifications: NotificationSettings::default(),
            logging: LoggingSettings::default(),
            source: EndpointOverrides::default(),
            destination: EndpointOverrides::default(),
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_polls: 0,
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            test_result_ttl_secs: 5,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "hashbridge=info".to_string(),
            directory: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Resolve, read and validate settings
    pub fn load(
        explicit: Option<&Path>,
        base_url_override: Option<&str>,
    ) -> Result<Self, SettingsError> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = resolve_path(explicit, env_path, Path::new(DEFAULT_CONFIG_FILE));

        let mut settings = match path {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        };
        if let Some(base_url) = base_url_override {
            settings.base_url = base_url.to_string();
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Read one TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SettingsError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.request_timeout_secs == 0 {
            return Err(SettingsError::Zero("request_timeout_secs"));
        }
        if self.polling.interval_ms == 0 {
            return Err(SettingsError::Zero("polling.interval_ms"));
        }
        if self.notifications.test_result_ttl_secs == 0 {
            return Err(SettingsError::Zero("notifications.test_result_ttl_secs"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling.interval_ms)
    }

    /// Poll limit, `None` when unlimited
    pub fn max_polls(&self) -> Option<u32> {
        (self.polling.max_polls > 0).then_some(self.polling.max_polls)
    }

    pub fn test_result_ttl(&self) -> Duration {
        Duration::from_secs(self.notifications.test_result_ttl_secs)
    }

    /// Connection configuration the console starts from
    pub fn connection_defaults(&self) -> ConnectionConfig {
        ConnectionConfig {
            source: self.source.apply(EndpointConfig::source_defaults()),
            destination: self
                .destination
                .apply(EndpointConfig::destination_defaults()),
        }
    }
}

/// Pick the settings file to read, if any
///
/// An explicit or environment path is returned even if it does not exist so
/// the read reports it; the working-directory fallback only when present.
pub fn resolve_path(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    fallback: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    fallback.is_file().then(|| fallback.to_path_buf())
}

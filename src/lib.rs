//! HashBridge: operator console for hash-verified database transfers
//!
//! Drives a migration backend that copies a MySQL source into a PostgreSQL
//! destination, polls the job, runs ad-hoc queries against either side and
//! shows the backend's hash-chained audit trail.

pub mod backend;
pub mod cli;
pub mod console;
pub mod logging;
pub mod model;
pub mod settings;
pub mod ui;

// Re-exports
pub use backend::{Backend, BackendError, FakeBackend, HttpBackend};
pub use console::{Console, ConsoleError, ConsoleEvent, View};
pub use settings::{Settings, SettingsError};

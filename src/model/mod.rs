//! Data model shared by the backend client, the console core and the UI

pub mod audit;
pub mod config;
pub mod progress;
pub mod query;
pub mod test_result;

pub use audit::{verify_chain, AuditLogEntry, ChainFinding, ChainReport, GENESIS_HASH};
pub use config::{ConfigError, ConfigField, ConnectionConfig, EndpointConfig, EndpointField, Port, Side};
pub use progress::{TransferProgress, TransferResult, TransferStatus};
pub use query::{QueryOutcome, QueryRequest, QueryTarget, Row};
pub use test_result::{TestResult, TestStatus};

//! Migration backend contract
//!
//! Every network call the console makes goes through [`Backend`]:
//! - [`HttpBackend`]: reqwest client against the real service
//! - [`FakeBackend`]: scripted responses for tests
//!
//! Errors only describe transport-level failure. Logical failures the
//! backend reports (test verdict `error`, job `failed`, query `error`) come
//! back as ordinary values.

pub mod fake;
pub mod http;

pub use fake::FakeBackend;
pub use http::HttpBackend;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::{AuditLogEntry, ConnectionConfig, QueryTarget, TestResult, TransferProgress};

/// Backend errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Connection refused, timeout, DNS failure...
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx status
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Body did not match the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

/// Raw `/execute-query` answer, classified later by
/// [`QueryOutcome::from_response`](crate::model::QueryOutcome::from_response)
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub success: bool,
    pub body: Value,
}

/// Async transport to the migration service
#[async_trait]
pub trait Backend: Send + Sync {
    /// POST /test-connection
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<TestResult, BackendError>;

    /// POST /start-transfer (success means the job was accepted)
    async fn start_transfer(&self, config: &ConnectionConfig) -> Result<(), BackendError>;

    /// GET /progress
    async fn progress(&self) -> Result<TransferProgress, BackendError>;

    /// GET /audit-logs, in the backend's (chronological) order
    async fn audit_logs(&self) -> Result<Vec<AuditLogEntry>, BackendError>;

    /// POST /execute-query
    async fn execute_query(
        &self,
        config: &ConnectionConfig,
        target: QueryTarget,
        query: &str,
    ) -> Result<QueryResponse, BackendError>;

    /// GET /download-report
    async fn download_report(&self) -> Result<Vec<u8>, BackendError>;

    /// Address an operator can open directly for the report
    fn report_url(&self) -> String;
}

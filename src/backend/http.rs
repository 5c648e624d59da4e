//! HTTP backend using reqwest
//!
//! One shared client; every request carries the configured timeout.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::backend::{Backend, BackendError, QueryResponse};
use crate::model::{
    AuditLogEntry, ConnectionConfig, QueryRequest, QueryTarget, TestResult, TransferProgress,
};

/// Real backend client
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(format!("client setup failed: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`BackendError::Http`]
    async fn ensure_success(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            error_detail(&body).unwrap_or(body)
        };
        Err(BackendError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

/// `detail` string of a FastAPI-style error body
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<TestResult, BackendError> {
        debug!(url = %self.url("/test-connection"), "testing connections");
        let response = self
            .client
            .post(self.url("/test-connection"))
            .json(config)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<TestResult>().await?)
    }

    async fn start_transfer(&self, config: &ConnectionConfig) -> Result<(), BackendError> {
        debug!(url = %self.url("/start-transfer"), "submitting transfer");
        let response = self
            .client
            .post(self.url("/start-transfer"))
            .json(config)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn progress(&self) -> Result<TransferProgress, BackendError> {
        let response = self.client.get(self.url("/progress")).send().await?;
        let response = Self::ensure_success(response).await?;
        let progress = response.json::<TransferProgress>().await?;
        Ok(progress.normalized())
    }

    async fn audit_logs(&self) -> Result<Vec<AuditLogEntry>, BackendError> {
        let response = self.client.get(self.url("/audit-logs")).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Vec<AuditLogEntry>>().await?)
    }

    async fn execute_query(
        &self,
        config: &ConnectionConfig,
        target: QueryTarget,
        query: &str,
    ) -> Result<QueryResponse, BackendError> {
        debug!(%target, query_len = query.len(), "executing query");
        let response = self
            .client
            .post(self.url("/execute-query"))
            .json(&QueryRequest {
                config,
                target,
                query,
            })
            .send()
            .await?;
        let success = response.status().is_success();
        let text = response.text().await?;
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            // Error pages are not always JSON; keep the text so it can be shown
            Err(_) if !success => Value::String(text),
            Err(e) => return Err(e.into()),
        };
        Ok(QueryResponse { success, body })
    }

    async fn download_report(&self) -> Result<Vec<u8>, BackendError> {
        let response = self.client.get(self.report_url()).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn report_url(&self) -> String {
        self.url("/download-report")
    }
}

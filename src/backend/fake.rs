//! Fake backend for testing
//!
//! Every endpoint has a script queue. Each call pops the front entry; the
//! last entry stays in place so it keeps answering. An empty queue answers
//! with a neutral default (idle progress, empty trail, accepted transfer).

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::{Backend, BackendError, QueryResponse};
use crate::model::{
    AuditLogEntry, ConnectionConfig, QueryTarget, TestResult, TestStatus, TransferProgress,
    TransferStatus,
};

/// Script queue that repeats its last answer
#[derive(Debug)]
struct Script<T> {
    answers: Mutex<VecDeque<T>>,
    calls: AtomicUsize,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn push(&self, answer: T) {
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(answer);
    }

    fn next(&self) -> Option<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut answers = self.answers.lock().unwrap_or_else(|e| e.into_inner());
        if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().cloned()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Scripted backend (no network)
#[derive(Debug)]
pub struct FakeBackend {
    tests: Script<Result<TestResult, BackendError>>,
    starts: Script<Result<(), BackendError>>,
    progress: Script<Result<TransferProgress, BackendError>>,
    audit: Script<Result<Vec<AuditLogEntry>, BackendError>>,
    queries: Script<Result<QueryResponse, BackendError>>,
    reports: Script<Result<Vec<u8>, BackendError>>,
    latency: Mutex<Option<Duration>>,
    last_config: Mutex<Option<ConnectionConfig>>,
    last_query: Mutex<Option<(QueryTarget, String)>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            tests: Script::new(),
            starts: Script::new(),
            progress: Script::new(),
            audit: Script::new(),
            queries: Script::new(),
            reports: Script::new(),
            latency: Mutex::new(None),
            last_config: Mutex::new(None),
            last_query: Mutex::new(None),
        }
    }

    /// Delay every call (use with a paused tokio clock)
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = Some(latency);
    }

    pub fn push_test(&self, answer: Result<TestResult, BackendError>) {
        self.tests.push(answer);
    }

    pub fn push_start(&self, answer: Result<(), BackendError>) {
        self.starts.push(answer);
    }

    pub fn push_progress(&self, answer: Result<TransferProgress, BackendError>) {
        self.progress.push(answer);
    }

    pub fn push_audit(&self, answer: Result<Vec<AuditLogEntry>, BackendError>) {
        self.audit.push(answer);
    }

    pub fn push_query(&self, answer: Result<QueryResponse, BackendError>) {
        self.queries.push(answer);
    }

    pub fn push_report(&self, answer: Result<Vec<u8>, BackendError>) {
        self.reports.push(answer);
    }

    pub fn test_calls(&self) -> usize {
        self.tests.calls()
    }

    pub fn start_calls(&self) -> usize {
        self.starts.calls()
    }

    pub fn progress_calls(&self) -> usize {
        self.progress.calls()
    }

    pub fn audit_calls(&self) -> usize {
        self.audit.calls()
    }

    pub fn query_calls(&self) -> usize {
        self.queries.calls()
    }

    pub fn report_calls(&self) -> usize {
        self.reports.calls()
    }

    /// Configuration carried by the most recent config-bearing call
    pub fn last_config(&self) -> Option<ConnectionConfig> {
        self.last_config
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Target and statement of the most recent query
    pub fn last_query(&self) -> Option<(QueryTarget, String)> {
        self.last_query
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn delay(&self) {
        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn record_config(&self, config: &ConnectionConfig) {
        *self.last_config.lock().unwrap_or_else(|e| e.into_inner()) = Some(config.clone());
    }
}

/// Progress record helper for scripts
pub fn progress(status: TransferStatus, step: &str, logs: &[&str]) -> TransferProgress {
    TransferProgress {
        status,
        current_step: step.to_string(),
        logs: logs.iter().map(|l| l.to_string()).collect(),
        result: None,
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<TestResult, BackendError> {
        self.record_config(config);
        let answer = self.tests.next();
        self.delay().await;
        answer.unwrap_or_else(|| {
            Ok(TestResult {
                status: TestStatus::Success,
                message: "All connections verified successfully.".to_string(),
            })
        })
    }

    async fn start_transfer(&self, config: &ConnectionConfig) -> Result<(), BackendError> {
        self.record_config(config);
        let answer = self.starts.next();
        self.delay().await;
        answer.unwrap_or(Ok(()))
    }

    async fn progress(&self) -> Result<TransferProgress, BackendError> {
        let answer = self.progress.next();
        self.delay().await;
        answer
            .unwrap_or_else(|| Ok(progress(TransferStatus::Idle, "Waiting for start", &[])))
            .map(TransferProgress::normalized)
    }

    async fn audit_logs(&self) -> Result<Vec<AuditLogEntry>, BackendError> {
        let answer = self.audit.next();
        self.delay().await;
        answer.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn execute_query(
        &self,
        config: &ConnectionConfig,
        target: QueryTarget,
        query: &str,
    ) -> Result<QueryResponse, BackendError> {
        self.record_config(config);
        *self.last_query.lock().unwrap_or_else(|e| e.into_inner()) =
            Some((target, query.to_string()));
        let answer = self.queries.next();
        self.delay().await;
        answer.unwrap_or_else(|| {
            Ok(QueryResponse {
                success: true,
                body: Value::Array(Vec::new()),
            })
        })
    }

    async fn download_report(&self) -> Result<Vec<u8>, BackendError> {
        let answer = self.reports.next();
        self.delay().await;
        answer.unwrap_or_else(|| Ok(b"%PDF-1.4\n".to_vec()))
    }

    fn report_url(&self) -> String {
        "http://fake.invalid/download-report".to_string()
    }
}

/// Successful `/execute-query` answer
pub fn query_ok(body: Value) -> Result<QueryResponse, BackendError> {
    Ok(QueryResponse {
        success: true,
        body,
    })
}

/// `/execute-query` answer carrying an `{error}` record
pub fn query_error(message: &str) -> Result<QueryResponse, BackendError> {
    Ok(QueryResponse {
        success: true,
        body: json!({ "error": message }),
    })
}

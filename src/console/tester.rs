//! Connection tester
//!
//! Verdicts are transient: each invocation arms its own expiry timer. A new
//! invocation aborts the previous timer, and every verdict or expiry is
//! tagged with its invocation number, so an older response can never
//! overwrite or clear a newer result.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::console::events::{ConsoleEvent, EventSender};
use crate::model::{ConnectionConfig, TestResult};

pub struct ConnectionTester {
    backend: Arc<dyn Backend>,
    events: EventSender,
    ttl: Duration,
    invocation: u64,
    result: Option<TestResult>,
    expiry: Option<AbortHandle>,
}

impl ConnectionTester {
    pub fn new(backend: Arc<dyn Backend>, events: EventSender, ttl: Duration) -> Self {
        Self {
            backend,
            events,
            ttl,
            invocation: 0,
            result: None,
            expiry: None,
        }
    }

    /// Current verdict, `None` once expired
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn invocation(&self) -> u64 {
        self.invocation
    }

    /// Start a test; the result is `testing` until the verdict arrives
    pub fn test_connection(&mut self, config: ConnectionConfig) {
        self.invocation += 1;
        let invocation = self.invocation;
        self.disarm();

        if let Err(e) = config.validate() {
            debug!(invocation, "connection test rejected locally: {}", e);
            self.settle(invocation, TestResult::error(e.to_string()));
            return;
        }

        self.result = Some(TestResult::testing());
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = match backend.test_connection(&config).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(invocation, "connection test request failed: {}", e);
                    TestResult::unreachable()
                }
            };
            let _ = events.send(ConsoleEvent::TestFinished { invocation, result });
        });
    }

    pub fn apply_finished(&mut self, invocation: u64, result: TestResult) {
        if invocation != self.invocation {
            debug!(invocation, current = self.invocation, "discarding stale test verdict");
            return;
        }
        self.settle(invocation, result);
    }

    pub fn apply_expired(&mut self, invocation: u64) {
        if invocation != self.invocation {
            return;
        }
        self.result = None;
        self.expiry = None;
    }

    fn settle(&mut self, invocation: u64, result: TestResult) {
        self.result = Some(result);
        self.disarm();
        let ttl = self.ttl;
        let events = self.events.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let _ = events.send(ConsoleEvent::TestExpired { invocation });
        });
        self.expiry = Some(timer.abort_handle());
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.expiry.take() {
            timer.abort();
        }
    }
}

impl Drop for ConnectionTester {
    fn drop(&mut self) {
        self.disarm();
    }
}

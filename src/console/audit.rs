//! Audit trail viewer
//!
//! Entries are kept most-recent-first (the reverse of arrival order) and
//! never re-sorted. Each successful fetch is also checked with
//! [`verify_chain`]; the report is informational only.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendError};
use crate::console::events::{ConsoleEvent, EventSender};
use crate::model::{verify_chain, AuditLogEntry, ChainReport};

pub struct AuditTrailViewer {
    backend: Arc<dyn Backend>,
    events: EventSender,
    entries: Vec<AuditLogEntry>,
    chain: Option<ChainReport>,
    loading: bool,
    request: u64,
    last_error: Option<String>,
}

impl AuditTrailViewer {
    pub fn new(backend: Arc<dyn Backend>, events: EventSender) -> Self {
        Self {
            backend,
            events,
            entries: Vec::new(),
            chain: None,
            loading: false,
            request: 0,
            last_error: None,
        }
    }

    /// Display order: most recent first
    pub fn entries(&self) -> &[AuditLogEntry] {
        &self.entries
    }

    pub fn chain(&self) -> Option<&ChainReport> {
        self.chain.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetch the trail; the newest request wins
    pub fn refresh(&mut self) {
        self.request += 1;
        self.loading = true;
        let request = self.request;
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        debug!(request, "refreshing audit trail");
        tokio::spawn(async move {
            let outcome = backend.audit_logs().await;
            let _ = events.send(ConsoleEvent::AuditFetched { request, outcome });
        });
    }

    /// Store a fetch result (entries in arrival order)
    ///
    /// Returns `None` for a stale answer. A failure keeps the previous entries.
    pub fn apply_fetched(
        &mut self,
        request: u64,
        outcome: Result<Vec<AuditLogEntry>, BackendError>,
    ) -> Option<Result<usize, BackendError>> {
        if request != self.request {
            debug!(request, "discarding stale audit fetch");
            return None;
        }
        self.loading = false;
        match outcome {
            Ok(mut entries) => {
                let report = verify_chain(&entries);
                if report.is_intact() {
                    info!(entries = entries.len(), "audit trail loaded");
                } else {
                    warn!(entries = entries.len(), "audit trail loaded: {}", report.summary());
                }
                entries.reverse();
                let count = entries.len();
                self.entries = entries;
                self.chain = Some(report);
                self.last_error = None;
                Some(Ok(count))
            }
            Err(e) => {
                warn!("audit trail fetch failed: {}", e);
                self.last_error = Some(e.to_string());
                Some(Err(e))
            }
        }
    }
}

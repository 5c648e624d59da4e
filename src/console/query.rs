//! Query console
//!
//! Runs one statement at a time against the source or destination. The
//! statement text and target survive each other's changes and the last
//! outcome stays visible until the next one replaces it.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::console::events::{ConsoleEvent, EventSender};
use crate::console::ConsoleError;
use crate::model::{ConnectionConfig, QueryOutcome, QueryTarget};

/// Statement pre-filled in a fresh console
pub const DEFAULT_QUERY: &str = "SELECT * FROM users LIMIT 5";

pub struct QueryConsole {
    backend: Arc<dyn Backend>,
    events: EventSender,
    query: String,
    target: QueryTarget,
    loading: bool,
    request: u64,
    outcome: Option<QueryOutcome>,
}

impl QueryConsole {
    pub fn new(backend: Arc<dyn Backend>, events: EventSender) -> Self {
        Self {
            backend,
            events,
            query: DEFAULT_QUERY.to_string(),
            target: QueryTarget::default(),
            loading: false,
            request: 0,
            outcome: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Editable statement buffer
    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn target(&self) -> QueryTarget {
        self.target
    }

    pub fn set_target(&mut self, target: QueryTarget) {
        self.target = target;
    }

    pub fn toggle_target(&mut self) {
        self.target = self.target.toggled();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn outcome(&self) -> Option<&QueryOutcome> {
        self.outcome.as_ref()
    }

    /// Run the current statement against the current target
    pub fn execute(&mut self, config: ConnectionConfig) -> Result<(), ConsoleError> {
        if self.loading {
            return Err(ConsoleError::QueryInFlight);
        }
        self.request += 1;
        let request = self.request;

        if let Err(e) = config.validate() {
            debug!(request, "query rejected locally: {}", e);
            self.outcome = Some(QueryOutcome::Error(e.to_string()));
            return Ok(());
        }

        self.loading = true;
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let target = self.target;
        let query = self.query.clone();
        debug!(request, %target, "executing query");
        tokio::spawn(async move {
            let outcome = match backend.execute_query(&config, target, &query).await {
                Ok(response) => QueryOutcome::from_response(response.success, response.body),
                Err(e) => {
                    warn!(request, "query request failed: {}", e);
                    QueryOutcome::transport_failure()
                }
            };
            let _ = events.send(ConsoleEvent::QueryFinished { request, outcome });
        });
        Ok(())
    }

    pub fn apply_finished(&mut self, request: u64, outcome: QueryOutcome) {
        if request != self.request {
            debug!(request, "discarding stale query outcome");
            return;
        }
        self.loading = false;
        self.outcome = Some(outcome);
    }
}

//! Operator console core
//!
//! `Console` owns all console state. Operator actions start work on spawned
//! tasks; completions come back as [`ConsoleEvent`]s which the main loop
//! feeds to [`Console::apply`]. Nothing else mutates state, so there are no
//! locks.
//!
//! Components:
//! - [`ConnectionConfigStore`]: the edited configuration
//! - [`ConnectionTester`]: transient test verdicts
//! - [`TransferOrchestrator`] + [`ProgressPoller`]: job submission and polling
//! - [`QueryConsole`]: ad-hoc statements
//! - [`AuditTrailViewer`]: hash-chained audit log
//! - [`ReportDownloader`]: PDF report
//! - [`ViewRouter`]: which view is shown

pub mod audit;
pub mod config_store;
pub mod events;
pub mod poller;
pub mod query;
pub mod report;
pub mod router;
pub mod tester;
pub mod transfer;

pub use audit::AuditTrailViewer;
pub use config_store::ConnectionConfigStore;
pub use events::{ConsoleEvent, EventReceiver, EventSender, PollStop};
pub use poller::{PollHandle, ProgressPoller};
pub use query::{QueryConsole, DEFAULT_QUERY};
pub use report::ReportDownloader;
pub use router::{View, ViewRouter};
pub use tester::ConnectionTester;
pub use transfer::{Followup, TransferOrchestrator};

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;

use crate::backend::Backend;
use crate::model::{ConfigError, TransferStatus};
use crate::settings::Settings;

/// Notices kept for display
pub const MAX_NOTICES: usize = 200;

/// Console errors (rejected operator actions)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("A transfer is already in progress")]
    TransferInProgress,

    #[error("Progress polling is already active")]
    AlreadyPolling,

    #[error("A query is already running")]
    QueryInFlight,

    #[error("A report download is already running")]
    DownloadInFlight,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// Timestamped operator-facing message
#[derive(Debug, Clone)]
pub struct Notice {
    pub at: DateTime<Local>,
    pub level: NoticeLevel,
    pub text: String,
}

pub struct Console {
    config: ConnectionConfigStore,
    tester: ConnectionTester,
    transfer: TransferOrchestrator,
    query: QueryConsole,
    audit: AuditTrailViewer,
    report: ReportDownloader,
    router: ViewRouter,
    notices: VecDeque<Notice>,
    events: EventReceiver,
}

impl Console {
    pub fn new(backend: Arc<dyn Backend>, settings: &Settings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = ProgressPoller::new(
            Arc::clone(&backend),
            settings.poll_interval(),
            settings.max_polls(),
        );
        Self {
            config: ConnectionConfigStore::new(settings.connection_defaults()),
            tester: ConnectionTester::new(
                Arc::clone(&backend),
                tx.clone(),
                settings.test_result_ttl(),
            ),
            transfer: TransferOrchestrator::new(Arc::clone(&backend), poller, tx.clone()),
            query: QueryConsole::new(Arc::clone(&backend), tx.clone()),
            audit: AuditTrailViewer::new(Arc::clone(&backend), tx.clone()),
            report: ReportDownloader::new(backend, tx, settings.report_path.clone()),
            router: ViewRouter::new(),
            notices: VecDeque::new(),
            events: rx,
        }
    }

    /// Initial load: fetch the audit trail once
    pub fn boot(&mut self) {
        self.audit.refresh();
    }

    // ---- accessors ----

    pub fn config(&self) -> &ConnectionConfigStore {
        &self.config
    }

    pub fn tester(&self) -> &ConnectionTester {
        &self.tester
    }

    pub fn transfer(&self) -> &TransferOrchestrator {
        &self.transfer
    }

    pub fn query(&self) -> &QueryConsole {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryConsole {
        &mut self.query
    }

    pub fn audit(&self) -> &AuditTrailViewer {
        &self.audit
    }

    pub fn report(&self) -> &ReportDownloader {
        &self.report
    }

    pub fn view(&self) -> View {
        self.router.current()
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.back()
    }

    // ---- operator actions ----

    pub fn switch_view(&mut self, view: View) {
        self.router.switch_to(view);
    }

    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), ConfigError> {
        self.config.set_field(name, raw)
    }

    pub fn config_mut(&mut self) -> &mut ConnectionConfigStore {
        &mut self.config
    }

    pub fn test_connection(&mut self) {
        self.tester.test_connection(self.config.snapshot());
    }

    pub fn start_transfer(&mut self) -> Result<(), ConsoleError> {
        let result = self.transfer.start_transfer(self.config.snapshot());
        match &result {
            Ok(()) => self.notify(NoticeLevel::Info, "Submitting transfer..."),
            Err(e) => self.notify(NoticeLevel::Error, format!("Cannot start transfer: {}", e)),
        }
        result
    }

    pub fn stop_polling(&mut self) -> bool {
        let stopped = self.transfer.stop_polling(PollStop::Manual);
        if stopped {
            self.notify(NoticeLevel::Info, "Progress polling stopped");
        }
        stopped
    }

    pub fn resume_polling(&mut self) -> Result<(), ConsoleError> {
        let result = self.transfer.resume_polling();
        match &result {
            Ok(()) => self.notify(NoticeLevel::Info, "Progress polling resumed"),
            Err(e) => self.notify(NoticeLevel::Warn, e.to_string()),
        }
        result
    }

    pub fn execute_query(&mut self) -> Result<(), ConsoleError> {
        let result = self.query.execute(self.config.snapshot());
        if let Err(e) = &result {
            self.notify(NoticeLevel::Warn, e.to_string());
        }
        result
    }

    pub fn refresh_audit(&mut self) {
        self.audit.refresh();
    }

    pub fn download_report(&mut self, path: Option<PathBuf>) -> Result<(), ConsoleError> {
        let result = self.report.download(path);
        match &result {
            Ok(()) => self.notify(NoticeLevel::Info, "Downloading report..."),
            Err(e) => self.notify(NoticeLevel::Warn, e.to_string()),
        }
        result
    }

    // ---- event plumbing ----

    /// Wait for the next completion
    pub async fn next_event(&mut self) -> Option<ConsoleEvent> {
        self.events.recv().await
    }

    /// Apply every completion already queued, without waiting
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Apply events until `done` holds
    pub async fn run_until<F>(&mut self, mut done: F)
    where
        F: FnMut(&Console) -> bool,
    {
        while !done(self) {
            match self.next_event().await {
                Some(event) => self.apply(event),
                None => return,
            }
        }
    }

    /// Apply one completion to console state
    pub fn apply(&mut self, event: ConsoleEvent) {
        trace!(kind = event.kind(), "applying console event");
        match event {
            ConsoleEvent::TestFinished { invocation, result } => {
                self.tester.apply_finished(invocation, result);
            }
            ConsoleEvent::TestExpired { invocation } => {
                self.tester.apply_expired(invocation);
            }
            ConsoleEvent::TransferSubmitted {
                submission,
                outcome,
            } => match self.transfer.apply_submitted(submission, outcome) {
                Some(Ok(())) => self.notify(NoticeLevel::Info, "Transfer started"),
                Some(Err(e)) => {
                    self.notify(NoticeLevel::Error, format!("Transfer failed to start: {}", e))
                }
                None => {}
            },
            ConsoleEvent::ProgressTick { session, progress } => {
                let was_polling = self.transfer.is_polling();
                if let Some(Followup::RefreshAudit) = self.transfer.apply_tick(session, progress) {
                    self.audit.refresh();
                }
                if was_polling && self.transfer.last_stop() == Some(&PollStop::NoActiveJob) {
                    self.notify(NoticeLevel::Info, "Progress polling stopped: no job running");
                }
            }
            ConsoleEvent::PollingStopped { session, reason } => {
                let notice = match &reason {
                    PollStop::Terminal(TransferStatus::Completed) => {
                        let verdict = match self
                            .transfer
                            .progress()
                            .and_then(|p| p.integrity_passed())
                        {
                            Some(true) => "integrity check passed",
                            Some(false) => "integrity check FAILED",
                            None => "no integrity result",
                        };
                        Some((NoticeLevel::Info, format!("Transfer completed: {}", verdict)))
                    }
                    PollStop::Terminal(_) => {
                        let step = self
                            .transfer
                            .progress()
                            .map(|p| p.current_step.clone())
                            .unwrap_or_default();
                        Some((NoticeLevel::Error, format!("Transfer failed: {}", step)))
                    }
                    PollStop::TransportFailure(e) => Some((
                        NoticeLevel::Warn,
                        format!("Progress polling stopped: {}", e),
                    )),
                    PollStop::LimitReached(n) => Some((
                        NoticeLevel::Warn,
                        format!("Progress polling stopped after {} polls", n),
                    )),
                    PollStop::NoActiveJob | PollStop::Manual | PollStop::Teardown => None,
                };
                if self.transfer.apply_polling_stopped(session, reason) {
                    if let Some((level, text)) = notice {
                        self.notify(level, text);
                    }
                }
            }
            ConsoleEvent::QueryFinished { request, outcome } => {
                self.query.apply_finished(request, outcome);
            }
            ConsoleEvent::AuditFetched { request, outcome } => {
                match self.audit.apply_fetched(request, outcome) {
                    Some(Ok(_)) => {
                        let broken = self
                            .audit
                            .chain()
                            .filter(|r| !r.is_intact())
                            .map(|r| r.summary());
                        if let Some(summary) = broken {
                            self.notify(NoticeLevel::Warn, format!("Audit trail: {}", summary));
                        }
                    }
                    Some(Err(e)) => {
                        self.notify(NoticeLevel::Warn, format!("Audit trail refresh failed: {}", e))
                    }
                    None => {}
                }
            }
            ConsoleEvent::ReportSaved { request, outcome } => {
                match self.report.apply_saved(request, outcome) {
                    Some(Ok((path, size))) => self.notify(
                        NoticeLevel::Info,
                        format!("Report saved to {} ({} bytes)", path.display(), size),
                    ),
                    Some(Err(e)) => {
                        self.notify(NoticeLevel::Error, format!("Report download failed: {}", e))
                    }
                    None => {}
                }
            }
        }
    }

    /// Append an operator notice
    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            at: Local::now(),
            level,
            text: text.into(),
        });
    }
}

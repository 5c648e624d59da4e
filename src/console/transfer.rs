//! Transfer orchestrator
//!
//! Lifecycle: idle → running → completed | failed
//!
//! Submission and polling are separate steps. An accepted submission
//! attaches a poll session; a rejected one leaves progress untouched. All
//! ways a session can end funnel through [`TransferOrchestrator::stop_polling`].

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendError};
use crate::console::events::{ConsoleEvent, EventSender, PollStop};
use crate::console::poller::{PollHandle, ProgressPoller};
use crate::console::ConsoleError;
use crate::model::{ConnectionConfig, TransferProgress, TransferStatus};

/// Work the caller must do after applying a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Followup {
    /// A terminal status was observed; reload the audit trail once
    RefreshAudit,
}

pub struct TransferOrchestrator {
    backend: Arc<dyn Backend>,
    poller: ProgressPoller,
    events: EventSender,
    progress: Option<TransferProgress>,
    submission: u64,
    submitting: bool,
    session: u64,
    handle: Option<PollHandle>,
    /// Current session was attached by `resume_polling`, not a submission
    resumed: bool,
    last_stop: Option<PollStop>,
}

impl TransferOrchestrator {
    pub fn new(backend: Arc<dyn Backend>, poller: ProgressPoller, events: EventSender) -> Self {
        Self {
            backend,
            poller,
            events,
            progress: None,
            submission: 0,
            submitting: false,
            session: 0,
            handle: None,
            resumed: false,
            last_stop: None,
        }
    }

    /// Last progress record seen, `None` before the first tick
    pub fn progress(&self) -> Option<&TransferProgress> {
        self.progress.as_ref()
    }

    pub fn status(&self) -> Option<TransferStatus> {
        self.progress.as_ref().map(|p| p.status)
    }

    pub fn is_polling(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Why the most recent poll session ended
    pub fn last_stop(&self) -> Option<&PollStop> {
        self.last_stop.as_ref()
    }

    /// A resumed session watching a job that is not running does not block
    /// a new submission; a session attached by a submission does.
    pub fn can_start(&self) -> bool {
        self.status() != Some(TransferStatus::Running)
            && !self.submitting
            && (self.handle.is_none() || self.resumed)
    }

    /// Submit a transfer job
    pub fn start_transfer(&mut self, config: ConnectionConfig) -> Result<(), ConsoleError> {
        if !self.can_start() {
            return Err(ConsoleError::TransferInProgress);
        }
        config.validate()?;
        self.stop_polling(PollStop::Manual);

        self.submission += 1;
        self.submitting = true;
        let submission = self.submission;
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        info!(
            submission,
            source = %config.source.host,
            destination = %config.destination.host,
            "submitting transfer"
        );
        tokio::spawn(async move {
            let outcome = backend.start_transfer(&config).await;
            let _ = events.send(ConsoleEvent::TransferSubmitted {
                submission,
                outcome,
            });
        });
        Ok(())
    }

    /// Apply a submission answer
    ///
    /// Returns `None` for a stale answer, otherwise the outcome so the caller
    /// can surface it.
    pub fn apply_submitted(
        &mut self,
        submission: u64,
        outcome: Result<(), BackendError>,
    ) -> Option<Result<(), BackendError>> {
        if submission != self.submission || !self.submitting {
            debug!(submission, "discarding stale submission answer");
            return None;
        }
        self.submitting = false;
        match &outcome {
            Ok(()) => {
                info!(submission, "transfer accepted");
                self.attach(false);
            }
            Err(e) => warn!(submission, "transfer submission failed: {}", e),
        }
        Some(outcome)
    }

    /// Replace progress with a tick from the current session
    pub fn apply_tick(&mut self, session: u64, progress: TransferProgress) -> Option<Followup> {
        if !self.is_current(session) {
            debug!(session, "discarding tick from stale poll session");
            return None;
        }
        let status = progress.status;
        let previous = self.status();
        self.progress = Some(progress.normalized());
        if previous != Some(status) {
            info!(session, status = status.display_name(), "transfer status changed");
        }
        if self.resumed && status == TransferStatus::Idle {
            self.stop_polling(PollStop::NoActiveJob);
            return None;
        }
        status.is_terminal().then_some(Followup::RefreshAudit)
    }

    /// The poll task ended on its own
    pub fn apply_polling_stopped(&mut self, session: u64, reason: PollStop) -> bool {
        if !self.is_current(session) {
            return false;
        }
        self.stop_polling(reason)
    }

    /// Stop the current session, whatever the reason
    ///
    /// Returns whether a session was attached.
    pub fn stop_polling(&mut self, reason: PollStop) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        handle.cancel();
        match &reason {
            PollStop::TransportFailure(_) | PollStop::LimitReached(_) => {
                warn!(session = handle.session(), "polling stopped: {}", reason.describe())
            }
            _ => info!(session = handle.session(), "polling stopped: {}", reason.describe()),
        }
        self.last_stop = Some(reason);
        true
    }

    /// Re-attach a poll session after it was stopped
    ///
    /// Rejected while a submission is in flight; the accepted submission
    /// attaches its own session. A resumed session that sees an idle job
    /// stops with [`PollStop::NoActiveJob`].
    pub fn resume_polling(&mut self) -> Result<(), ConsoleError> {
        if self.submitting {
            return Err(ConsoleError::TransferInProgress);
        }
        if self.handle.is_some() {
            return Err(ConsoleError::AlreadyPolling);
        }
        info!("resuming progress polling");
        self.attach(true);
        Ok(())
    }

    fn attach(&mut self, resumed: bool) {
        self.stop_polling(PollStop::Manual);
        self.session += 1;
        self.resumed = resumed;
        self.last_stop = None;
        self.handle = Some(self.poller.spawn(self.session, self.events.clone()));
    }

    fn is_current(&self, session: u64) -> bool {
        self.handle.as_ref().map(PollHandle::session) == Some(session)
    }
}

impl Drop for TransferOrchestrator {
    fn drop(&mut self) {
        self.stop_polling(PollStop::Teardown);
    }
}

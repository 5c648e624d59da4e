//! Progress poller
//!
//! One poll session = one spawned task. Ticks are serial and the interval is
//! measured from the end of the previous tick, so a slow backend never sees
//! overlapping requests. The task ends by itself on a terminal status, a
//! failed request or the poll limit. Anything else ends it through its
//! [`PollHandle`].

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::console::events::{ConsoleEvent, EventSender, PollStop};

/// Owner of a running poll task; cancels and aborts it on drop
#[derive(Debug)]
pub struct PollHandle {
    session: u64,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Ask the task to stop at its next suspension point
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
        self.task.abort();
    }
}

/// Spawns poll sessions against `/progress`
#[derive(Clone)]
pub struct ProgressPoller {
    backend: Arc<dyn Backend>,
    interval: Duration,
    max_polls: Option<u32>,
}

impl ProgressPoller {
    pub fn new(backend: Arc<dyn Backend>, interval: Duration, max_polls: Option<u32>) -> Self {
        Self {
            backend,
            interval,
            max_polls,
        }
    }

    /// Start a poll session
    pub fn spawn(&self, session: u64, events: EventSender) -> PollHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.backend),
            self.interval,
            self.max_polls,
            session,
            events,
            token.clone(),
        ));
        PollHandle {
            session,
            token,
            task,
        }
    }
}

async fn poll_loop(
    backend: Arc<dyn Backend>,
    interval: Duration,
    max_polls: Option<u32>,
    session: u64,
    events: EventSender,
    token: CancellationToken,
) {
    info!(session, interval_ms = interval.as_millis() as u64, "polling started");
    let mut polls: u32 = 0;

    let reason = loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }

        let tick = tokio::select! {
            _ = token.cancelled() => return,
            tick = backend.progress() => tick,
        };
        polls += 1;

        match tick {
            Ok(progress) => {
                let status = progress.status;
                debug!(session, polls, status = status.display_name(), "progress tick");
                if events
                    .send(ConsoleEvent::ProgressTick { session, progress })
                    .is_err()
                {
                    return;
                }
                if status.is_terminal() {
                    break PollStop::Terminal(status);
                }
            }
            Err(e) => {
                warn!(session, "progress poll failed: {}", e);
                break PollStop::TransportFailure(e.to_string());
            }
        }

        if let Some(limit) = max_polls {
            if polls >= limit {
                break PollStop::LimitReached(limit);
            }
        }
    };

    let _ = events.send(ConsoleEvent::PollingStopped { session, reason });
}

//! Report download
//!
//! Fetches `/download-report` and writes the bytes to disk.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::console::events::{ConsoleEvent, EventSender};
use crate::console::ConsoleError;

pub struct ReportDownloader {
    backend: Arc<dyn Backend>,
    events: EventSender,
    default_path: PathBuf,
    request: u64,
    downloading: bool,
}

impl ReportDownloader {
    pub fn new(backend: Arc<dyn Backend>, events: EventSender, default_path: PathBuf) -> Self {
        Self {
            backend,
            events,
            default_path,
            request: 0,
            downloading: false,
        }
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    /// Address the report can also be fetched from
    pub fn url(&self) -> String {
        self.backend.report_url()
    }

    /// Download into `path` (or the configured report path)
    pub fn download(&mut self, path: Option<PathBuf>) -> Result<(), ConsoleError> {
        if self.downloading {
            return Err(ConsoleError::DownloadInFlight);
        }
        self.request += 1;
        self.downloading = true;
        let request = self.request;
        let path = path.unwrap_or_else(|| self.default_path.clone());
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = match backend.download_report().await {
                Ok(bytes) => match tokio::fs::write(&path, &bytes).await {
                    Ok(()) => Ok((path, bytes.len())),
                    Err(e) => Err(format!("cannot write {}: {}", path.display(), e)),
                },
                Err(e) => Err(e.to_string()),
            };
            let _ = events.send(ConsoleEvent::ReportSaved { request, outcome });
        });
        Ok(())
    }

    /// Returns `None` for a stale answer
    pub fn apply_saved(
        &mut self,
        request: u64,
        outcome: Result<(PathBuf, usize), String>,
    ) -> Option<Result<(PathBuf, usize), String>> {
        if request != self.request {
            return None;
        }
        self.downloading = false;
        match &outcome {
            Ok((path, size)) => info!(bytes = size, "report saved to {}", path.display()),
            Err(e) => warn!("report download failed: {}", e),
        }
        Some(outcome)
    }
}

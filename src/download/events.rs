//! Caller-facing download events.
//!
//! The orchestrator never touches UI state directly. Everything a shell needs
//! to render (raw tool output, progress, retry notices, final outcome) is
//! pushed through an `EventSink` handed in by the caller.

use std::sync::Mutex;
use tokio::sync::mpsc;

/// Final result of one download (or of a rejected batch).
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    /// yt-dlp exited with code 0
    Success { attempts: u32 },
    /// Every allowed attempt failed
    FailedAfterRetries { attempts: u32 },
    /// Input rejected before any process was spawned
    ValidationError(String),
    /// Stopped by the caller's cancellation token
    Cancelled,
    /// Processing stopped by an I/O failure on the session log
    Aborted(String),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }
}

/// One event emitted during a download session.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// Raw line from yt-dlp's output, in production order
    Line(String),
    /// Parsed progress percentage (0-100)
    Progress(f32),
    /// An attempt failed and another one will follow
    Retry { attempt: u32, limit: u32 },
    /// Status message from the orchestrator itself
    Notice(String),
    /// Terminal event for one URL
    Outcome(DownloadOutcome),
}

/// Receiver of download events.
///
/// Implementations must not block: events are emitted from the download task
/// between reads of the child's output.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DownloadEvent);

    fn on_line(&self, line: &str) {
        self.emit(DownloadEvent::Line(line.to_string()));
    }

    fn on_progress(&self, percent: f32) {
        self.emit(DownloadEvent::Progress(percent));
    }

    fn on_retry(&self, attempt: u32, limit: u32) {
        self.emit(DownloadEvent::Retry { attempt, limit });
    }

    fn on_notice(&self, message: &str) {
        self.emit(DownloadEvent::Notice(message.to_string()));
    }

    fn on_outcome(&self, outcome: &DownloadOutcome) {
        self.emit(DownloadEvent::Outcome(outcome.clone()));
    }
}

/// Channel sink: the usual way to hand events to another task (UI, CLI renderer).
///
/// A closed receiver is ignored; the download keeps running.
impl EventSink for mpsc::UnboundedSender<DownloadEvent> {
    fn emit(&self, event: DownloadEvent) {
        let _ = self.send(event);
    }
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DownloadEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far.
    pub fn events(&self) -> Vec<DownloadEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::Line(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<f32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn outcomes(&self) -> Vec<DownloadOutcome> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::Outcome(o) => Some(o),
                _ => None,
            })
            .collect()
    }

    pub fn retries(&self) -> Vec<(u32, u32)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::Retry { attempt, limit } => Some((attempt, limit)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: DownloadEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

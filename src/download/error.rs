use std::fmt;

/// Structured error type for a single yt-dlp run.
///
/// Categorizes failures so the retry loop can tell a failed attempt
/// (spawn error, broken pipe) from a condition that must stop the session
/// (log file unwritable, cancellation).
#[derive(Debug)]
pub enum DownloadError {
    /// yt-dlp could not be launched (binary missing, permission denied)
    Spawn(String),
    /// Process execution failure while the child was running
    Process(String),
    /// Session log could not be opened or written
    LogWrite(String),
    /// Cancelled by the caller
    Cancelled,
    /// Another download is already in flight
    Busy(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Spawn(msg) => write!(f, "{}", msg),
            DownloadError::Process(msg) => write!(f, "{}", msg),
            DownloadError::LogWrite(msg) => write!(f, "{}", msg),
            DownloadError::Cancelled => write!(f, "Download cancelled"),
            DownloadError::Busy(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns subcategory for logging
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::Spawn(_) => "spawn",
            DownloadError::Process(_) => "process",
            DownloadError::LogWrite(_) => "log_write",
            DownloadError::Cancelled => "cancelled",
            DownloadError::Busy(_) => "busy",
        }
    }

    /// Returns the inner message
    pub fn message(&self) -> &str {
        match self {
            DownloadError::Spawn(msg)
            | DownloadError::Process(msg)
            | DownloadError::LogWrite(msg)
            | DownloadError::Busy(msg) => msg,
            DownloadError::Cancelled => "Download cancelled",
        }
    }

    /// Whether this failure consumes one attempt and may be retried.
    ///
    /// A launch failure counts the same as a nonzero exit.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DownloadError::Spawn(_) | DownloadError::Process(_))
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        DownloadError::LogWrite(err.to_string())
    }
}

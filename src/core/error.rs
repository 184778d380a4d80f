use thiserror::Error;

use crate::core::validation::ValidationError;
use crate::download::error::DownloadError;

/// Centralized error types for the application
///
/// All errors surfaced by the library are converted to this enum for consistent error handling.
/// Uses `thiserror` for automatic error conversion and display formatting.
///
/// # Example
///
/// ```no_run
/// use ytbili::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected input (bad URL, missing URL list, empty batch)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Download/yt-dlp errors
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Background task failed to join
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err: AppError = ValidationError::InvalidUrl("https://example.com".into()).into();
        assert_eq!(
            err.to_string(),
            "Validation error: Invalid video URL: https://example.com"
        );
    }

    #[test]
    fn test_download_error_conversion() {
        let err: AppError = DownloadError::Busy("a download is already running".into()).into();
        assert!(matches!(err, AppError::Download(DownloadError::Busy(_))));
    }
}

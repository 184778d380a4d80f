use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// yt-dlp binary path
/// Read once from the YTDL_BIN environment variable, defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Default cookie file passed to yt-dlp via `--cookies`
/// Read from the YTDL_COOKIES_FILE environment variable
/// Used only when the caller does not supply a cookie file of its own
pub static YTDL_COOKIES_FILE: Lazy<Option<String>> = Lazy::new(|| {
    env::var("YTDL_COOKIES_FILE")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
});

/// Default destination folder
/// Read from the DOWNLOAD_FOLDER environment variable, defaults to ~/Downloads
/// Supports tilde (~) expansion for home directory
pub static DOWNLOAD_FOLDER: Lazy<String> = Lazy::new(|| {
    let raw = env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "~/Downloads".to_string());
    shellexpand::tilde(&raw).into_owned()
});

/// Application log level (error, warn, info, debug, trace)
/// Read from the LOG_LEVEL environment variable, defaults to info
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

/// Retry configuration for single downloads
pub mod retry {
    use super::Duration;

    /// Number of times the downloader is launched before giving up
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Pause between attempts (in seconds)
    pub const RETRY_DELAY_SECS: u64 = 5;

    /// Retry delay duration
    pub fn delay() -> Duration {
        Duration::from_secs(RETRY_DELAY_SECS)
    }
}

/// yt-dlp invocation defaults
pub mod download {
    /// Per-session transcript written inside the destination folder
    pub const LOG_FILE_NAME: &str = "download_log.txt";

    /// Highest video height requested from either platform
    pub const MAX_HEIGHT: u32 = 1080;

    /// Container the video and audio streams are merged into
    pub const MERGE_FORMAT: &str = "mp4";

    /// yt-dlp output template, relative to the destination folder
    pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

    /// Line marker yt-dlp puts in front of progress reports
    pub const PROGRESS_MARKER: &str = "[download]";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_defaults() {
        assert_eq!(retry::MAX_ATTEMPTS, 3);
        assert_eq!(retry::delay(), Duration::from_secs(5));
    }
}

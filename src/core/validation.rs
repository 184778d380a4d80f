//! URL validation and platform classification
//!
//! Every URL goes through two independent checks before a download starts:
//! - `is_valid_url` matches the URL against the fixed YouTube / Bilibili patterns
//! - `classify` maps the URL host to a `Platform`, which selects the yt-dlp flags
//!
//! Classification runs after validation and never looks at the path.

use lazy_regex::{lazy_regex, Lazy, Regex};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// YouTube watch pages, shorts, playlists and youtu.be short links (any path)
static YOUTUBE_URL_RE: Lazy<Regex> = lazy_regex!(r"^(?:https?://)?(?:(?:www|m)\.)?(?:youtube\.com|youtu\.be)/.+$");

/// Bilibili video pages addressed by BV id
static BILIBILI_URL_RE: Lazy<Regex> = lazy_regex!(r"^(?:https?://)?(?:(?:www|m)\.)?bilibili\.com/video/BV[0-9A-Za-z]+");

/// Validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// URL does not match any supported platform pattern
    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    /// URL passed validation but no command template exists for its host
    #[error("Unsupported platform for URL: {0}")]
    UnsupportedPlatform(String),

    /// URL list file is missing or unreadable
    #[error("The URL file does not exist: {}", .0.display())]
    MissingUrlFile(PathBuf),

    /// Nothing to download
    #[error("Please provide at least one video URL")]
    EmptyBatch,
}

/// Source site a URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    YouTube,
    Bilibili,
    Unsupported,
}

impl Platform {
    /// Human-readable platform name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Bilibili => "Bilibili",
            Platform::Unsupported => "Unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true iff the URL matches the YouTube or the Bilibili pattern.
///
/// The `http(s)://` prefix is optional.
///
/// # Examples
/// ```
/// use ytbili::core::validation::is_valid_url;
///
/// assert!(is_valid_url("https://youtu.be/abc123"));
/// assert!(is_valid_url("www.bilibili.com/video/BV1xx411c7mD"));
/// assert!(!is_valid_url("https://www.bilibili.com/bangumi/play/ep1"));
/// assert!(!is_valid_url(""));
/// ```
pub fn is_valid_url(url: &str) -> bool {
    YOUTUBE_URL_RE.is_match(url) || BILIBILI_URL_RE.is_match(url)
}

/// Validates a URL, returning the trimmed URL on success.
pub fn validate_url(url: &str) -> Result<&str, ValidationError> {
    let trimmed = url.trim();
    if is_valid_url(trimmed) {
        Ok(trimmed)
    } else {
        Err(ValidationError::InvalidUrl(trimmed.to_string()))
    }
}

/// Maps a URL to its source platform by substring matching on the host.
///
/// URLs without a scheme are parsed as `https://`. When no host can be parsed
/// at all, the raw string is matched instead.
pub fn classify(url: &str) -> Platform {
    let host = url_host(url);
    let haystack = host.as_deref().unwrap_or(url);

    if haystack.contains("youtube.com") || haystack.contains("youtu.be") {
        Platform::YouTube
    } else if haystack.contains("bilibili.com") {
        Platform::Bilibili
    } else {
        Platform::Unsupported
    }
}

fn url_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url)
        .ok()
        .filter(|u| u.has_host())
        .or_else(|| Url::parse(&format!("https://{}", url)).ok())?;
    parsed.host_str().map(|h| h.to_ascii_lowercase())
}

/// Strips the query string, leaving a stable key for display and logging.
///
/// Has no effect on the command passed to yt-dlp, which keeps the full URL.
pub fn sanitize_url(url: &str) -> &str {
    match url.split_once('?') {
        Some((base, _)) => base,
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== is_valid_url Tests ====================

    #[test]
    fn test_valid_youtube_urls() {
        let valid_urls = vec![
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "http://www.youtube.com/playlist?list=PL123",
            "www.youtube.com/shorts/abc",
            "https://youtu.be/abc123",
            "youtu.be/abc123",
            "https://m.youtube.com/watch?v=x",
        ];

        for url in valid_urls {
            assert!(is_valid_url(url), "expected valid: {}", url);
        }
    }

    #[test]
    fn test_valid_bilibili_urls() {
        let valid_urls = vec![
            "https://www.bilibili.com/video/BV1xx411c7mD",
            "https://www.bilibili.com/video/BV1xx411c7mD/?p=2",
            "www.bilibili.com/video/BV17x411w7KC",
            "bilibili.com/video/BVabc",
        ];

        for url in valid_urls {
            assert!(is_valid_url(url), "expected valid: {}", url);
        }
    }

    #[test]
    fn test_invalid_urls() {
        let invalid_urls = vec![
            "",
            "not a url",
            "https://www.youtube.com/",
            "https://youtu.be",
            "https://evil.com/watch?v=dQw4w9WgXcQ",
            "ftp://www.youtube.com/watch?v=x",
            "https://www.bilibili.com/video/av170001",
            "https://www.bilibili.com/bangumi/play/ep1",
            "https://vimeo.com/123",
        ];

        for url in invalid_urls {
            assert!(!is_valid_url(url), "expected invalid: {}", url);
        }
    }

    #[test]
    fn test_validate_url_trims() {
        assert_eq!(validate_url("  https://youtu.be/abc  "), Ok("https://youtu.be/abc"));
        assert_eq!(
            validate_url("https://example.com"),
            Err(ValidationError::InvalidUrl("https://example.com".to_string()))
        );
    }

    // ==================== classify Tests ====================

    #[test]
    fn test_classify_platforms() {
        assert_eq!(classify("https://www.youtube.com/watch?v=x"), Platform::YouTube);
        assert_eq!(classify("youtu.be/abc"), Platform::YouTube);
        assert_eq!(classify("https://www.bilibili.com/video/BV1xx"), Platform::Bilibili);
        assert_eq!(classify("https://vimeo.com/123"), Platform::Unsupported);
        assert_eq!(classify(""), Platform::Unsupported);
    }

    #[test]
    fn test_classify_ignores_path() {
        assert_eq!(
            classify("https://example.com/redirect/youtube.com/watch"),
            Platform::Unsupported
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let url = "https://youtu.be/abc123";
        assert_eq!(classify(url), classify(url));
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::YouTube.to_string(), "YouTube");
        assert_eq!(Platform::Bilibili.to_string(), "Bilibili");
        assert!(!Platform::Unsupported.is_supported());
    }

    // ==================== sanitize_url Tests ====================

    #[test]
    fn test_sanitize_url() {
        assert_eq!(
            sanitize_url("https://www.youtube.com/watch?v=abc&t=10"),
            "https://www.youtube.com/watch"
        );
        assert_eq!(sanitize_url("https://youtu.be/abc"), "https://youtu.be/abc");
    }
}

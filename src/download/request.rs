//! Download request and its builder.
//!
//! Provides a fluent API for constructing `DownloadRequest` instances
//! with defaults taken from the environment configuration.

use crate::core::config;
use std::path::PathBuf;

/// Everything the shell collects before a download starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    /// Video URL (ignored when `url_list_file` is set)
    pub url: String,
    /// Netscape cookie file passed via `--cookies`
    pub cookie_file: Option<PathBuf>,
    /// Folder receiving the media files and `download_log.txt`
    pub destination_dir: PathBuf,
    /// YouTube: download the whole playlist the URL belongs to
    pub whole_playlist: bool,
    /// Bilibili: last playlist index to fetch; `-1` means no bound
    pub playlist_end: Option<i64>,
    /// File with one URL per line for batch downloads
    pub url_list_file: Option<PathBuf>,
    /// Pass `--verbose` to yt-dlp
    pub verbose: bool,
}

impl DownloadRequest {
    /// Starts a builder for the given URL.
    pub fn builder(url: impl Into<String>) -> DownloadRequestBuilder {
        DownloadRequestBuilder::new(url)
    }

    /// Same settings, different URL. Used to expand a batch into single downloads.
    pub fn for_url(&self, url: &str) -> Self {
        Self {
            url: url.to_string(),
            url_list_file: None,
            ..self.clone()
        }
    }

    /// `--playlist-end` value, if one applies.
    pub fn effective_playlist_end(&self) -> Option<i64> {
        self.playlist_end.filter(|end| *end != -1)
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.destination_dir.join(config::download::LOG_FILE_NAME)
    }
}

/// Builder for constructing download requests.
///
/// # Example
///
/// ```
/// use ytbili::download::DownloadRequestBuilder;
///
/// let request = DownloadRequestBuilder::new("https://www.bilibili.com/video/BV1xx411c7mD")
///     .cookie_file("cookies.txt")
///     .destination_dir("/tmp/out")
///     .playlist_end(5)
///     .build();
/// assert_eq!(request.playlist_end, Some(5));
/// ```
pub struct DownloadRequestBuilder {
    url: String,
    cookie_file: Option<PathBuf>,
    destination_dir: Option<PathBuf>,
    whole_playlist: bool,
    playlist_end: Option<i64>,
    url_list_file: Option<PathBuf>,
    verbose: bool,
}

impl DownloadRequestBuilder {
    /// Create a new builder for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim().to_string(),
            cookie_file: None,
            destination_dir: None,
            whole_playlist: false,
            playlist_end: None,
            url_list_file: None,
            verbose: false,
        }
    }

    /// Set the cookie file passed to yt-dlp.
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    /// Set the cookie file only when one is given.
    pub fn maybe_cookie_file(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_file = path;
        self
    }

    /// Set the destination folder (defaults to `DOWNLOAD_FOLDER`).
    pub fn destination_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination_dir = Some(path.into());
        self
    }

    /// Fetch the entire playlist (YouTube only).
    pub fn whole_playlist(mut self, enabled: bool) -> Self {
        self.whole_playlist = enabled;
        self
    }

    /// Bound the playlist fetch (Bilibili only). `-1` disables the bound.
    pub fn playlist_end(mut self, end: i64) -> Self {
        self.playlist_end = Some(end);
        self
    }

    /// Read URLs from a file instead of using the single URL.
    pub fn url_list_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.url_list_file = Some(path.into());
        self
    }

    /// Ask yt-dlp for verbose output.
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Build the `DownloadRequest`, falling back to environment defaults
    /// for the destination folder and the cookie file.
    pub fn build(self) -> DownloadRequest {
        let destination_dir = self
            .destination_dir
            .unwrap_or_else(|| PathBuf::from(config::DOWNLOAD_FOLDER.as_str()));
        let cookie_file = self
            .cookie_file
            .or_else(|| config::YTDL_COOKIES_FILE.as_ref().map(PathBuf::from));

        DownloadRequest {
            url: self.url,
            cookie_file,
            destination_dir,
            whole_playlist: self.whole_playlist,
            playlist_end: self.playlist_end,
            url_list_file: self.url_list_file,
            verbose: self.verbose,
        }
    }
}

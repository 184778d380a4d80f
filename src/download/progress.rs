//! Progress extraction from yt-dlp output lines.
//!
//! The line format belongs to yt-dlp, not to us, so parsing sits behind the
//! `ProgressParser` trait. The runner only sees `Option<f32>` per line.

use crate::core::config;
use lazy_regex::{lazy_regex, Lazy, Regex};

/// `<digits>[.<digits>]%`
static PERCENT_RE: Lazy<Regex> = lazy_regex!(r"(\d+(?:\.\d+)?)%");

/// Extracts a completion percentage from one line of downloader output.
pub trait ProgressParser: Send + Sync {
    /// Returns the percentage (0-100) reported by `line`, if any.
    fn parse(&self, line: &str) -> Option<f32>;
}

/// Parser for yt-dlp's `[download]  42.5% of 10.00MiB at ...` lines.
///
/// A percentage only counts when the line also carries the `[download]`
/// marker, so `--verbose` debug output mentioning percentages is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct YtDlpProgressParser;

impl ProgressParser for YtDlpProgressParser {
    fn parse(&self, line: &str) -> Option<f32> {
        if !line.contains(config::download::PROGRESS_MARKER) {
            return None;
        }

        let captures = PERCENT_RE.captures(line)?;
        let percent = captures.get(1)?.as_str().parse::<f32>().ok()?;

        // Clamp so garbage never jumps the bar past 100%
        Some(percent.clamp(0.0, 100.0))
    }
}

/// One line of child output together with its parsed progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub raw_line: String,
    pub percent: Option<f32>,
}

impl ProgressEvent {
    pub fn from_line(parser: &dyn ProgressParser, line: &str) -> Self {
        Self {
            raw_line: line.to_string(),
            percent: parser.parse(line),
        }
    }
}

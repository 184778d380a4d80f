//! URL lists for batch downloads.
//!
//! A batch is validated as a whole before anything runs: one bad line rejects
//! the entire list and no process is started.

use crate::core::validation::{is_valid_url, ValidationError};
use crate::download::events::DownloadOutcome;
use fs_err::tokio as fs;
use std::path::Path;

/// Reads one URL per line, trimming whitespace and skipping blank lines.
pub async fn load_url_list(path: &Path) -> Result<Vec<String>, ValidationError> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        log::warn!("Cannot read URL list: {}", e);
        ValidationError::MissingUrlFile(path.to_path_buf())
    })?;
    Ok(parse_url_list(&content))
}

/// Splits file content into URLs, preserving order.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts the batch only if it is non-empty and every URL is valid.
///
/// The error names the first offending URL.
pub fn validate_all(urls: &[String]) -> Result<(), ValidationError> {
    if urls.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }
    match urls.iter().find(|url| !is_valid_url(url)) {
        Some(bad) => Err(ValidationError::InvalidUrl(bad.clone())),
        None => Ok(()),
    }
}

/// Per-URL outcomes of a batch, in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub entries: Vec<(String, DownloadOutcome)>,
}

impl BatchReport {
    pub fn push(&mut self, url: impl Into<String>, outcome: DownloadOutcome) {
        self.entries.push((url.into(), outcome));
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    /// False for an empty report: a rejected batch downloaded nothing.
    pub fn all_succeeded(&self) -> bool {
        !self.entries.is_empty() && self.failed() == 0
    }
}

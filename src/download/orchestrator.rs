//! Download orchestration: validate, classify, build, run, retry, report.
//!
//! The orchestrator owns no UI state. Callers pass an `EventSink` and a
//! `CancellationToken`; every download ends with exactly one `Outcome` event.
//!
//! Single downloads and batch entries share one retry policy. With
//! `RetryPolicy::once()` a batch behaves as "run each URL once, log failures,
//! move on".

use crate::core::retry::{run_with_retry, RetryPolicy};
use crate::core::validation::{classify, sanitize_url, validate_url, ValidationError};
use crate::download::batch::{load_url_list, validate_all, BatchReport};
use crate::download::command::CommandBuilder;
use crate::download::events::{DownloadOutcome, EventSink};
use crate::download::log_file::SessionLog;
use crate::download::request::DownloadRequest;
use crate::download::runner::{ChildProcessRunner, ProcessRunner};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct Orchestrator {
    runner: Arc<dyn ProcessRunner>,
    commands: CommandBuilder,
    retry: RetryPolicy,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// yt-dlp from `YTDL_BIN`, default retry policy.
    pub fn new() -> Self {
        Self {
            runner: Arc::new(ChildProcessRunner::new()),
            commands: CommandBuilder::default(),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    #[must_use]
    pub fn with_command_builder(mut self, commands: CommandBuilder) -> Self {
        self.commands = commands;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Batch when `url_list_file` is set, single download otherwise.
    pub async fn run(&self, request: &DownloadRequest, sink: &dyn EventSink, cancel: &CancellationToken) -> BatchReport {
        if request.url_list_file.is_some() {
            self.download_batch(request, sink, cancel).await
        } else {
            let outcome = self.download(request, sink, cancel).await;
            let mut report = BatchReport::default();
            report.push(request.url.clone(), outcome);
            report
        }
    }

    /// Downloads `request.url` with the retry policy.
    pub async fn download(
        &self,
        request: &DownloadRequest,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> DownloadOutcome {
        let outcome = self.download_inner(request, sink, cancel).await;
        sink.on_outcome(&outcome);
        outcome
    }

    async fn download_inner(
        &self,
        request: &DownloadRequest,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> DownloadOutcome {
        let url = match validate_url(&request.url) {
            Ok(url) => url,
            Err(e) => return self.reject(e, sink),
        };
        let display = sanitize_url(url);
        sink.on_notice(&format!("URL input received: {}", url));

        let platform = classify(url);
        let spec = match self.commands.build(platform, request) {
            Ok(spec) => spec,
            Err(e) => return self.reject(e, sink),
        };
        log::info!("Downloading {} ({})", display, platform);

        let mut log = match SessionLog::open(&request.destination_dir).await {
            Ok(log) => log,
            Err(e) => {
                let reason = format!("Cannot open session log in {}: {}", request.destination_dir.display(), e);
                log::error!("{}", reason);
                sink.on_notice(&format!("Error during download: {}", reason));
                return DownloadOutcome::Aborted(reason);
            }
        };

        sink.on_notice(&format!("Generated command: {}", spec));
        sink.on_notice(&format!("Starting download for {}...", display));

        let result = run_with_retry(self.runner.as_ref(), &spec, &mut log, sink, &self.retry, cancel).await;
        if let Err(e) = log.flush().await {
            log::warn!("Failed to flush {}: {}", log.path().display(), e);
        }

        match result {
            Ok(outcome @ DownloadOutcome::Success { attempts }) => {
                log::info!("Download completed for {} (attempts: {})", display, attempts);
                sink.on_progress(100.0);
                sink.on_notice(&format!("Download completed for {}", display));
                outcome
            }
            Ok(outcome @ DownloadOutcome::FailedAfterRetries { attempts }) => {
                log::error!("Download failed for {} after {} attempt(s)", display, attempts);
                sink.on_notice(&format!(
                    "Download failed for {} after {} attempt(s)",
                    display, attempts
                ));
                outcome
            }
            Ok(DownloadOutcome::Cancelled) => {
                log::info!("Download cancelled for {}", display);
                sink.on_notice(&format!("Download cancelled for {}", display));
                DownloadOutcome::Cancelled
            }
            Ok(other) => other,
            Err(e) => {
                log::error!("Download aborted for {} [{}]: {}", display, e.subcategory(), e);
                sink.on_notice(&format!("Error during download: {}", e));
                DownloadOutcome::Aborted(e.to_string())
            }
        }
    }

    /// Downloads every URL from `request.url_list_file` (or `request.url` when
    /// no list is given), strictly in order.
    ///
    /// The whole list is validated first; a single bad URL rejects the batch
    /// with one `ValidationError` outcome and nothing is started. A failed URL
    /// does not stop the batch; cancellation does, and a cancellation noticed
    /// between URLs still ends with one `Cancelled` outcome.
    pub async fn download_batch(
        &self,
        request: &DownloadRequest,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        let urls = match &request.url_list_file {
            Some(path) => match load_url_list(path).await {
                Ok(urls) => urls,
                Err(e) => {
                    let outcome = self.reject(e, sink);
                    sink.on_outcome(&outcome);
                    return report;
                }
            },
            None => vec![request.url.trim().to_string()],
        };

        if let Err(e) = validate_all(&urls) {
            let outcome = self.reject(e, sink);
            sink.on_outcome(&outcome);
            return report;
        }

        log::info!("Starting batch of {} URL(s)", urls.len());
        for url in &urls {
            if cancel.is_cancelled() {
                log::info!("Batch cancelled before {}", sanitize_url(url));
                sink.on_notice(&format!("Download cancelled before {}", sanitize_url(url)));
                sink.on_outcome(&DownloadOutcome::Cancelled);
                report.push(url.clone(), DownloadOutcome::Cancelled);
                break;
            }
            let outcome = self.download(&request.for_url(url), sink, cancel).await;
            let stop = outcome == DownloadOutcome::Cancelled;
            report.push(url.clone(), outcome);
            if stop {
                break;
            }
        }

        log::info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }

    fn reject(&self, error: ValidationError, sink: &dyn EventSink) -> DownloadOutcome {
        log::warn!("Rejected request: {}", error);
        sink.on_notice(&error.to_string());
        DownloadOutcome::ValidationError(error.to_string())
    }
}

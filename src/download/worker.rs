//! Single-flight background worker.
//!
//! Runs one orchestration at a time on a tokio task, away from the caller's
//! interactive thread. A second `submit` while a job is running is refused
//! with `DownloadError::Busy`.

use crate::core::error::AppResult;
use crate::download::batch::BatchReport;
use crate::download::error::DownloadError;
use crate::download::events::{DownloadOutcome, EventSink};
use crate::download::orchestrator::Orchestrator;
use crate::download::request::DownloadRequest;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What to run.
#[derive(Debug, Clone)]
pub enum DownloadJob {
    /// One URL, with retries
    Single(DownloadRequest),
    /// `url_list_file` (or the single URL) as a batch
    Batch(DownloadRequest),
}

/// Result of a finished job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobReport {
    Single(DownloadOutcome),
    Batch(BatchReport),
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        match self {
            JobReport::Single(outcome) => outcome.is_success(),
            JobReport::Batch(report) => report.all_succeeded(),
        }
    }
}

/// Clears the in-flight flag when the job task ends, including on panic or abort.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a submitted job.
pub struct DownloadHandle {
    cancel: CancellationToken,
    join: JoinHandle<JobReport>,
}

impl DownloadHandle {
    /// Kills the running yt-dlp process and stops further attempts.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the job to finish.
    pub async fn wait(self) -> AppResult<JobReport> {
        Ok(self.join.await?)
    }
}

pub struct DownloadWorker {
    orchestrator: Arc<Orchestrator>,
    in_flight: Arc<AtomicBool>,
}

impl DownloadWorker {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Starts `job` in the background, or refuses if one is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, job: DownloadJob, sink: Arc<dyn EventSink>) -> Result<DownloadHandle, DownloadError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("Download requested while another one is running");
            return Err(DownloadError::Busy("A download is already in progress".to_string()));
        }

        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let orchestrator = Arc::clone(&self.orchestrator);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let join = tokio::spawn(async move {
            let _guard = guard;
            match job {
                DownloadJob::Single(request) => {
                    JobReport::Single(orchestrator.download(&request, sink.as_ref(), &token).await)
                }
                DownloadJob::Batch(request) => {
                    JobReport::Batch(orchestrator.download_batch(&request, sink.as_ref(), &token).await)
                }
            }
        });

        Ok(DownloadHandle { cancel, join })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retry::RetryPolicy;
    use crate::download::command::{CommandBuilder, CommandSpec};
    use crate::download::events::RecordingSink;
    use crate::download::log_file::SessionLog;
    use crate::download::runner::ProcessRunner;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Blocks until cancelled, or exits 0 after `hold`.
    struct SlowRunner {
        hold: Duration,
    }

    #[async_trait]
    impl ProcessRunner for SlowRunner {
        async fn run(
            &self,
            _spec: &CommandSpec,
            _log: &mut SessionLog,
            _sink: &dyn EventSink,
            cancel: &CancellationToken,
        ) -> Result<i32, DownloadError> {
            tokio::select! {
                _ = cancel.cancelled() => Err(DownloadError::Cancelled),
                _ = tokio::time::sleep(self.hold) => Ok(0),
            }
        }
    }

    fn worker(hold: Duration) -> DownloadWorker {
        DownloadWorker::new(
            Orchestrator::new()
                .with_runner(Arc::new(SlowRunner { hold }))
                .with_command_builder(CommandBuilder::new("yt-dlp"))
                .with_retry(RetryPolicy::once()),
        )
    }

    fn request(dir: &std::path::Path) -> DownloadRequest {
        DownloadRequest::builder("https://youtu.be/abc123")
            .destination_dir(dir)
            .build()
    }

    #[tokio::test]
    async fn test_second_submit_is_refused() {
        let dir = tempdir().unwrap();
        let worker = worker(Duration::from_secs(30));
        let sink: Arc<dyn EventSink> = Arc::new(RecordingSink::new());

        let handle = worker
            .submit(DownloadJob::Single(request(dir.path())), Arc::clone(&sink))
            .unwrap();
        assert!(worker.is_busy());

        let second = worker.submit(DownloadJob::Single(request(dir.path())), Arc::clone(&sink));
        assert!(matches!(second, Err(DownloadError::Busy(_))));

        handle.cancel();
        let report = handle.wait().await.unwrap();
        assert_eq!(report, JobReport::Single(DownloadOutcome::Cancelled));
        assert!(!worker.is_busy());
    }

    #[tokio::test]
    async fn test_worker_accepts_after_completion() {
        let dir = tempdir().unwrap();
        let worker = worker(Duration::from_millis(10));
        let sink = Arc::new(RecordingSink::new());

        let handle = worker
            .submit(DownloadJob::Single(request(dir.path())), sink.clone())
            .unwrap();
        let report = handle.wait().await.unwrap();
        assert!(report.is_success());
        assert!(!worker.is_busy());

        let handle = worker
            .submit(DownloadJob::Batch(request(dir.path())), sink.clone())
            .unwrap();
        let report = handle.wait().await.unwrap();
        assert!(matches!(report, JobReport::Batch(ref r) if r.all_succeeded()));
        assert_eq!(sink.outcomes().len(), 2);
    }
}

//! Bounded retry loop for yt-dlp runs.
//!
//! A run that exits nonzero, or that cannot be launched at all, consumes one
//! attempt. Between attempts the loop emits a retry notice and pauses for a
//! fixed delay; the pause is cut short by cancellation.

use crate::core::config;
use crate::download::command::CommandSpec;
use crate::download::error::DownloadError;
use crate::download::events::{DownloadOutcome, EventSink};
use crate::download::log_file::SessionLog;
use crate::download::runner::ProcessRunner;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Retry strategy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of launches allowed (not retries on top of the first)
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: config::retry::MAX_ATTEMPTS,
            delay: config::retry::delay(),
        }
    }
}

impl RetryPolicy {
    /// Creates a new policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single attempt, no retries.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Sets the attempt limit. Zero is treated as one.
    #[must_use]
    pub fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    /// Sets the pause between attempts.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Runs `spec` until it exits 0 or the policy's attempts are used up.
///
/// Returns `Err` only for conditions that must stop the session outright
/// (the session log became unwritable). Cancellation is an outcome, not an error.
pub async fn run_with_retry(
    runner: &dyn ProcessRunner,
    spec: &CommandSpec,
    log: &mut SessionLog,
    sink: &dyn EventSink,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<DownloadOutcome, DownloadError> {
    let limit = policy.max_attempts.max(1);
    let mut attempt = 0;

    while attempt < limit {
        if cancel.is_cancelled() {
            return Ok(DownloadOutcome::Cancelled);
        }

        let failure = match runner.run(spec, log, sink, cancel).await {
            Ok(0) => {
                return Ok(DownloadOutcome::Success { attempts: attempt + 1 });
            }
            Ok(code) => format!("{} exited with code {}", spec.program, code),
            Err(DownloadError::Cancelled) => return Ok(DownloadOutcome::Cancelled),
            Err(e) if e.is_retryable() => e.to_string(),
            Err(e) => return Err(e),
        };

        attempt += 1;
        log::warn!("Attempt {}/{} failed: {}", attempt, limit, failure);
        sink.on_notice(&format!("Error during attempt {}: {}", attempt, failure));

        if attempt >= limit {
            break;
        }

        sink.on_retry(attempt, limit);
        sink.on_notice(&format!("Retrying download... Attempt {}/{}", attempt, limit));

        tokio::select! {
            _ = cancel.cancelled() => return Ok(DownloadOutcome::Cancelled),
            _ = tokio::time::sleep(policy.delay) => {}
        }
    }

    Ok(DownloadOutcome::FailedAfterRetries { attempts: attempt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::events::RecordingSink;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Runner that replays a fixed script of results and counts calls.
    struct ScriptedRunner {
        script: Mutex<VecDeque<Result<i32, DownloadError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedRunner {
        fn new(script: Vec<Result<i32, DownloadError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(
            &self,
            _spec: &CommandSpec,
            _log: &mut SessionLog,
            _sink: &dyn EventSink,
            _cancel: &CancellationToken,
        ) -> Result<i32, DownloadError> {
            *self.calls.lock().unwrap() += 1;
            self.script.lock().unwrap().pop_front().unwrap_or(Ok(1))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new().delay(Duration::from_millis(5))
    }

    fn spec() -> CommandSpec {
        CommandSpec::new("yt-dlp").arg("https://youtu.be/abc123")
    }

    #[tokio::test]
    async fn test_always_failing_uses_every_attempt() {
        let dir = tempdir().unwrap();
        let mut log = SessionLog::open(dir.path()).await.unwrap();
        let sink = RecordingSink::new();
        let runner = ScriptedRunner::new(vec![Ok(1), Ok(1), Ok(1)]);

        let outcome = run_with_retry(
            &runner,
            &spec(),
            &mut log,
            &sink,
            &fast_policy(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, DownloadOutcome::FailedAfterRetries { attempts: 3 });
        assert_eq!(runner.calls(), 3);
        assert_eq!(sink.retries(), vec![(1, 3), (2, 3)]);
    }

    #[tokio::test]
    async fn test_success_on_second_attempt() {
        let dir = tempdir().unwrap();
        let mut log = SessionLog::open(dir.path()).await.unwrap();
        let sink = RecordingSink::new();
        let runner = ScriptedRunner::new(vec![Ok(1), Ok(0)]);

        let outcome = run_with_retry(
            &runner,
            &spec(),
            &mut log,
            &sink,
            &fast_policy(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, DownloadOutcome::Success { attempts: 2 });
        assert_eq!(runner.calls(), 2);
        assert_eq!(sink.retries(), vec![(1, 3)]);
    }

    #[tokio::test]
    async fn test_spawn_failure_consumes_attempt() {
        let dir = tempdir().unwrap();
        let mut log = SessionLog::open(dir.path()).await.unwrap();
        let sink = RecordingSink::new();
        let runner = ScriptedRunner::new(vec![Err(DownloadError::Spawn("Failed to spawn yt-dlp".into())), Ok(0)]);

        let outcome = run_with_retry(
            &runner,
            &spec(),
            &mut log,
            &sink,
            &fast_policy(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, DownloadOutcome::Success { attempts: 2 });
    }

    #[tokio::test]
    async fn test_log_write_failure_stops_immediately() {
        let dir = tempdir().unwrap();
        let mut log = SessionLog::open(dir.path()).await.unwrap();
        let sink = RecordingSink::new();
        let runner = ScriptedRunner::new(vec![Err(DownloadError::LogWrite("disk full".into())), Ok(0)]);

        let result = run_with_retry(
            &runner,
            &spec(),
            &mut log,
            &sink,
            &fast_policy(),
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(DownloadError::LogWrite(_))));
        assert_eq!(runner.calls(), 1);
    }

    #[tokio::test]
    async fn test_once_policy_never_retries() {
        let dir = tempdir().unwrap();
        let mut log = SessionLog::open(dir.path()).await.unwrap();
        let sink = RecordingSink::new();
        let runner = ScriptedRunner::new(vec![Ok(2), Ok(0)]);

        let outcome = run_with_retry(
            &runner,
            &spec(),
            &mut log,
            &sink,
            &RetryPolicy::once(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, DownloadOutcome::FailedAfterRetries { attempts: 1 });
        assert!(sink.retries().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_delay_stops_loop() {
        let dir = tempdir().unwrap();
        let mut log = SessionLog::open(dir.path()).await.unwrap();
        let sink = RecordingSink::new();
        let runner = ScriptedRunner::new(vec![Ok(1), Ok(0)]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let policy = RetryPolicy::new().delay(Duration::from_secs(30));
        let outcome = run_with_retry(&runner, &spec(), &mut log, &sink, &policy, &cancel)
            .await
            .unwrap();

        assert_eq!(outcome, DownloadOutcome::Cancelled);
        assert_eq!(runner.calls(), 1);
    }

    #[test]
    fn test_policy_builder() {
        let policy = RetryPolicy::new().max_attempts(0).delay(Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay, Duration::from_secs(1));
        assert_eq!(RetryPolicy::default().max_attempts, 3);
        assert_eq!(RetryPolicy::default().delay, Duration::from_secs(5));
    }
}

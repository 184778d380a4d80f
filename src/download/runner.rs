//! Child process execution with streamed output.
//!
//! `ChildProcessRunner` launches yt-dlp with stdout and stderr joined onto one
//! pipe, so lines arrive in the order the tool wrote them. Each line is relayed
//! as soon as it is produced (log file first, then progress, then the raw
//! line), and the exit code is returned once the pipe has closed.

use crate::download::command::CommandSpec;
use crate::download::error::DownloadError;
use crate::download::events::EventSink;
use crate::download::log_file::SessionLog;
use crate::download::progress::{ProgressEvent, ProgressParser, YtDlpProgressParser};
use async_trait::async_trait;
use std::io::{BufRead, BufReader, PipeReader};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Exit code reported when the child was terminated by a signal.
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Runs one `CommandSpec` to completion.
///
/// Implementations relay output through `log` and `sink` and return the exit
/// code. A launch failure is reported as `DownloadError::Spawn`.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        spec: &CommandSpec,
        log: &mut SessionLog,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<i32, DownloadError>;
}

/// One chunk of child output up to and including `\n`, as raw bytes.
type RawLine = std::io::Result<Vec<u8>>;

/// Reads the merged output pipe on a dedicated thread.
///
/// A detached thread, not `spawn_blocking`: a grandchild that inherited the
/// pipe can hold it open after the child is killed, and runtime shutdown must
/// not wait on that read.
fn spawn_line_reader(pipe: PipeReader) -> std::io::Result<mpsc::UnboundedReceiver<RawLine>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("ytdlp-output".to_string())
        .spawn(move || {
            let mut reader = BufReader::new(pipe);
            loop {
                let mut buf = Vec::new();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(Ok(buf)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

/// Text form of a raw line for parsing and display: terminator stripped,
/// invalid UTF-8 replaced.
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Real runner backed by `tokio::process`.
pub struct ChildProcessRunner {
    parser: Arc<dyn ProgressParser>,
}

impl Default for ChildProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ChildProcessRunner {
    pub fn new() -> Self {
        Self::with_parser(Arc::new(YtDlpProgressParser))
    }

    /// Use a different progress format (another downloader, a changed yt-dlp template).
    pub fn with_parser(parser: Arc<dyn ProgressParser>) -> Self {
        Self { parser }
    }

    async fn relay_line(&self, raw: &[u8], log: &mut SessionLog, sink: &dyn EventSink) -> Result<(), DownloadError> {
        log.append_bytes(raw)
            .await
            .map_err(|e| DownloadError::LogWrite(format!("Failed to write {}: {}", log.path().display(), e)))?;

        let event = ProgressEvent::from_line(self.parser.as_ref(), &decode_line(raw));
        log::trace!("yt-dlp: {}", event.raw_line);

        if let Some(percent) = event.percent {
            sink.on_progress(percent);
        }
        sink.on_line(&event.raw_line);
        Ok(())
    }
}

#[async_trait]
impl ProcessRunner for ChildProcessRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        log: &mut SessionLog,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<i32, DownloadError> {
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        let pipe_error =
            |e: std::io::Error| DownloadError::Spawn(format!("Failed to create output pipe for {}: {}", spec.program, e));
        let (reader, writer) = std::io::pipe().map_err(pipe_error)?;
        let stderr_writer = writer.try_clone().map_err(pipe_error)?;

        log::debug!("Spawning: {}", spec);
        // The `Command` is a temporary: the parent's write ends close with it,
        // so the pipe reaches EOF once the child side is gone.
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                log::error!("Failed to spawn {}: {}", spec.program, e);
                DownloadError::Spawn(format!("Failed to spawn {}: {}", spec.program, e))
            })?;

        // On any early return below, `kill_on_drop` takes the child down with us.
        let mut lines = spawn_line_reader(reader)
            .map_err(|e| DownloadError::Process(format!("Failed to start output reader: {}", e)))?;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("Cancelling {}", spec.program);
                    let _ = child.kill().await;
                    let _ = log.flush().await;
                    return Err(DownloadError::Cancelled);
                }
                next = lines.recv() => next,
            };

            match next {
                Some(Ok(raw)) => self.relay_line(&raw, log, sink).await?,
                Some(Err(e)) => {
                    return Err(DownloadError::Process(format!(
                        "Failed to read output of {}: {}",
                        spec.program, e
                    )))
                }
                None => break,
            }
        }

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = child.kill().await;
                let _ = log.flush().await;
                return Err(DownloadError::Cancelled);
            }
            status = child.wait() => status
                .map_err(|e| DownloadError::Process(format!("Failed to wait for {}: {}", spec.program, e)))?,
        };

        log.flush()
            .await
            .map_err(|e| DownloadError::LogWrite(format!("Failed to flush {}: {}", log.path().display(), e)))?;

        let code = status.code().unwrap_or(SIGNALLED_EXIT_CODE);
        log::debug!("{} exited with code {}", spec.program, code);
        Ok(code)
    }
}

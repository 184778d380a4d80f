//! Download orchestration around the external yt-dlp tool

pub mod batch;
pub mod command;
pub mod error;
pub mod events;
pub mod log_file;
pub mod orchestrator;
pub mod progress;
pub mod request;
pub mod runner;
pub mod worker;

// Re-exports for convenience
pub use batch::BatchReport;
pub use command::{CommandBuilder, CommandSpec};
pub use error::DownloadError;
pub use events::{DownloadEvent, DownloadOutcome, EventSink, RecordingSink};
pub use orchestrator::Orchestrator;
pub use progress::{ProgressEvent, ProgressParser, YtDlpProgressParser};
pub use request::{DownloadRequest, DownloadRequestBuilder};
pub use runner::{ChildProcessRunner, ProcessRunner};
pub use worker::{DownloadHandle, DownloadJob, DownloadWorker, JobReport};

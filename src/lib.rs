//! ytbili - download orchestration for YouTube and Bilibili on top of yt-dlp
//!
//! Validates and classifies URLs, builds the yt-dlp invocation for each
//! platform, runs it as a child process with streamed output and progress
//! parsing, and retries failed runs. Rendering is left to the caller, which
//! receives everything through an `EventSink`.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, retry policy, URL validation
//! - `download`: request model, command builder, process runner, orchestrator, worker
//! - `cli`: command-line interface definition

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod cli;
pub mod core;
pub mod download;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, Platform, RetryPolicy};
pub use crate::download::{
    DownloadEvent, DownloadOutcome, DownloadRequest, DownloadWorker, EventSink, Orchestrator,
};

use anyhow::Result;
use dotenvy::dotenv;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

use ytbili::cli::{Cli, Commands, DownloadOptions};
use ytbili::core::validation::{classify, is_valid_url};
use ytbili::core::{config, init_logger, log_request_configuration, RetryPolicy};
use ytbili::download::{
    DownloadEvent, DownloadJob, DownloadOutcome, DownloadRequest, DownloadRequestBuilder, DownloadWorker, JobReport,
    Orchestrator,
};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the selected subcommand.
///
/// # Errors
/// Returns an error if the logger cannot be initialized or the download task panics.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env before any config is read
    let _ = dotenv();

    let cli = Cli::parse_args();

    let level = cli.log_level.clone().unwrap_or_else(|| config::LOG_LEVEL.clone());
    init_logger(&level, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Download { url, options } => {
            let request = build_request(&url, &options);
            run_job(DownloadJob::Single(request), &options).await
        }
        Commands::Batch { file, options } => {
            let request = DownloadRequest::builder("").url_list_file(file);
            let request = apply_options(request, &options).build();
            run_job(DownloadJob::Batch(request), &options).await
        }
        Commands::Check { urls } => Ok(run_check(&urls)),
    }
}

fn build_request(url: &str, options: &DownloadOptions) -> DownloadRequest {
    apply_options(DownloadRequest::builder(url), options).build()
}

fn apply_options(mut builder: DownloadRequestBuilder, options: &DownloadOptions) -> DownloadRequestBuilder {
    builder = builder.whole_playlist(options.playlist).verbose(options.verbose);
    if let Some(cookies) = &options.cookies {
        builder = builder.cookie_file(cookies);
    }
    if let Some(output) = &options.output {
        builder = builder.destination_dir(output);
    }
    if let Some(end) = options.playlist_end {
        builder = builder.playlist_end(end);
    }
    builder
}

fn retry_policy(options: &DownloadOptions) -> RetryPolicy {
    let mut policy = RetryPolicy::new();
    if let Some(attempts) = options.retries {
        policy = policy.max_attempts(attempts);
    }
    if let Some(secs) = options.retry_delay {
        policy = policy.delay(Duration::from_secs(secs));
    }
    policy
}

/// Runs one job on the background worker, rendering its events until it ends.
///
/// Ctrl-C cancels the job, which kills the running yt-dlp process.
async fn run_job(job: DownloadJob, options: &DownloadOptions) -> Result<ExitCode> {
    let request = match &job {
        DownloadJob::Single(request) | DownloadJob::Batch(request) => request,
    };
    log_request_configuration(request);

    let worker = DownloadWorker::new(Orchestrator::new().with_retry(retry_policy(options)));
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = worker.submit(job, Arc::new(tx))?;

    let renderer = tokio::spawn(render_events(rx));

    let cancel = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping download...");
            cancel.cancel();
        }
    });

    let report = handle.wait().await?;
    interrupt.abort();
    // The sender is dropped with the job task, so the renderer drains and exits
    renderer.await?;

    if let JobReport::Batch(batch) = &report {
        log::info!(
            "Batch summary: {} succeeded, {} failed",
            batch.succeeded(),
            batch.failed()
        );
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn render_events(mut rx: mpsc::UnboundedReceiver<DownloadEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            DownloadEvent::Line(line) => println!("{}", line),
            DownloadEvent::Progress(percent) => log::debug!("Progress: {:.1}%", percent),
            DownloadEvent::Retry { attempt, limit } => {
                log::warn!("Attempt {}/{} failed, retrying", attempt, limit);
            }
            DownloadEvent::Notice(message) => log::info!("{}", message),
            DownloadEvent::Outcome(outcome) => match outcome {
                DownloadOutcome::Success { attempts } => {
                    log::info!("✅ Done (attempts: {})", attempts);
                }
                DownloadOutcome::FailedAfterRetries { attempts } => {
                    log::error!("❌ Failed after {} attempt(s)", attempts);
                }
                DownloadOutcome::ValidationError(reason) => log::error!("❌ {}", reason),
                DownloadOutcome::Cancelled => log::warn!("Download cancelled"),
                DownloadOutcome::Aborted(reason) => log::error!("❌ Aborted: {}", reason),
            },
        }
    }
}

/// Prints validity and platform for each URL without downloading.
fn run_check(urls: &[String]) -> ExitCode {
    let mut all_valid = true;
    for url in urls {
        let url = url.trim();
        if is_valid_url(url) {
            println!("OK       {:<9} {}", classify(url).as_str(), url);
        } else {
            all_valid = false;
            println!("INVALID  {:<9} {}", classify(url).as_str(), url);
        }
    }
    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

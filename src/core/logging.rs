//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + optional file)
//! - Cookie file / destination diagnostics before a download starts
//!
//! Application diagnostics go through the `log` facade. They never end up in
//! `download_log.txt`, which only carries yt-dlp's own output.

use anyhow::Result;
use simplelog::*;
use std::fs::File;
use std::str::FromStr;

use crate::download::request::DownloadRequest;

/// Parses a level name, falling back to `Info` on anything unknown.
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// Initialize logger for console output and, optionally, a file
///
/// # Arguments
/// * `level` - Level name (error, warn, info, debug, trace)
/// * `log_file_path` - Optional path to an application log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already set
pub fn init_logger(level: &str, log_file_path: Option<&str>) -> Result<()> {
    let level = parse_level(level);
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file_path {
        let log_file = File::create(path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;
        loggers.push(WriteLogger::new(level, Config::default(), log_file));
    }

    CombinedLogger::init(loggers).map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the cookie file and destination a request will use
///
/// Validates and logs:
/// - Cookie file existence (a missing file makes yt-dlp fail on members-only
///   or age-gated videos, but is not fatal here)
/// - Destination folder, and whether it will be created
/// - Where the yt-dlp transcript (`download_log.txt`) will be appended
pub fn log_request_configuration(request: &DownloadRequest) {
    match &request.cookie_file {
        Some(path) if path.exists() => {
            let shown = path.canonicalize().unwrap_or_else(|_| path.clone());
            log::info!("Cookie file: {}", shown.display());
        }
        Some(path) => {
            log::warn!("Cookie file: {} (FILE NOT FOUND)", path.display());
            log::warn!("   yt-dlp will be called with it anyway and may fail on restricted videos");
        }
        None => {
            log::info!("Cookie file: not set (set YTDL_COOKIES_FILE or pass --cookies)");
        }
    }

    if request.destination_dir.is_dir() {
        log::info!("Destination: {}", request.destination_dir.display());
    } else {
        log::info!("Destination: {} (will be created)", request.destination_dir.display());
    }

    log::info!("Session log: {}", request.log_file_path().display());

    if let Some(list) = &request.url_list_file {
        log::info!("URL list: {}", list.display());
    }
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytbili")]
#[command(author, version, about = "Download YouTube and Bilibili videos through yt-dlp", long_about = None)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides LOG_LEVEL
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also write application logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a single video, retrying failed attempts
    Download {
        /// YouTube or Bilibili video URL
        url: String,

        #[command(flatten)]
        options: DownloadOptions,
    },

    /// Download every URL listed in a file (one per line)
    Batch {
        /// Text file with one URL per line; blank lines are skipped
        file: PathBuf,

        #[command(flatten)]
        options: DownloadOptions,
    },

    /// Check URLs without downloading anything
    Check {
        /// URLs to validate and classify
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DownloadOptions {
    /// Netscape cookie file passed to yt-dlp (defaults to YTDL_COOKIES_FILE)
    #[arg(short, long)]
    pub cookies: Option<PathBuf>,

    /// Destination folder (defaults to DOWNLOAD_FOLDER)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// YouTube: download the entire playlist
    #[arg(long)]
    pub playlist: bool,

    /// Bilibili: last playlist index to download (-1 for no limit)
    #[arg(long, allow_negative_numbers = true)]
    pub playlist_end: Option<i64>,

    /// Pass --verbose to yt-dlp
    #[arg(short, long)]
    pub verbose: bool,

    /// Attempts per URL before giving up
    #[arg(long)]
    pub retries: Option<u32>,

    /// Seconds to wait between attempts
    #[arg(long)]
    pub retry_delay: Option<u64>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! yt-dlp command construction.
//!
//! `CommandBuilder::build` is a pure function of (platform, request): no I/O,
//! no environment lookups beyond the program name captured at construction.

use crate::core::config;
use crate::core::validation::{Platform, ValidationError};
use crate::download::request::DownloadRequest;
use std::fmt;

/// Fully-resolved invocation of the external downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// True if `flag` appears as a standalone argument.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Value following `flag`, if present.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// yt-dlp format selector: best video up to `MAX_HEIGHT` plus best audio,
/// falling back to the best combined stream.
fn format_selector(platform: Platform) -> String {
    let height = config::download::MAX_HEIGHT;
    match platform {
        Platform::Bilibili => format!("bv[height<={}]+ba/best", height),
        _ => format!("bestvideo[height<={}]+bestaudio/best", height),
    }
}

/// Builds per-platform yt-dlp invocations.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(config::YTDL_BIN.as_str())
    }
}

impl CommandBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the command for `request` on `platform`.
    ///
    /// Refuses `Platform::Unsupported`: there is no template to fill.
    pub fn build(&self, platform: Platform, request: &DownloadRequest) -> Result<CommandSpec, ValidationError> {
        if !platform.is_supported() {
            return Err(ValidationError::UnsupportedPlatform(request.url.clone()));
        }

        let output = request.destination_dir.join(config::download::OUTPUT_TEMPLATE);

        let mut spec = CommandSpec::new(&self.program);
        if let Some(cookies) = &request.cookie_file {
            spec = spec.arg("--cookies").arg(cookies.to_string_lossy());
        }
        spec = spec
            .arg("-f")
            .arg(format_selector(platform))
            .args(["--merge-output-format", config::download::MERGE_FORMAT])
            .arg("-o")
            .arg(output.to_string_lossy())
            .arg("--newline");

        if platform == Platform::Bilibili {
            spec = spec.arg("--all-subs");
        }
        if request.verbose {
            spec = spec.arg("--verbose");
        }

        spec = spec.arg(&request.url);

        match platform {
            Platform::YouTube if request.whole_playlist => {
                spec = spec.arg("--yes-playlist");
            }
            Platform::Bilibili => {
                if let Some(end) = request.effective_playlist_end() {
                    spec = spec.arg("--playlist-end").arg(end.to_string());
                }
            }
            _ => {}
        }

        Ok(spec)
    }
}

//! Append-only session transcript (`<destination>/download_log.txt`).
//!
//! Receives every raw output line from every yt-dlp invocation of a session,
//! with no added framing.

use crate::core::config;
use fs_err::tokio as fs;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub struct SessionLog {
    path: PathBuf,
    file: fs::File,
}

impl SessionLog {
    /// Creates `dir` if needed and opens its log file in append mode.
    pub async fn open(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(config::download::LOG_FILE_NAME);
        let file = fs::OpenOptions::new().create(true).append(true).open(&path).await?;
        log::debug!("Session log opened: {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line followed by `\n`.
    pub async fn append_line(&mut self, line: &str) -> std::io::Result<()> {
        self.append_bytes(line.as_bytes()).await
    }

    /// Appends raw output exactly as the tool produced it.
    ///
    /// A chunk that does not end in `\n` (the tool's last line) is terminated
    /// so the next session starts on a fresh line.
    pub async fn append_bytes(&mut self, raw: &[u8]) -> std::io::Result<()> {
        self.file.write_all(raw).await?;
        if !raw.ends_with(b"\n") {
            self.file.write_all(b"\n").await?;
        }
        Ok(())
    }

    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let log = SessionLog::open(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(log.path(), nested.join("download_log.txt"));
    }

    #[tokio::test]
    async fn test_append_keeps_previous_sessions() {
        let dir = tempdir().unwrap();

        let mut first = SessionLog::open(dir.path()).await.unwrap();
        first.append_line("session one").await.unwrap();
        first.flush().await.unwrap();
        drop(first);

        let mut second = SessionLog::open(dir.path()).await.unwrap();
        second.append_line("session two").await.unwrap();
        second.flush().await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("download_log.txt")).unwrap();
        assert_eq!(content, "session one\nsession two\n");
    }

    #[tokio::test]
    async fn test_append_bytes_is_byte_exact() {
        let dir = tempdir().unwrap();
        let mut log = SessionLog::open(dir.path()).await.unwrap();

        // Latin-1 "café" and a CRLF line pass through untouched
        log.append_bytes(b"caf\xe9\n").await.unwrap();
        log.append_bytes(b"crlf\r\n").await.unwrap();
        log.append_bytes(b"unterminated").await.unwrap();
        log.flush().await.unwrap();

        let content = std::fs::read(dir.path().join("download_log.txt")).unwrap();
        assert_eq!(content, b"caf\xe9\ncrlf\r\nunterminated\n".to_vec());
    }
}

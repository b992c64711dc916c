//! Persistence for completed transfers.
//!
//! The receiver endpoint hands every completed file to a [`FileSink`].
//! A sink failure is logged but never poisons the transfer outcome: the
//! bytes made it across the channel, and the caller still gets them in
//! the returned [`ReceivedFile`](qrferry_session::ReceivedFile).

use std::path::{Path, PathBuf};

use qrferry_session::ReceivedFile;

/// Where completed files go.
pub trait FileSink: Send + 'static {
    /// Persists one reassembled file.
    fn store(&mut self, file: &ReceivedFile) -> std::io::Result<()>;
}

/// Writes each received file into a fixed directory.
///
/// Only the final path component of the announced name is used, so a
/// sender cannot steer writes outside the directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Creates a sink rooted at `dir`. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn target_path(&self, announced_name: &str) -> PathBuf {
        let name = Path::new(announced_name)
            .file_name()
            .unwrap_or_else(|| "received.bin".as_ref());
        self.dir.join(name)
    }
}

impl FileSink for DirectorySink {
    fn store(&mut self, file: &ReceivedFile) -> std::io::Result<()> {
        let path = self.target_path(&file.name);
        std::fs::write(&path, &file.bytes)?;
        tracing::info!(
            path = %path.display(),
            bytes = file.bytes.len(),
            mime_type = %file.mime_type,
            "stored received file"
        );
        Ok(())
    }
}

//! Temp files owned by a single conversion job.
//!
//! A [`TempWorkspace`] hands out one [`JobWorkspace`] per request. The job
//! workspace records every path it allocated and removes them in
//! [`JobWorkspace::release`]; if a job is abandoned before that (the client
//! went away and the handler future was dropped), `Drop` removes them.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Naming strategy for temp files.
///
/// Implementations must never return the same path twice.
pub trait PathAllocator: Send + Sync {
    fn allocate(&self, suffix: &str) -> PathBuf;
}

/// `<dir>/docx2pdf-<uuid v4><suffix>`.
#[derive(Debug, Clone)]
pub struct UuidPathAllocator {
    dir: PathBuf,
}

impl UuidPathAllocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PathAllocator for UuidPathAllocator {
    fn allocate(&self, suffix: &str) -> PathBuf {
        self.dir
            .join(format!("docx2pdf-{}{}", Uuid::new_v4(), suffix))
    }
}

#[derive(Clone)]
pub struct TempWorkspace {
    allocator: Arc<dyn PathAllocator>,
}

impl TempWorkspace {
    pub fn new(allocator: Arc<dyn PathAllocator>) -> Self {
        Self { allocator }
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(UuidPathAllocator::new(dir)))
    }

    pub fn begin(&self) -> JobWorkspace {
        JobWorkspace {
            allocator: self.allocator.clone(),
            input_path: None,
            output_path: None,
            released: false,
        }
    }
}

pub struct JobWorkspace {
    allocator: Arc<dyn PathAllocator>,
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    released: bool,
}

impl JobWorkspace {
    pub fn allocate_input_path(&mut self, suffix: &str) -> PathBuf {
        self.input_path
            .get_or_insert_with(|| self.allocator.allocate(suffix))
            .clone()
    }

    pub fn allocate_output_path(&mut self, suffix: &str) -> PathBuf {
        self.output_path
            .get_or_insert_with(|| self.allocator.allocate(suffix))
            .clone()
    }

    /// Allocate the input path and write `bytes` to it.
    ///
    /// The file is created exclusively: an existing file at the allocated
    /// path is an error, never overwritten.
    pub async fn stage_input(&mut self, suffix: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.allocate_input_path(suffix);

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) => {
                // Nothing was created, so there is nothing of ours to clean up.
                self.input_path = None;
                return Err(e);
            }
        };
        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::debug!(input_path = ?path, size = bytes.len(), "Saved upload to temp file");

        Ok(path)
    }

    pub fn input_path(&self) -> Option<&Path> {
        self.input_path.as_deref()
    }

    /// Remove every allocated path. Consumes the workspace, so it runs once.
    ///
    /// Missing files are fine; other failures are logged and swallowed.
    pub async fn release(mut self) {
        for path in self.paths() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = ?path, "Removed temp file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to remove temp file"),
            }
        }
        self.released = true;
    }

    fn paths(&self) -> Vec<PathBuf> {
        self.input_path
            .iter()
            .chain(self.output_path.iter())
            .cloned()
            .collect()
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        for path in self.paths() {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = ?path, "Removed abandoned temp file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to remove abandoned temp file"),
            }
        }
    }
}

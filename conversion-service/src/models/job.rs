use axum::body::Bytes;
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// A validated upload: a named, non-empty `file` part.
#[derive(Debug, Clone)]
pub struct Upload {
    pub original_filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Received,
    ConvertingHtml,
    RenderingPdf,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Received => "received",
            JobStatus::ConvertingHtml => "converting-html",
            JobStatus::RenderingPdf => "rendering-pdf",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping for one request's conversion. Lives only as long as the
/// request; the temp paths it uses are owned by its `JobWorkspace`.
#[derive(Debug)]
pub struct ConversionJob {
    pub id: Uuid,
    pub original_filename: String,
    pub size: usize,
    status: JobStatus,
    started_at: Instant,
}

impl ConversionJob {
    pub fn new(upload: &Upload) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_filename: upload.original_filename.clone(),
            size: upload.bytes.len(),
            status: JobStatus::Received,
            started_at: Instant::now(),
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Move to `next`. Terminal states are sticky.
    pub fn transition(&mut self, next: JobStatus) {
        if self.status.is_terminal() {
            tracing::warn!(
                from = %self.status,
                to = %next,
                "Ignoring transition out of terminal state"
            );
            return;
        }

        tracing::info!(from = %self.status, to = %next, "Job status changed");
        self.status = next;
    }
}

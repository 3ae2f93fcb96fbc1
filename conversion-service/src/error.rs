//! Failure taxonomy for a conversion job.
//!
//! Each stage returns its own error type so callers can tell a broken
//! upload from a converter crash from a renderer timeout. [`ConvertError`]
//! is what the HTTP handler returns; it owns the mapping to status codes.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;
use thiserror::Error;

/// Failure of an external tool invocation.
///
/// `tool` is the executable's file name only. The configured path stays in
/// the logs and never reaches a response body.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{tool} could not be started: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} timed out after {} seconds", .timeout.as_secs())]
    TimedOut { tool: String, timeout: Duration },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error talking to {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Rejected upload, detected before any temp file exists.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Uploaded file is empty")]
    EmptyContent,
}

/// Document-to-HTML stage failure.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("document conversion timed out after {} seconds", .0.as_secs())]
    TimedOut(Duration),

    #[error("document conversion failed: {0}")]
    Tool(CommandError),

    #[error("document converter produced invalid UTF-8")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
}

impl From<CommandError> for ConversionError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::TimedOut { timeout, .. } => ConversionError::TimedOut(timeout),
            other => ConversionError::Tool(other),
        }
    }
}

/// HTML-to-PDF stage failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF rendering timed out after {} seconds", .0.as_secs())]
    TimedOut(Duration),

    #[error("PDF rendering failed: {0}")]
    Tool(CommandError),

    #[error("PDF renderer produced no output")]
    MissingOutput,
}

impl From<CommandError> for RenderError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::TimedOut { timeout, .. } => RenderError::TimedOut(timeout),
            other => RenderError::Tool(other),
        }
    }
}

/// Any failure after the upload was accepted.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to read rendered PDF: {0}")]
    Output(#[source] std::io::Error),
}

impl JobError {
    /// Stage label used for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            JobError::Staging(_) => "staging",
            JobError::Conversion(_) => "html",
            JobError::Render(_) => "pdf",
            JobError::Output(_) => "output",
        }
    }
}

/// Error returned by the `/convert` handler.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] MultipartError),

    #[error(transparent)]
    Job(#[from] JobError),
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        match self {
            ConvertError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            ConvertError::Upload(err) => (err.status(), err.body_text()).into_response(),
            ConvertError::Job(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error: {}", err),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_stage_variant() {
        let err = CommandError::TimedOut {
            tool: "pandoc".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(
            ConversionError::from(err),
            ConversionError::TimedOut(d) if d == Duration::from_secs(5)
        ));

        let err = CommandError::TimedOut {
            tool: "wkhtmltopdf".to_string(),
            timeout: Duration::from_secs(7),
        };
        let render = RenderError::from(err);
        assert!(matches!(render, RenderError::TimedOut(_)));
        assert_eq!(render.to_string(), "PDF rendering timed out after 7 seconds");
    }

    #[test]
    fn test_tool_failure_keeps_stderr() {
        let err = CommandError::Failed {
            tool: "pandoc".to_string(),
            status: "exit status: 64".to_string(),
            stderr: "couldn't unpack docx container".to_string(),
        };
        let job = JobError::from(ConversionError::from(err));

        assert_eq!(job.stage(), "html");
        assert!(job.to_string().contains("couldn't unpack docx container"));
    }

    #[test]
    fn test_validation_maps_to_400() {
        let response = ConvertError::from(ValidationError::EmptyFilename).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_job_failure_maps_to_500() {
        let response = ConvertError::from(JobError::from(RenderError::MissingOutput)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

use crate::error::{ConvertError, ValidationError};
use crate::models::Upload;
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::instrument::WithSubscriber;

const FILE_FIELD: &str = "file";
const DOWNLOAD_NAME: &str = "converted.pdf";

pub async fn convert_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ConvertError> {
    let logger = state.logger.clone();

    async move {
        let upload = read_upload(multipart).await.inspect_err(|e| {
            if let ConvertError::Validation(reason) = e {
                tracing::error!(reason = %reason, "Rejected conversion request");
            }
        })?;

        let pdf = state.pipeline.run(upload).await?;

        Ok::<_, ConvertError>((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOWNLOAD_NAME),
                ),
            ],
            pdf,
        )
            .into_response())
    }
    .with_subscriber(logger)
    .await
}

/// Pull the `file` part out of the form.
///
/// A body that isn't multipart at all, or a `file` part sent as a plain form
/// field (no filename parameter), counts as no file. The client's filename is
/// only checked for emptiness; it never reaches the filesystem.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, ConvertError> {
    let Ok(mut multipart) = multipart else {
        return Err(ValidationError::MissingFile.into());
    };

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            return Err(ValidationError::EmptyFilename.into());
        }

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }

        return Ok(Upload {
            original_filename: filename,
            bytes,
        });
    }

    Err(ValidationError::MissingFile.into())
}

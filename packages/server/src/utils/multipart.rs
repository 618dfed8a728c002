use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use luna_common::UploadedFile;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;

/// Spool a multipart file field to a temp file.
///
/// Returns `None` for an untouched file input (no filename, no bytes).
/// Reading stops as soon as `max_size` is exceeded; the returned upload then
/// reports the bytes received so far and fails validation as too large. A
/// transport failure mid-field yields a corrupt upload rather than an error.
pub async fn spool_field(
    mut field: Field<'_>,
    max_size: u64,
) -> Result<Option<UploadedFile>, AppError> {
    let client_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_owned);
    let temp_path = std::env::temp_dir().join(format!("luna-upload-{}", Uuid::new_v4()));

    let received: Result<Result<u64, String>, AppError> = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;
        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return Err(rejection(e)),
                Err(e) => return Ok(Err(e.body_text())),
            };

            total_size += chunk.len() as u64;
            if total_size > max_size {
                break;
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        Ok(Ok(total_size))
    }
    .await;

    match received {
        Ok(Ok(size)) if size > 0 || !client_name.is_empty() => Ok(Some(UploadedFile::spooled(
            client_name,
            content_type,
            temp_path,
            size,
        ))),
        Ok(Ok(_)) => {
            discard(&temp_path).await;
            Ok(None)
        }
        Ok(Err(reason)) => {
            discard(&temp_path).await;
            warn!(%client_name, %reason, "Upload interrupted");
            Ok(Some(UploadedFile::corrupt(client_name, content_type, reason)))
        }
        Err(e) => {
            discard(&temp_path).await;
            Err(e)
        }
    }
}

/// Map a multipart read failure; a body over the route limit is a 413.
pub fn rejection(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Multipart error: {}", e.body_text()))
    }
}

/// Read a text field.
pub async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}

async fn discard(path: &std::path::Path) {
    // Best effort.
    let _ = tokio::fs::remove_file(path).await;
}

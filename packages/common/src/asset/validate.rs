use thiserror::Error;
use tracing::warn;

use super::kind::ArModelKind;
use super::size::format_file_size;
use super::upload::UploadedFile;

/// Default size limit for GLB/USDZ uploads.
pub const DEFAULT_AR_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Default size limit for product images.
pub const DEFAULT_IMAGE_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Extensions accepted for the product image slot.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// Reasons an upload is rejected before it reaches storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid file upload: {0}")]
    UploadCorrupt(String),
    #[error("File size exceeds maximum limit of {}", human_size(.limit))]
    TooLarge { size: u64, limit: u64 },
    #[error("Invalid file type '{extension}'. Only {allowed} files are allowed")]
    UnsupportedExtension {
        extension: String,
        allowed: &'static str,
    },
    #[error("File extension '{extension}' does not match expected type '{expected}'")]
    KindMismatch {
        extension: String,
        expected: ArModelKind,
    },
}

/// Check an uploaded 3D model against the size limit and the slot it was
/// submitted through.
///
/// A MIME type outside the per-kind allow-list is only logged: browsers and
/// operating systems report these formats inconsistently.
pub fn validate_ar_model(
    file: &UploadedFile,
    expected: ArModelKind,
    max_file_size: u64,
) -> Result<(), ValidationError> {
    check_transport_and_size(file, max_file_size)?;

    let extension = file.extension().unwrap_or_default();
    let Some(kind) = ArModelKind::from_extension(&extension) else {
        return Err(ValidationError::UnsupportedExtension {
            extension,
            allowed: ".glb and .usdz",
        });
    };

    if kind != expected {
        return Err(ValidationError::KindMismatch {
            extension,
            expected,
        });
    }

    let mime = declared_or_guessed_mime(file);
    if let Some(mime) = mime
        && !expected.allowed_mime_types().contains(&mime.as_str())
    {
        warn!(
            expected_type = %expected,
            actual_mime = %mime,
            allowed_mimes = ?expected.allowed_mime_types(),
            "AR model MIME type validation failed"
        );
    }

    Ok(())
}

/// Check an uploaded product image.
pub fn validate_image(file: &UploadedFile, max_file_size: u64) -> Result<(), ValidationError> {
    check_transport_and_size(file, max_file_size)?;

    let extension = file.extension().unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ValidationError::UnsupportedExtension {
            extension,
            allowed: ".jpeg, .jpg, .png and .gif",
        });
    }

    if let Some(mime) = declared_or_guessed_mime(file)
        && !mime.starts_with("image/")
    {
        warn!(actual_mime = %mime, "Product image MIME type validation failed");
    }

    Ok(())
}

fn human_size(bytes: &u64) -> String {
    format_file_size(*bytes)
}

fn check_transport_and_size(file: &UploadedFile, max_file_size: u64) -> Result<(), ValidationError> {
    if let Some(reason) = file.corruption() {
        return Err(ValidationError::UploadCorrupt(reason.to_string()));
    }

    if file.size() > max_file_size {
        return Err(ValidationError::TooLarge {
            size: file.size(),
            limit: max_file_size,
        });
    }

    Ok(())
}

fn declared_or_guessed_mime(file: &UploadedFile) -> Option<String> {
    match file.content_type() {
        Some(ct) => Some(
            ct.split(';')
                .next()
                .unwrap_or(ct)
                .trim()
                .to_ascii_lowercase(),
        ),
        None => mime_guess::from_path(file.client_name())
            .first()
            .map(|m| m.essence_str().to_string()),
    }
}

//! Multipart upload helpers.
//!
//! The HTTP layer is where upload constraints live: only PNG and JPEG are
//! accepted and each file is capped at `MAX_UPLOAD_BYTES`. The core treats
//! any readable asset as valid.

use axum::extract::multipart::Field;

use crate::config::ACCEPTED_MEDIA_TYPES;
use crate::error::{AppError, AppResult};

/// A file received in a multipart field.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Media type from the part header, or guessed from the file extension.
fn resolve_media_type(content_type: Option<&str>, file_name: Option<&str>) -> Option<String> {
    if let Some(ct) = content_type.filter(|ct| *ct != "application/octet-stream") {
        return Some(ct.to_ascii_lowercase());
    }
    let ext = file_name?.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png".into()),
        "jpg" | "jpeg" => Some("image/jpeg".into()),
        _ => None,
    }
}

/// Check the media type and size of an upload.
pub fn validate_upload(
    media_type: Option<&str>,
    size: usize,
    max_bytes: usize,
) -> AppResult<String> {
    let media_type = media_type.ok_or_else(|| {
        AppError::UnsupportedMediaType("Could not determine the file type".into())
    })?;
    if !ACCEPTED_MEDIA_TYPES.contains(&media_type) {
        return Err(AppError::UnsupportedMediaType(format!(
            "Unsupported file type '{media_type}'. Supported: PNG, JPEG"
        )));
    }
    if size == 0 {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if size > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File is {size} bytes; the maximum is {max_bytes} bytes"
        )));
    }
    Ok(media_type.to_string())
}

/// Read one file field completely and validate it.
pub async fn read_file_field(field: Field<'_>, max_bytes: usize) -> AppResult<UploadedFile> {
    let file_name = field.file_name().map(str::to_string);
    let media_type = resolve_media_type(field.content_type(), file_name.as_deref());
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let media_type = validate_upload(media_type.as_deref(), bytes.len(), max_bytes)?;
    Ok(UploadedFile {
        file_name,
        media_type,
        bytes: bytes.to_vec(),
    })
}

/// Read a text field.
pub async fn read_text_field(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map(|text| text.trim().to_string())
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

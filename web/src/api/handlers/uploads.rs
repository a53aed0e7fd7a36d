//! Image uploads forwarded to the backend (avatars, thumbnails, logo).

use axum::extract::{multipart::MultipartRejection, Multipart};
use bytes::BytesMut;

use crate::error::{AppError, Result};
use crate::services::api_client::FileUpload;

/// Largest accepted image
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

const ALLOWED_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/gif",
    "image/svg+xml",
    "image/x-icon",
];

pub fn is_allowed_image(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    ALLOWED_TYPES.contains(&essence.as_str())
}

/// Pull the `file` field out of a multipart body, enforcing type and size.
pub async fn read_image(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<FileUpload> {
    let mut multipart =
        multipart.map_err(|e| AppError::Validation(format!("Invalid upload: {}", e.body_text())))?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        if !is_allowed_image(&content_type) {
            return Err(AppError::Validation(
                "Only PNG, JPEG, WebP, GIF, SVG or ICO images are allowed".to_string(),
            ));
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "upload".to_string());

        let mut buf = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {}", e)))?
        {
            if buf.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(AppError::Validation(
                    "Image must be 5 MB or smaller".to_string(),
                ));
            }
            buf.extend_from_slice(&chunk);
        }

        if buf.is_empty() {
            break;
        }

        return Ok(FileUpload {
            file_name,
            content_type,
            bytes: buf.freeze(),
        });
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types() {
        assert!(is_allowed_image("image/png"));
        assert!(is_allowed_image("IMAGE/JPEG"));
        assert!(is_allowed_image("image/svg+xml; charset=utf-8"));
        assert!(!is_allowed_image("application/pdf"));
        assert!(!is_allowed_image(""));
    }
}

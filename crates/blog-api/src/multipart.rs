//! Reads the multipart body of the create/edit post form.

use actix_multipart::{Field, Multipart};
use blog_core::error::AppError;
use blog_core::forms::PostForm;
use blog_core::services::Upload;
use futures_util::TryStreamExt;

/// Largest accepted image.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Largest accepted text field.
const MAX_FIELD_BYTES: usize = 64 * 1024;

fn bad_request(err: impl std::fmt::Display) -> AppError {
    AppError::ValidationError(format!("malformed form data: {err}"))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_request)? {
        if data.len() + chunk.len() > limit {
            return Err(AppError::ValidationError(format!(
                "field exceeds {limit} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Splits the submission into the text fields and the optional image. An
/// empty file input counts as no upload.
pub async fn read_post_form(mut payload: Multipart) -> Result<(PostForm, Option<Upload>), AppError> {
    let mut form = PostForm::default();
    let mut upload = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_request)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition.get_filename().map(str::to_string);

        match name.as_str() {
            "image" => {
                let content_type = field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = read_field(&mut field, MAX_UPLOAD_BYTES).await?;
                let filename = filename.unwrap_or_default();
                if !data.is_empty() || !filename.is_empty() {
                    upload = Some(Upload {
                        filename,
                        content_type,
                        data,
                    });
                }
            }
            "text" | "group" | "image-clear" => {
                let raw = read_field(&mut field, MAX_FIELD_BYTES).await?;
                let value = String::from_utf8_lossy(&raw).into_owned();
                match name.as_str() {
                    "text" => form.text = value,
                    "group" => form.group = value,
                    _ => form.clear_image = !value.is_empty(),
                }
            }
            other => {
                log::debug!("ignoring unexpected form field {other:?}");
                read_field(&mut field, MAX_UPLOAD_BYTES).await?;
            }
        }
    }

    Ok((form, upload))
}

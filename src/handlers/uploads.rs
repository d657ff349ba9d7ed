use axum::extract::{Multipart, State};
use serde_json::{json, Value};

use crate::config;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::storage::{image_key, validate_image_upload};
use crate::state::AppState;

/// POST /api/upload/image - multipart image upload.
///
/// Accepts a single `file` part, checks it against the image MIME allow-list
/// and size cap, stores it and returns the public object URL. Conversion and
/// compression are the CDN pipeline's job, not ours.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Value> {
    let max_bytes = config::config().upload.max_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .ok_or_else(|| ApiError::bad_request("File part is missing a content type"))?
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file part: {e}")))?;

        validate_image_upload(&content_type, data.len(), max_bytes)?;

        let key = image_key(&content_type);
        let url = state.storage.put_object(&key, data.to_vec(), &content_type).await?;

        tracing::debug!(%key, size = data.len(), "image uploaded");
        return Ok(ApiResponse::created(json!({ "url": url })));
    }

    Err(ApiError::bad_request("Multipart body must contain a 'file' part"))
}

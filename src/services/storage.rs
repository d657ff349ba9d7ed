//! Object storage behind a trait so handlers can be tested against an
//! in-memory implementation instead of a live S3 endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3 as s3;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::ApiError;

/// Image MIME types accepted for upload.
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Store the object and return its public URL.
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ApiError>;
}

/// Check MIME type and size against the upload constraints.
pub fn validate_image_upload(
    content_type: &str,
    len: usize,
    max_bytes: usize,
) -> Result<(), ApiError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(ApiError::unsupported_media_type(format!(
            "Unsupported file type '{content_type}': only jpeg, jpg, png, gif and webp images are allowed"
        )));
    }
    if len > max_bytes {
        return Err(ApiError::payload_too_large(format!(
            "File exceeds the maximum upload size of {} bytes",
            max_bytes
        )));
    }
    Ok(())
}

/// Build an object key for an uploaded image, keeping only a safe extension
/// derived from the MIME type. Caller-supplied names never reach the key.
pub fn image_key(content_type: &str) -> String {
    let ext = match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    };
    format!("uploads/{}.{}", Uuid::new_v4(), ext)
}

/// S3-compatible storage (AWS, MinIO, or any gateway speaking the S3 API).
pub struct S3Storage {
    client: s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn from_config(config: &UploadConfig) -> Self {
        let credentials = s3::config::Credentials::new(
            config.access_key.clone().unwrap_or_default(),
            config.secret_key.clone().unwrap_or_default(),
            None,
            None,
            "static",
        );

        let mut builder = s3::Config::builder()
            .credentials_provider(credentials)
            .region(s3::config::Region::new(config.region.clone()))
            .behavior_version_latest()
            // Path-style addressing keeps MinIO-style gateways working
            .force_path_style(true);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ApiError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(s3::primitives::ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("S3 put_object failed for {}: {}", key, e);
                ApiError::internal_server_error("Failed to store uploaded file")
            })?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

/// In-memory storage used by tests.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.lock().await.contains_key(key)
    }
}

#[async_trait]
impl StorageService for MemoryStorage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ApiError> {
        self.objects
            .lock()
            .await
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(format!("http://localhost:9000/test-bucket/{key}"))
    }
}

pub type SharedStorage = Arc<dyn StorageService>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_validation_enforces_mime_allow_list() {
        assert!(validate_image_upload("image/png", 100, 1000).is_ok());
        assert!(validate_image_upload("image/webp", 100, 1000).is_ok());

        let err = validate_image_upload("application/pdf", 100, 1000).unwrap_err();
        assert_eq!(err.status_code(), 415);

        let err = validate_image_upload("image/png", 2000, 1000).unwrap_err();
        assert_eq!(err.status_code(), 413);
    }

    #[test]
    fn image_key_uses_mime_extension() {
        assert!(image_key("image/png").ends_with(".png"));
        assert!(image_key("image/jpeg").ends_with(".jpg"));
        assert!(image_key("image/webp").ends_with(".webp"));
        assert!(image_key("application/pdf").ends_with(".bin"));
        assert!(image_key("image/png").starts_with("uploads/"));
    }

    #[tokio::test]
    async fn memory_storage_returns_public_url() {
        let storage = MemoryStorage::new();
        let url = storage
            .put_object("uploads/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:9000/test-bucket/uploads/a.png");
        assert!(storage.contains("uploads/a.png").await);
    }
}

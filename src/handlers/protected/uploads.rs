use axum::extract::{Extension, Multipart};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::storage::{ImageStore, StoredImage};

/// POST /api/uploads - Multipart image upload; returns the storage key and
/// public URL to reference from a subsequent post creation.
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<StoredImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|f| f.to_string())
            .ok_or_else(|| ApiError::bad_request("Upload is missing a filename"))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        let stored = ImageStore::from_config()
            .store(auth_user.id, &filename, &bytes)
            .await?;

        return Ok(ApiResponse::created(stored));
    }

    Err(ApiError::bad_request("Expected a multipart field named 'file'"))
}

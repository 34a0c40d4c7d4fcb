use axum::extract::{Extension, Path};
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Post, PostDetails};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::post_service::{PostService, UpdatePost};
use crate::storage::ImageStore;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub image_url: String,
    pub caption: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// GET /api/posts - The caller's posts, newest first
pub async fn list(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Vec<PostDetails>> {
    let pool = DatabaseManager::pool().await?;
    let posts = PostService::new(pool).list_for_user(auth_user.id).await?;
    Ok(ApiResponse::success(posts))
}

/// POST /api/posts - Create a post referencing an uploaded image.
///
/// If the insert fails after the image was already uploaded, the stored file
/// is removed so a quota denial does not leave an orphaned object behind.
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreatePostRequest>,
) -> ApiResult<Post> {
    let pool = DatabaseManager::pool().await?;

    let result = PostService::new(pool)
        .create(
            auth_user.id,
            &payload.image_url,
            payload.caption,
            payload.is_published,
        )
        .await;

    match result {
        Ok(post) => Ok(ApiResponse::created(post)),
        Err(e) => {
            cleanup_upload(auth_user.id, &payload.image_url).await;
            Err(e.into())
        }
    }
}

/// GET /api/posts/:id - Post with owner info and product count
pub async fn get(
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<PostDetails> {
    let pool = DatabaseManager::pool().await?;
    let details = PostService::new(pool).get_details(post_id).await?;

    if details.user_id != auth_user.id && !details.is_published && !auth_user.is_admin() {
        return Err(crate::error::ApiError::not_found("Post not found"));
    }

    Ok(ApiResponse::success(details))
}

/// PATCH /api/posts/:id - Owner-only caption/publish update
pub async fn update(
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<UpdatePost>,
) -> ApiResult<Post> {
    let pool = DatabaseManager::pool().await?;
    let post = PostService::new(pool)
        .update(post_id, auth_user.id, payload)
        .await?;
    Ok(ApiResponse::success(post))
}

/// DELETE /api/posts/:id - Hard delete, removing the stored image as well
pub async fn delete(
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    let post = PostService::new(pool)
        .delete(post_id, auth_user.id, auth_user.is_admin())
        .await?;

    cleanup_upload(post.user_id, &post.image_url).await;

    Ok(ApiResponse::<()>::no_content())
}

/// Best-effort removal of a stored image referenced by URL. Only keys under
/// the owner's directory are touched; external image URLs are left alone.
pub async fn cleanup_upload(owner_id: Uuid, image_url: &str) {
    let Some(key) = ImageStore::key_from_public_url(image_url) else {
        return;
    };
    if !key.starts_with(&format!("{}/", owner_id)) {
        return;
    }
    if let Err(e) = ImageStore::from_config().delete(key).await {
        tracing::warn!(key = %key, "Failed to remove stored image: {}", e);
    }
}

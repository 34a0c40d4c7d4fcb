use axum::extract::Path;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::PostDetails;
use crate::handlers::protected::posts::cleanup_upload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::admin_service::AdminService;

/// GET /api/admin/posts - All posts for moderation
pub async fn list() -> ApiResult<Vec<PostDetails>> {
    let pool = DatabaseManager::pool().await?;
    let posts = AdminService::new(pool).list_posts().await?;
    Ok(ApiResponse::success(posts))
}

/// DELETE /api/admin/posts/:id - Moderation delete, image file included
pub async fn delete(Path(post_id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    let post = AdminService::new(pool).delete_post(post_id).await?;

    cleanup_upload(post.user_id, &post.image_url).await;

    Ok(ApiResponse::<()>::no_content())
}

use axum::extract::Path;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::post_service::PostService;
use crate::services::user_service::UserService;

/// GET /api/profiles/:username - Public profile: bio/avatar plus published
/// posts with their active product counts
pub async fn get(Path(username): Path<String>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let user = UserService::new(pool.clone())
        .get_public_profile(&username)
        .await?;
    let posts = PostService::new(pool)
        .list_published_for_username(&username)
        .await?;

    Ok(ApiResponse::success(json!({
        "user": {
            "id": user.id,
            "username": user.username,
            "bio": user.bio,
            "avatar_url": user.avatar_url,
        },
        "posts": posts,
    })))
}

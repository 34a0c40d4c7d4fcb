use axum::extract::Extension;
use axum::response::Json;
use serde::Deserialize;

use crate::database::manager::DatabaseManager;
use crate::database::models::UserDetails;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::UserService;

/// GET /api/auth/whoami - Current user with role and plan
pub async fn whoami(Extension(auth_user): Extension<AuthUser>) -> ApiResult<UserDetails> {
    let pool = DatabaseManager::pool().await?;
    let details = UserService::new(pool).get_details(auth_user.id).await?;
    Ok(ApiResponse::success(details))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// PATCH /api/auth/profile - Update own bio/avatar
pub async fn update_profile(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<UserDetails> {
    let pool = DatabaseManager::pool().await?;
    let details = UserService::new(pool)
        .update_profile(auth_user.id, payload.bio, payload.avatar_url)
        .await?;
    Ok(ApiResponse::success(details))
}

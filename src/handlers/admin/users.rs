use axum::extract::Path;
use axum::response::Json;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::UserDetails;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::admin_service::{AdminService, UpdateUser};

/// GET /api/admin/users - All accounts with role and plan
pub async fn list() -> ApiResult<Vec<UserDetails>> {
    let pool = DatabaseManager::pool().await?;
    let users = AdminService::new(pool).list_users().await?;
    Ok(ApiResponse::success(users))
}

/// PATCH /api/admin/users/:id - Toggle activation or reassign role/plan
pub async fn update(
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUser>,
) -> ApiResult<UserDetails> {
    let pool = DatabaseManager::pool().await?;
    let user = AdminService::new(pool).update_user(user_id, payload).await?;
    Ok(ApiResponse::success(user))
}

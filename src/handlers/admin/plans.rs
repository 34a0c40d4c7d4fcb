use axum::extract::Path;
use axum::response::Json;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::SubscriptionPlan;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::admin_service::{AdminService, NewPlan, UpdatePlan};

/// GET /api/admin/plans - All plans including inactive ones
pub async fn list() -> ApiResult<Vec<SubscriptionPlan>> {
    let pool = DatabaseManager::pool().await?;
    let plans = AdminService::new(pool).list_plans().await?;
    Ok(ApiResponse::success(plans))
}

/// POST /api/admin/plans - Create a plan
pub async fn create(Json(payload): Json<NewPlan>) -> ApiResult<SubscriptionPlan> {
    let pool = DatabaseManager::pool().await?;
    let plan = AdminService::new(pool).create_plan(payload).await?;
    Ok(ApiResponse::created(plan))
}

/// PATCH /api/admin/plans/:id - Edit limits, price, or activation
pub async fn update(
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<UpdatePlan>,
) -> ApiResult<SubscriptionPlan> {
    let pool = DatabaseManager::pool().await?;
    let plan = AdminService::new(pool).update_plan(plan_id, payload).await?;
    Ok(ApiResponse::success(plan))
}

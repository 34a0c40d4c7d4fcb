use crate::database::manager::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::admin_service::{AdminService, PlatformStats};

/// GET /api/admin/stats - Platform-wide totals and revenue
pub async fn get() -> ApiResult<PlatformStats> {
    let pool = DatabaseManager::pool().await?;
    let stats = AdminService::new(pool).platform_stats().await?;
    Ok(ApiResponse::success(stats))
}

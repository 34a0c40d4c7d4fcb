use axum::extract::{Extension, Query};
use serde::Deserialize;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::click_service::{Analytics, ClickService, TimeRange, UserStats};

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// One of 7d | 30d | 90d | all; defaults to 30d
    pub range: Option<String>,
}

/// GET /api/analytics - Click-through analytics for the caller's posts
pub async fn get(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Analytics> {
    let range = match query.range.as_deref() {
        None => TimeRange::default(),
        Some(raw) => TimeRange::parse(raw)
            .ok_or_else(|| ApiError::bad_request("range must be one of 7d, 30d, 90d, all"))?,
    };

    let pool = DatabaseManager::pool().await?;
    let analytics = ClickService::new(pool).analytics(auth_user.id, range).await?;
    Ok(ApiResponse::success(analytics))
}

/// GET /api/stats - Dashboard header counters
pub async fn stats(Extension(auth_user): Extension<AuthUser>) -> ApiResult<UserStats> {
    let pool = DatabaseManager::pool().await?;
    let stats = ClickService::new(pool).user_stats(auth_user.id).await?;
    Ok(ApiResponse::success(stats))
}

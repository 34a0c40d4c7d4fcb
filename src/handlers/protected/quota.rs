use axum::extract::{Extension, Query};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::quota_service::{LimitKind, QuotaService, QuotaStatus};

#[derive(Debug, Deserialize)]
pub struct QuotaQuery {
    /// `posts` or `products`
    pub kind: String,
    /// Required when kind=products
    pub post_id: Option<Uuid>,
}

/// GET /api/quota - Current usage against the caller's plan limits
pub async fn get(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<QuotaQuery>,
) -> ApiResult<QuotaStatus> {
    let kind = match query.kind.as_str() {
        "posts" => LimitKind::Posts,
        "products" => {
            let post_id = query
                .post_id
                .ok_or_else(|| ApiError::bad_request("post_id is required for kind=products"))?;
            LimitKind::Products { post_id }
        }
        other => {
            return Err(ApiError::bad_request(format!(
                "Unknown limit kind: {}",
                other
            )))
        }
    };

    let pool = DatabaseManager::pool().await?;
    let status = QuotaService::new(pool).check_limit(auth_user.id, kind).await?;
    Ok(ApiResponse::success(status))
}

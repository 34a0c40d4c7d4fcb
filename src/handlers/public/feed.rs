use axum::extract::{Path, Query};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{PostDetails, Product};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::post_service::PostService;
use crate::services::product_service::ProductService;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/feed - Recent published posts across all active users
pub async fn get(Query(query): Query<FeedQuery>) -> ApiResult<Vec<PostDetails>> {
    let pool = DatabaseManager::pool().await?;
    let posts = PostService::new(pool)
        .feed(query.limit.unwrap_or(20), query.offset.unwrap_or(0))
        .await?;
    Ok(ApiResponse::success(posts))
}

/// GET /api/posts/:id/products - Active product tags on a published post
pub async fn post_products(Path(post_id): Path<Uuid>) -> ApiResult<Vec<Product>> {
    let pool = DatabaseManager::pool().await?;

    let post = PostService::new(pool.clone()).get(post_id).await?;
    if !post.is_published {
        return Err(ApiError::not_found("Post not found"));
    }

    let products = ProductService::new(pool)
        .list_active_for_post(post_id)
        .await?;
    Ok(ApiResponse::success(products))
}

use axum::extract::{Extension, Path};
use axum::response::Json;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Product;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::product_service::{NewProduct, ProductService, UpdateProduct};

/// GET /api/posts/:id/products/all - Every tag on an owned post, including
/// deactivated ones (the tagging editor view)
pub async fn list_for_post(
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Vec<Product>> {
    let pool = DatabaseManager::pool().await?;
    let products = ProductService::new(pool)
        .list_for_post(post_id, auth_user.id)
        .await?;
    Ok(ApiResponse::success(products))
}

#[derive(Debug, serde::Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub affiliate_url: String,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
}

/// POST /api/posts/:id/products - Tag a product at a clicked position on an
/// owned post
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<Product> {
    let pool = DatabaseManager::pool().await?;
    let product = ProductService::new(pool)
        .create(
            post_id,
            auth_user.id,
            NewProduct {
                name: payload.name,
                description: payload.description,
                affiliate_url: payload.affiliate_url,
                x_coordinate: payload.x_coordinate,
                y_coordinate: payload.y_coordinate,
            },
        )
        .await?;
    Ok(ApiResponse::created(product))
}

/// PATCH /api/products/:id - Edit an owned tag
pub async fn update(
    Extension(auth_user): Extension<AuthUser>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProduct>,
) -> ApiResult<Product> {
    let pool = DatabaseManager::pool().await?;
    let product = ProductService::new(pool)
        .update(product_id, auth_user.id, payload)
        .await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/products/:id - Soft delete; click history stays
pub async fn delete(
    Extension(auth_user): Extension<AuthUser>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    ProductService::new(pool)
        .deactivate(product_id, auth_user.id)
        .await?;
    Ok(ApiResponse::<()>::no_content())
}

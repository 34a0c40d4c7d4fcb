use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Affiliate product tag anchored to a percentage coordinate on a post image.
/// Coordinates are always within [0, 100]; inputs are clamped before storage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub affiliate_url: String,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Analytics row: a product with its lifetime click total and post caption.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductClickCount {
    pub id: Uuid,
    pub name: String,
    pub affiliate_url: String,
    pub post_caption: Option<String>,
    pub total_clicks: i64,
}

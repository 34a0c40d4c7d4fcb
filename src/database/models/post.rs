use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post row joined with owner info and the count of active product tags.
/// Replaces the `post_details` convenience view with an explicit join.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: String,
    pub user_avatar: Option<String>,
    pub product_count: i64,
}

pub const POST_DETAILS_SELECT: &str = r#"
    SELECT po.id, po.user_id, po.image_url, po.caption, po.is_published,
           po.created_at, po.updated_at,
           u.username, u.avatar_url AS user_avatar,
           (SELECT COUNT(*) FROM products pr
             WHERE pr.post_id = po.id AND pr.is_active) AS product_count
    FROM posts po
    JOIN users u ON u.id = po.user_id
"#;

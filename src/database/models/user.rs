use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role_id: Uuid,
    pub plan_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User row joined with its role and plan. Replaces the `user_details`
/// convenience view from the hosted variant with an explicit join.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserDetails {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub role_name: String,
    pub role_permissions: serde_json::Value,
    pub plan_name: String,
    pub max_posts: i32,
    pub max_products_per_post: i32,
}

impl UserDetails {
    pub fn is_admin(&self) -> bool {
        self.role_name == super::role::UserRole::ADMIN
    }
}

pub const USER_DETAILS_SELECT: &str = r#"
    SELECT u.id, u.username, u.email, u.bio, u.avatar_url, u.is_active, u.created_at,
           r.name AS role_name, r.permissions AS role_permissions,
           p.name AS plan_name, p.max_posts, p.max_products_per_post
    FROM users u
    JOIN user_roles r ON r.id = u.role_id
    JOIN subscription_plans p ON p.id = u.plan_id
"#;

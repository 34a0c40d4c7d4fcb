use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Static reference data: `admin` and `user` rows seeded by migration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRole {
    pub id: Uuid,
    pub name: String,
    pub permissions: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl UserRole {
    pub const ADMIN: &'static str = "admin";
    pub const USER: &'static str = "user";
}

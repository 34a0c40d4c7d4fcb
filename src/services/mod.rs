pub mod admin_service;
pub mod click_service;
pub mod post_service;
pub mod product_service;
pub mod quota_service;
pub mod user_service;

use thiserror::Error;

/// Shared error type for the service layer
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{message}")]
    QuotaExceeded { message: String, current: i64, limit: i32 },

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Manager(#[from] crate::database::manager::DatabaseError),

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),
}

use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::database::manager::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::{Registration, UserService};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register - Create an account and receive a session token
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let service = UserService::new(pool);

    let user = service
        .register(Registration {
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    let claims = Claims::new(user.id, user.username.clone(), user.role_name.clone());
    let token = generate_jwt(&claims)?;

    tracing::info!(user_id = %user.id, username = %user.username, "Registered new account");

    Ok(ApiResponse::created(json!({
        "token": token,
        "user": user,
    })))
}

/// POST /auth/login - Authenticate and receive a session token
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let service = UserService::new(pool);

    let user = service.login(&payload.email, &payload.password).await?;

    let claims = Claims::new(user.id, user.username.clone(), user.role_name.clone());
    let token = generate_jwt(&claims)?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": user,
    })))
}

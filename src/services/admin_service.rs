use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::post::POST_DETAILS_SELECT;
use crate::database::models::user::USER_DETAILS_SELECT;
use crate::database::models::{Post, PostDetails, SubscriptionPlan, UserDetails};
use crate::services::ServiceError;

#[derive(Debug, Serialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_clicks: i64,
    /// Sum of plan prices across active users (monthly revenue proxy)
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    pub is_active: Option<bool>,
    pub role_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
    pub name: String,
    pub max_posts: i32,
    pub max_products_per_post: i32,
    pub price: Decimal,
    #[serde(default)]
    pub features: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlan {
    pub name: Option<String>,
    pub max_posts: Option<i32>,
    pub max_products_per_post: Option<i32>,
    pub price: Option<Decimal>,
    pub features: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

/// Moderation and reference-data management, admin role only
pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn platform_stats(&self) -> Result<PlatformStats, ServiceError> {
        let (total_users, total_posts, total_clicks, revenue): (i64, i64, i64, Option<Decimal>) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM posts),
                    (SELECT COUNT(*) FROM clicks),
                    (SELECT SUM(p.price) FROM users u
                       JOIN subscription_plans p ON p.id = u.plan_id
                      WHERE u.is_active)
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(PlatformStats {
            total_users,
            total_posts,
            total_clicks,
            revenue: revenue.unwrap_or_default(),
        })
    }

    pub async fn list_users(&self) -> Result<Vec<UserDetails>, ServiceError> {
        let query = format!("{} ORDER BY u.created_at DESC", USER_DETAILS_SELECT);
        Ok(sqlx::query_as(&query).fetch_all(&self.pool).await?)
    }

    /// Toggle activation or move a user onto a different role/plan
    pub async fn update_user(
        &self,
        user_id: Uuid,
        update: UpdateUser,
    ) -> Result<UserDetails, ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = COALESCE($2, is_active),
                role_id = COALESCE($3, role_id),
                plan_id = COALESCE($4, plan_id),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(update.is_active)
        .bind(update.role_id)
        .bind(update.plan_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        let query = format!("{} WHERE u.id = $1", USER_DETAILS_SELECT);
        Ok(sqlx::query_as(&query).bind(user_id).fetch_one(&self.pool).await?)
    }

    pub async fn list_posts(&self) -> Result<Vec<PostDetails>, ServiceError> {
        let query = format!("{} ORDER BY po.created_at DESC", POST_DETAILS_SELECT);
        Ok(sqlx::query_as(&query).fetch_all(&self.pool).await?)
    }

    /// Moderation delete; returns the row so the image file can be removed
    pub async fn delete_post(&self, post_id: Uuid) -> Result<Post, ServiceError> {
        let post: Option<Post> = sqlx::query_as("DELETE FROM posts WHERE id = $1 RETURNING *")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        post.ok_or_else(|| ServiceError::NotFound("Post not found".to_string()))
    }

    pub async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, ServiceError> {
        Ok(sqlx::query_as("SELECT * FROM subscription_plans ORDER BY price")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn create_plan(&self, plan: NewPlan) -> Result<SubscriptionPlan, ServiceError> {
        if plan.max_posts < -1 || plan.max_products_per_post < -1 {
            return Err(ServiceError::Validation(
                "Limits must be -1 (unlimited) or a non-negative count".to_string(),
            ));
        }

        let created: Result<SubscriptionPlan, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO subscription_plans (name, max_posts, max_products_per_post, price, features)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(plan.name.trim())
        .bind(plan.max_posts)
        .bind(plan.max_products_per_post)
        .bind(plan.price)
        .bind(plan.features)
        .fetch_one(&self.pool)
        .await;

        created.map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ServiceError::Conflict("A plan with that name already exists".to_string())
            }
            _ => ServiceError::Database(e),
        })
    }

    pub async fn update_plan(
        &self,
        plan_id: Uuid,
        update: UpdatePlan,
    ) -> Result<SubscriptionPlan, ServiceError> {
        if update.max_posts.is_some_and(|v| v < -1)
            || update.max_products_per_post.is_some_and(|v| v < -1)
        {
            return Err(ServiceError::Validation(
                "Limits must be -1 (unlimited) or a non-negative count".to_string(),
            ));
        }

        let updated: Option<SubscriptionPlan> = sqlx::query_as(
            r#"
            UPDATE subscription_plans
            SET name = COALESCE($2, name),
                max_posts = COALESCE($3, max_posts),
                max_products_per_post = COALESCE($4, max_products_per_post),
                price = COALESCE($5, price),
                features = COALESCE($6, features),
                is_active = COALESCE($7, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(plan_id)
        .bind(update.name)
        .bind(update.max_posts)
        .bind(update.max_products_per_post)
        .bind(update.price)
        .bind(update.features)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| ServiceError::NotFound("Plan not found".to_string()))
    }
}

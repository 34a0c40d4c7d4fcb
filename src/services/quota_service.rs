use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::plan::UNLIMITED;
use crate::services::ServiceError;

/// Which per-plan limit to check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Posts,
    Products { post_id: Uuid },
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotaStatus {
    pub allowed: bool,
    pub current: i64,
    pub limit: i32,
    pub unlimited: bool,
    pub plan_name: String,
}

impl QuotaStatus {
    /// Pure quota decision: -1 means unlimited, otherwise current must stay
    /// strictly below the limit for another create to be allowed.
    pub fn evaluate(current: i64, limit: i32, plan_name: String) -> Self {
        let unlimited = limit == UNLIMITED;
        Self {
            allowed: unlimited || current < limit as i64,
            current,
            limit,
            unlimited,
            plan_name,
        }
    }
}

/// Checks per-plan caps on posts and tagged products.
///
/// The standalone check is advisory (used by the route gate and the quota
/// endpoint); creation paths re-run the same count inside a transaction that
/// locks the owning row, so two concurrent creates cannot both pass.
pub struct QuotaService {
    pool: PgPool,
}

impl QuotaService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn check_limit(
        &self,
        user_id: Uuid,
        kind: LimitKind,
    ) -> Result<QuotaStatus, ServiceError> {
        let plan: Option<(String, i32, i32)> = sqlx::query_as(
            r#"
            SELECT p.name, p.max_posts, p.max_products_per_post
            FROM users u
            JOIN subscription_plans p ON p.id = u.plan_id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let (plan_name, max_posts, max_products) =
            plan.ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        match kind {
            LimitKind::Posts => {
                if max_posts == UNLIMITED {
                    // Matches the hosted behavior: no count query for unlimited plans
                    return Ok(QuotaStatus::evaluate(0, UNLIMITED, plan_name));
                }
                let current = count_posts(&self.pool, user_id).await?;
                Ok(QuotaStatus::evaluate(current, max_posts, plan_name))
            }
            LimitKind::Products { post_id } => {
                let current = count_active_products(&self.pool, post_id).await?;
                Ok(QuotaStatus::evaluate(current, max_products, plan_name))
            }
        }
    }
}

pub async fn count_posts<'e, E>(executor: E, user_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(executor)
        .await
}

pub async fn count_active_products<'e, E>(executor: E, post_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE post_id = $1 AND is_active")
        .bind(post_id)
        .fetch_one(executor)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_at_limit() {
        // max_posts = 3 with 3 existing posts is a denial
        let status = QuotaStatus::evaluate(3, 3, "free".to_string());
        assert!(!status.allowed);
        assert_eq!(status.current, 3);
        assert_eq!(status.limit, 3);
        assert!(!status.unlimited);
    }

    #[test]
    fn allows_below_limit() {
        let status = QuotaStatus::evaluate(2, 3, "free".to_string());
        assert!(status.allowed);
    }

    #[test]
    fn unlimited_always_allows() {
        for current in [0, 3, 1_000_000] {
            let status = QuotaStatus::evaluate(current, UNLIMITED, "pro".to_string());
            assert!(status.allowed, "current={} should be allowed", current);
            assert!(status.unlimited);
        }
    }

    #[test]
    fn zero_limit_denies_first_create() {
        let status = QuotaStatus::evaluate(0, 0, "suspended".to_string());
        assert!(!status.allowed);
    }
}

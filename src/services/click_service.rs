use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{ClickSummary, ProductClickCount};
use crate::services::ServiceError;

/// Visitor context captured with each click
#[derive(Debug, Clone, Default)]
pub struct ClickSource {
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// Analytics window selected on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    SevenDays,
    #[default]
    ThirtyDays,
    NinetyDays,
    All,
}

impl TimeRange {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "7d" => Some(Self::SevenDays),
            "30d" => Some(Self::ThirtyDays),
            "90d" => Some(Self::NinetyDays),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Inclusive lower bound for the window; `None` means unbounded.
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::SevenDays => Some(now - Duration::days(7)),
            Self::ThirtyDays => Some(now - Duration::days(30)),
            Self::NinetyDays => Some(now - Duration::days(90)),
            Self::All => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Analytics {
    pub total_posts: i64,
    pub total_products: i64,
    pub total_clicks: i64,
    pub clicks_this_week: i64,
    pub clicks_this_month: i64,
    pub top_products: Vec<ProductClickCount>,
    pub recent_clicks: Vec<ClickSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub total_posts: i64,
    pub total_products: i64,
    pub total_clicks: i64,
    pub this_month_clicks: i64,
}

/// Click capture and per-user aggregation.
///
/// The hosted variant fanned these numbers out as a dozen chained client
/// queries; here each figure is one joined aggregate.
pub struct ClickService {
    pool: PgPool,
}

impl ClickService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Affiliate URL of an active product, if any. Used to answer the visitor
    /// before the click row is written.
    pub async fn affiliate_url(&self, product_id: Uuid) -> Result<Option<String>, ServiceError> {
        Ok(sqlx::query_scalar(
            "SELECT affiliate_url FROM products WHERE id = $1 AND is_active",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Append one click record. Callers on the hot path spawn this and only
    /// log a failure; a dropped click is acceptable, a blocked redirect is not.
    pub async fn record(&self, product_id: Uuid, source: ClickSource) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO clicks (product_id, user_id, ip_address, user_agent, referrer)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(product_id)
        .bind(source.user_id)
        .bind(source.ip_address)
        .bind(source.user_agent)
        .bind(source.referrer)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Dashboard analytics scoped to one user's posts
    pub async fn analytics(&self, user_id: Uuid, range: TimeRange) -> Result<Analytics, ServiceError> {
        let now = Utc::now();

        let (total_posts, total_products, total_clicks) = self.totals(user_id).await?;
        let clicks_this_week = self.clicks_since(user_id, now - Duration::days(7)).await?;
        let clicks_this_month = self.clicks_since(user_id, now - Duration::days(30)).await?;

        let since = range.since(now);

        let top_products: Vec<ProductClickCount> = sqlx::query_as(
            r#"
            SELECT pr.id, pr.name, pr.affiliate_url, po.caption AS post_caption,
                   COUNT(c.id) FILTER (WHERE $2::timestamptz IS NULL OR c.clicked_at >= $2) AS total_clicks
            FROM products pr
            JOIN posts po ON po.id = pr.post_id
            LEFT JOIN clicks c ON c.product_id = pr.id
            WHERE po.user_id = $1
            GROUP BY pr.id, pr.name, pr.affiliate_url, po.caption
            ORDER BY total_clicks DESC
            LIMIT 5
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let recent_clicks: Vec<ClickSummary> = sqlx::query_as(
            r#"
            SELECT c.id, pr.name AS product_name, c.clicked_at, c.ip_address
            FROM clicks c
            JOIN products pr ON pr.id = c.product_id
            JOIN posts po ON po.id = pr.post_id
            WHERE po.user_id = $1
              AND ($2::timestamptz IS NULL OR c.clicked_at >= $2)
            ORDER BY c.clicked_at DESC
            LIMIT 10
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(Analytics {
            total_posts,
            total_products,
            total_clicks,
            clicks_this_week,
            clicks_this_month,
            top_products,
            recent_clicks,
        })
    }

    /// Dashboard header counters
    pub async fn user_stats(&self, user_id: Uuid) -> Result<UserStats, ServiceError> {
        let (total_posts, total_products, total_clicks) = self.totals(user_id).await?;
        let this_month_clicks = self
            .clicks_since(user_id, Utc::now() - Duration::days(30))
            .await?;

        Ok(UserStats {
            total_posts,
            total_products,
            total_clicks,
            this_month_clicks,
        })
    }

    async fn totals(&self, user_id: Uuid) -> Result<(i64, i64, i64), ServiceError> {
        let totals: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM posts WHERE user_id = $1),
                (SELECT COUNT(*) FROM products pr
                   JOIN posts po ON po.id = pr.post_id
                  WHERE po.user_id = $1),
                (SELECT COUNT(*) FROM clicks c
                   JOIN products pr ON pr.id = c.product_id
                   JOIN posts po ON po.id = pr.post_id
                  WHERE po.user_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    async fn clicks_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, ServiceError> {
        Ok(sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM clicks c
            JOIN products pr ON pr.id = c.product_id
            JOIN posts po ON po.id = pr.post_id
            WHERE po.user_id = $1 AND c.clicked_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parsing() {
        assert_eq!(TimeRange::parse("7d"), Some(TimeRange::SevenDays));
        assert_eq!(TimeRange::parse("30d"), Some(TimeRange::ThirtyDays));
        assert_eq!(TimeRange::parse("90d"), Some(TimeRange::NinetyDays));
        assert_eq!(TimeRange::parse("all"), Some(TimeRange::All));
        assert_eq!(TimeRange::parse("1y"), None);
    }

    #[test]
    fn range_lower_bounds() {
        let now = Utc::now();
        assert_eq!(TimeRange::SevenDays.since(now), Some(now - Duration::days(7)));
        assert_eq!(TimeRange::All.since(now), None);
    }
}

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::plan::UNLIMITED;
use crate::database::models::Product;
use crate::services::quota_service;
use crate::services::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub affiliate_url: String,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub affiliate_url: Option<String>,
    pub x_coordinate: Option<f64>,
    pub y_coordinate: Option<f64>,
}

pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tag a product on a post. Coordinates are clamped to [0, 100]; the
    /// per-post product quota is enforced under a lock on the post row.
    pub async fn create(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        product: NewProduct,
    ) -> Result<Product, ServiceError> {
        let name = required(&product.name, "Product name")?;
        let affiliate_url = validate_affiliate_url(&product.affiliate_url)?;
        let description = normalize_description(product.description);

        let mut tx = self.pool.begin().await?;

        let owner: Option<(Uuid, i32)> = sqlx::query_as(
            r#"
            SELECT po.user_id, p.max_products_per_post
            FROM posts po
            JOIN users u ON u.id = po.user_id
            JOIN subscription_plans p ON p.id = u.plan_id
            WHERE po.id = $1
            FOR UPDATE OF po
            "#,
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (owner_id, max_products) =
            owner.ok_or_else(|| ServiceError::NotFound("Post not found".to_string()))?;

        if owner_id != user_id {
            return Err(ServiceError::Forbidden(
                "Only the post owner can tag products".to_string(),
            ));
        }

        if max_products != UNLIMITED {
            let current = quota_service::count_active_products(&mut *tx, post_id).await?;
            if current >= max_products as i64 {
                return Err(ServiceError::QuotaExceeded {
                    message: "Product limit reached for this post".to_string(),
                    current,
                    limit: max_products,
                });
            }
        }

        let created: Product = sqlx::query_as(
            r#"
            INSERT INTO products (post_id, name, description, affiliate_url, x_coordinate, y_coordinate)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(post_id)
        .bind(name)
        .bind(description)
        .bind(affiliate_url)
        .bind(clamp_coordinate(product.x_coordinate))
        .bind(clamp_coordinate(product.y_coordinate))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        product_id: Uuid,
        user_id: Uuid,
        update: UpdateProduct,
    ) -> Result<Product, ServiceError> {
        self.require_owned(product_id, user_id).await?;

        let name = match update.name {
            Some(name) => Some(required(&name, "Product name")?),
            None => None,
        };
        let affiliate_url = match update.affiliate_url {
            Some(url) => Some(validate_affiliate_url(&url)?),
            None => None,
        };

        let updated: Product = sqlx::query_as(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                affiliate_url = COALESCE($4, affiliate_url),
                x_coordinate = COALESCE($5, x_coordinate),
                y_coordinate = COALESCE($6, y_coordinate),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(name)
        .bind(update.description)
        .bind(affiliate_url)
        .bind(update.x_coordinate.map(clamp_coordinate))
        .bind(update.y_coordinate.map(clamp_coordinate))
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Soft delete: the tag disappears from public reads but its click history
    /// survives for analytics.
    pub async fn deactivate(&self, product_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        self.require_owned(product_id, user_id).await?;

        sqlx::query("UPDATE products SET is_active = false, updated_at = now() WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Active tags for a post, the public read path
    pub async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Product>, ServiceError> {
        Ok(sqlx::query_as(
            "SELECT * FROM products WHERE post_id = $1 AND is_active ORDER BY created_at",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// All tags for a post, for the owner's tagging editor
    pub async fn list_for_post(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Product>, ServiceError> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        match owner {
            None => Err(ServiceError::NotFound("Post not found".to_string())),
            Some(owner_id) if owner_id != user_id => Err(ServiceError::Forbidden(
                "Only the post owner can list all tags".to_string(),
            )),
            Some(_) => Ok(sqlx::query_as(
                "SELECT * FROM products WHERE post_id = $1 ORDER BY created_at",
            )
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?),
        }
    }

    async fn require_owned(&self, product_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        let owner: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT po.user_id
            FROM products pr
            JOIN posts po ON po.id = pr.post_id
            WHERE pr.id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        match owner {
            None => Err(ServiceError::NotFound("Product not found".to_string())),
            Some(owner_id) if owner_id != user_id => Err(ServiceError::Forbidden(
                "Only the post owner can edit its products".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}

/// Clamp a tag coordinate into [0, 100]. Non-finite input lands at 0.
pub fn clamp_coordinate(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn required(value: &str, field: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::Validation(format!("{} is required", field)))
    } else {
        Ok(trimmed.to_string())
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

pub fn validate_affiliate_url(raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("Affiliate URL is required".to_string()));
    }
    let parsed = url::Url::parse(trimmed)
        .map_err(|_| ServiceError::Validation("Affiliate URL is not a valid URL".to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ServiceError::Validation(format!(
            "Affiliate URL must be http(s), got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_clamp_into_range() {
        assert_eq!(clamp_coordinate(-3.5), 0.0);
        assert_eq!(clamp_coordinate(0.0), 0.0);
        assert_eq!(clamp_coordinate(42.7), 42.7);
        assert_eq!(clamp_coordinate(100.0), 100.0);
        assert_eq!(clamp_coordinate(250.0), 100.0);
    }

    #[test]
    fn non_finite_coordinates_are_grounded() {
        assert_eq!(clamp_coordinate(f64::NAN), 0.0);
        assert_eq!(clamp_coordinate(f64::INFINITY), 0.0);
        assert_eq!(clamp_coordinate(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn affiliate_url_must_be_http() {
        assert!(validate_affiliate_url("https://shop.example.com/item?ref=42").is_ok());
        assert!(validate_affiliate_url("http://shop.example.com").is_ok());
        assert!(validate_affiliate_url("ftp://shop.example.com").is_err());
        assert!(validate_affiliate_url("javascript:alert(1)").is_err());
        assert!(validate_affiliate_url("not a url").is_err());
        assert!(validate_affiliate_url("   ").is_err());
    }

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(required("  Mavi Tişört  ", "Product name").unwrap(), "Mavi Tişört");
        assert!(required("   ", "Product name").is_err());
    }

    #[test]
    fn empty_descriptions_become_null() {
        assert_eq!(normalize_description(Some("  ".to_string())), None);
        assert_eq!(normalize_description(Some(" kısa ".to_string())), Some("kısa".to_string()));
        assert_eq!(normalize_description(None), None);
    }
}

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::plan::UNLIMITED;
use crate::database::models::post::POST_DETAILS_SELECT;
use crate::database::models::{Post, PostDetails};
use crate::services::quota_service;
use crate::services::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePost {
    pub caption: Option<String>,
    pub is_published: Option<bool>,
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post, enforcing the plan's post quota.
    ///
    /// Count and insert run in one transaction holding a lock on the owner's
    /// user row, so two concurrent creates serialize and cannot both slip
    /// under the limit.
    pub async fn create(
        &self,
        user_id: Uuid,
        image_url: &str,
        caption: Option<String>,
        is_published: bool,
    ) -> Result<Post, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let max_posts: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT p.max_posts
            FROM users u
            JOIN subscription_plans p ON p.id = u.plan_id
            WHERE u.id = $1
            FOR UPDATE OF u
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let max_posts =
            max_posts.ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        if max_posts != UNLIMITED {
            let current = quota_service::count_posts(&mut *tx, user_id).await?;
            if current >= max_posts as i64 {
                return Err(ServiceError::QuotaExceeded {
                    message: "Post limit reached for your plan".to_string(),
                    current,
                    limit: max_posts,
                });
            }
        }

        let post: Post = sqlx::query_as(
            r#"
            INSERT INTO posts (user_id, image_url, caption, is_published)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(image_url)
        .bind(caption)
        .bind(is_published)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(post)
    }

    pub async fn get(&self, post_id: Uuid) -> Result<Post, ServiceError> {
        sqlx::query_as("SELECT * FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Post not found".to_string()))
    }

    pub async fn get_details(&self, post_id: Uuid) -> Result<PostDetails, ServiceError> {
        let query = format!("{} WHERE po.id = $1", POST_DETAILS_SELECT);
        sqlx::query_as(&query)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Post not found".to_string()))
    }

    /// Owner-only caption/publish update. Setting `is_published` twice with
    /// opposite values restores the original visibility.
    pub async fn update(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        update: UpdatePost,
    ) -> Result<Post, ServiceError> {
        let post = self.get(post_id).await?;
        if post.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "Only the post owner can edit it".to_string(),
            ));
        }

        let (caption, is_published) = apply_update(&post, &update);

        let updated: Post = sqlx::query_as(
            r#"
            UPDATE posts
            SET caption = $2, is_published = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(post_id)
        .bind(caption)
        .bind(is_published)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Hard delete; products and clicks go with it via FK cascade. Returns the
    /// deleted row so the caller can remove the stored image.
    pub async fn delete(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<Post, ServiceError> {
        let post = self.get(post_id).await?;
        if post.user_id != user_id && !is_admin {
            return Err(ServiceError::Forbidden(
                "Only the post owner can delete it".to_string(),
            ));
        }

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(post)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PostDetails>, ServiceError> {
        let query = format!(
            "{} WHERE po.user_id = $1 ORDER BY po.created_at DESC",
            POST_DETAILS_SELECT
        );
        Ok(sqlx::query_as(&query).bind(user_id).fetch_all(&self.pool).await?)
    }

    /// Published posts for a public profile page
    pub async fn list_published_for_username(
        &self,
        username: &str,
    ) -> Result<Vec<PostDetails>, ServiceError> {
        let query = format!(
            r#"{} WHERE u.username = $1 AND u.is_active AND po.is_published
               ORDER BY po.created_at DESC"#,
            POST_DETAILS_SELECT
        );
        Ok(sqlx::query_as(&query).bind(username).fetch_all(&self.pool).await?)
    }

    /// Recent published posts across all active users (home feed)
    pub async fn feed(&self, limit: i64, offset: i64) -> Result<Vec<PostDetails>, ServiceError> {
        let query = format!(
            r#"{} WHERE po.is_published AND u.is_active
               ORDER BY po.created_at DESC
               LIMIT $1 OFFSET $2"#,
            POST_DETAILS_SELECT
        );
        Ok(sqlx::query_as(&query)
            .bind(limit.clamp(1, 100))
            .bind(offset.max(0))
            .fetch_all(&self.pool)
            .await?)
    }
}

/// Resolve a partial update against the stored row. Omitted fields keep their
/// current value, so setting `is_published` twice with opposite values lands
/// back on the stored state.
fn apply_update(post: &Post, update: &UpdatePost) -> (Option<String>, bool) {
    let caption = update.caption.clone().or_else(|| post.caption.clone());
    let is_published = update.is_published.unwrap_or(post.is_published);
    (caption, is_published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored_post(is_published: bool) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            image_url: "/media/u/1.jpg".to_string(),
            caption: Some("spring fit".to_string()),
            is_published,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn publish_toggle_twice_restores_original_state() {
        for original in [true, false] {
            let post = stored_post(original);

            let (caption, flipped) = apply_update(
                &post,
                &UpdatePost {
                    caption: None,
                    is_published: Some(!original),
                },
            );
            assert_eq!(flipped, !original);

            let mut toggled = post.clone();
            toggled.caption = caption;
            toggled.is_published = flipped;

            let (restored_caption, restored) = apply_update(
                &toggled,
                &UpdatePost {
                    caption: None,
                    is_published: Some(original),
                },
            );
            assert_eq!(restored, original);
            assert_eq!(restored_caption, post.caption);
        }
    }

    #[test]
    fn omitted_fields_keep_stored_values() {
        let post = stored_post(true);
        let (caption, is_published) = apply_update(
            &post,
            &UpdatePost {
                caption: None,
                is_published: None,
            },
        );
        assert_eq!(caption.as_deref(), Some("spring fit"));
        assert!(is_published);
    }
}

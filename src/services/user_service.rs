use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::database::models::user::USER_DETAILS_SELECT;
use crate::database::models::{User, UserDetails, UserRole};
use crate::services::ServiceError;

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an account on the default role and plan, returning the new user.
    pub async fn register(&self, registration: Registration) -> Result<UserDetails, ServiceError> {
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_lowercase();

        validate_username(&username)?;
        validate_email(&email)?;
        if registration.password.len() < 8 {
            return Err(ServiceError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let password_hash = auth::hash_password(&registration.password)
            .map_err(|e| ServiceError::Validation(format!("Unusable password: {}", e)))?;

        let role_id: Uuid = sqlx::query_scalar("SELECT id FROM user_roles WHERE name = $1")
            .bind(UserRole::USER)
            .fetch_one(&self.pool)
            .await?;

        // New accounts land on the cheapest active plan
        let plan_id: Uuid = sqlx::query_scalar(
            "SELECT id FROM subscription_plans WHERE is_active ORDER BY price ASC LIMIT 1",
        )
        .fetch_one(&self.pool)
        .await?;

        let inserted: Result<(Uuid,), sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO users (username, email, password_hash, role_id, plan_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&username)
        .bind(&email)
        .bind(&password_hash)
        .bind(role_id)
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await;

        let (user_id,) = inserted.map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ServiceError::Conflict("Username or email is already taken".to_string())
            }
            _ => ServiceError::Database(e),
        })?;

        self.get_details(user_id).await
    }

    /// Verify credentials and return the account. Deactivated accounts cannot
    /// log in even with a valid password.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserDetails, ServiceError> {
        let email = email.trim().to_lowercase();

        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let user = match user {
            Some(user) if auth::verify_password(password, &user.password_hash) => user,
            _ => {
                return Err(ServiceError::Unauthorized(
                    "Invalid email or password".to_string(),
                ))
            }
        };

        if !user.is_active {
            return Err(ServiceError::Forbidden("Account is deactivated".to_string()));
        }

        self.get_details(user.id).await
    }

    /// User joined with role and plan
    pub async fn get_details(&self, user_id: Uuid) -> Result<UserDetails, ServiceError> {
        let query = format!("{} WHERE u.id = $1", USER_DETAILS_SELECT);
        sqlx::query_as(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Public profile lookup: unknown and deactivated accounts both read as
    /// missing from the outside.
    pub async fn get_public_profile(&self, username: &str) -> Result<UserDetails, ServiceError> {
        let query = format!("{} WHERE u.username = $1 AND u.is_active", USER_DETAILS_SELECT);
        sqlx::query_as(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Profile not found".to_string()))
    }

    /// Update own profile fields
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        bio: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<UserDetails, ServiceError> {
        sqlx::query(
            r#"
            UPDATE users
            SET bio = COALESCE($2, bio),
                avatar_url = COALESCE($3, avatar_url),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(bio)
        .bind(avatar_url)
        .execute(&self.pool)
        .await?;

        self.get_details(user_id).await
    }
}

pub fn validate_username(username: &str) -> Result<(), ServiceError> {
    let valid = (3..=20).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ServiceError::Validation(
            "Username must be 3-20 characters of letters, digits, or underscores".to_string(),
        ))
    }
}

pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ServiceError::Validation("Invalid email address".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("selin_k").is_ok());
        assert!(validate_username("ab").is_err()); // too short
        assert!(validate_username(&"a".repeat(21)).is_err()); // too long
        assert!(validate_username("has space").is_err());
        assert!(validate_username("dash-ed").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@b.co").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("a b@c.co").is_err());
    }
}

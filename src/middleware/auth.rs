use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::error::ApiError;

/// Cookie carrying the session token for browser page flows; API clients use
/// the Authorization header instead.
pub const SESSION_COOKIE: &str = "gardrop_token";

/// Authenticated user context extracted from a verified JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == crate::database::models::UserRole::ADMIN
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// JWT authentication middleware for `/api` routes: validates the token and
/// injects `AuthUser` into request extensions.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers).ok_or_else(|| {
        ApiError::unauthorized("Missing session token")
    })?;

    let claims = auth::verify_jwt(&token)?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Requires an already-authenticated admin; layered after `jwt_auth_middleware`
/// on `/api/admin` routes.
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.is_admin())
        .unwrap_or(false);

    if !is_admin {
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}

/// Token lookup order: Authorization bearer first, then the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            if !token.trim().is_empty() {
                return Some(token.trim().to_string());
            }
        }
    }

    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn bearer_token_wins_over_cookie() {
        let map = headers(&[
            ("authorization", "Bearer abc123"),
            ("cookie", "gardrop_token=cookie-token"),
        ]);
        assert_eq!(extract_token(&map).as_deref(), Some("abc123"));
    }

    #[test]
    fn cookie_token_used_when_no_header() {
        let map = headers(&[("cookie", "theme=dark; gardrop_token=tok; lang=tr")]);
        assert_eq!(extract_token(&map).as_deref(), Some("tok"));
    }

    #[test]
    fn empty_or_missing_tokens_yield_none() {
        assert_eq!(extract_token(&headers(&[])), None);
        assert_eq!(extract_token(&headers(&[("authorization", "Bearer ")])), None);
        assert_eq!(extract_token(&headers(&[("cookie", "gardrop_token=")])), None);
    }
}

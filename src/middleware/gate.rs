use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde_json::json;

use crate::auth::{self, Claims};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::extract_token;
use crate::services::quota_service::{LimitKind, QuotaService};

/// What the route gate decided for a request, before any handler runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// 303 redirect for browser page flows
    Redirect(String),
    /// JSON denial for API paths
    DenyJson { status: u16, message: String },
}

/// Access rules for page-style paths:
/// - unauthenticated `/dashboard*`, `/profile*`, `/settings*` (and `/admin*`)
///   redirect to `/login?redirectTo={path}`;
/// - authenticated `/login` and `/register` redirect to `/dashboard`;
/// - non-admin `/admin*` redirects to `/dashboard`.
pub fn decide_access(path: &str, user: Option<&Claims>) -> GateDecision {
    let is_protected = ["/dashboard", "/profile", "/settings"]
        .iter()
        .any(|route| path.starts_with(route));
    let is_admin_route = path.starts_with("/admin");
    let is_auth_route = path == "/login" || path == "/register";

    match user {
        None if is_protected || is_admin_route => {
            GateDecision::Redirect(format!("/login?redirectTo={}", path))
        }
        Some(_) if is_auth_route => GateDecision::Redirect("/dashboard".to_string()),
        Some(claims) if is_admin_route && !claims.is_admin() => {
            GateDecision::Redirect("/dashboard".to_string())
        }
        _ => GateDecision::Allow,
    }
}

/// Whether this request is about to create a post and must pass the post
/// quota: the new-post page, or a POST to the posts collection.
pub fn is_post_creation(path: &str, method: &Method) -> bool {
    path.starts_with("/dashboard/posts/new") || (path == "/api/posts" && method == Method::POST)
}

/// How to refuse an over-quota creation attempt: API paths get a 403 JSON
/// body, page paths a redirect to the upgrade page.
pub fn quota_denial(path: &str) -> GateDecision {
    if path.starts_with("/api/") {
        GateDecision::DenyJson {
            status: 403,
            message: "Post limit reached for your plan".to_string(),
        }
    } else {
        GateDecision::Redirect("/dashboard/upgrade?reason=post_limit".to_string())
    }
}

/// Route gate layered over the whole app. Mirrors the hosted variant's edge
/// middleware: auth redirects first, then the advisory post-quota check.
/// Creation handlers re-check the quota transactionally; this gate only
/// exists to fail fast before an image upload is attempted.
pub async fn route_gate_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    let user = extract_token(request.headers()).and_then(|token| auth::verify_jwt(&token).ok());

    match decide_access(&path, user.as_ref()) {
        GateDecision::Allow => {}
        decision => return Ok(decision.into_response()),
    }

    if let Some(claims) = &user {
        if is_post_creation(&path, &method) {
            let pool = DatabaseManager::pool().await?;
            let status = QuotaService::new(pool)
                .check_limit(claims.sub, LimitKind::Posts)
                .await?;
            if !status.allowed {
                return Ok(quota_denial(&path).into_response());
            }
        }
    }

    Ok(next.run(request).await)
}

impl IntoResponse for GateDecision {
    fn into_response(self) -> Response {
        match self {
            GateDecision::Allow => StatusCode::OK.into_response(),
            GateDecision::Redirect(target) => Redirect::to(&target).into_response(),
            GateDecision::DenyJson { status, message } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::FORBIDDEN),
                Json(json!({ "error": true, "message": message })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(role: &str) -> Claims {
        Claims::new(Uuid::new_v4(), "selin".to_string(), role.to_string())
    }

    #[test]
    fn unauthenticated_dashboard_redirects_to_login() {
        let decision = decide_access("/dashboard", None);
        assert_eq!(
            decision,
            GateDecision::Redirect("/login?redirectTo=/dashboard".to_string())
        );
    }

    #[test]
    fn nested_dashboard_paths_carry_redirect_target() {
        let decision = decide_access("/dashboard/posts/new", None);
        assert_eq!(
            decision,
            GateDecision::Redirect("/login?redirectTo=/dashboard/posts/new".to_string())
        );
    }

    #[test]
    fn authenticated_login_page_redirects_to_dashboard() {
        let user = claims("user");
        assert_eq!(
            decide_access("/login", Some(&user)),
            GateDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(
            decide_access("/register", Some(&user)),
            GateDecision::Redirect("/dashboard".to_string())
        );
    }

    #[test]
    fn non_admin_cannot_reach_admin_pages() {
        let user = claims("user");
        assert_eq!(
            decide_access("/admin", Some(&user)),
            GateDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(
            decide_access("/admin/users", Some(&user)),
            GateDecision::Redirect("/dashboard".to_string())
        );
    }

    #[test]
    fn admin_passes_admin_pages() {
        let admin = claims("admin");
        assert_eq!(decide_access("/admin", Some(&admin)), GateDecision::Allow);
        assert_eq!(decide_access("/admin/plans", Some(&admin)), GateDecision::Allow);
    }

    #[test]
    fn public_paths_are_open() {
        assert_eq!(decide_access("/", None), GateDecision::Allow);
        assert_eq!(decide_access("/selin", None), GateDecision::Allow);
        assert_eq!(decide_access("/login", None), GateDecision::Allow);
        assert_eq!(decide_access("/api/feed", None), GateDecision::Allow);
    }

    #[test]
    fn post_creation_paths() {
        assert!(is_post_creation("/dashboard/posts/new", &Method::GET));
        assert!(is_post_creation("/api/posts", &Method::POST));
        assert!(!is_post_creation("/api/posts", &Method::GET));
        // Product tagging has its own per-post quota, not the post quota
        assert!(!is_post_creation("/api/posts/123/products", &Method::POST));
        assert!(!is_post_creation("/dashboard", &Method::GET));
    }

    #[test]
    fn quota_denial_shape_depends_on_path() {
        assert_eq!(
            quota_denial("/api/posts"),
            GateDecision::DenyJson {
                status: 403,
                message: "Post limit reached for your plan".to_string()
            }
        );
        assert_eq!(
            quota_denial("/dashboard/posts/new"),
            GateDecision::Redirect("/dashboard/upgrade?reason=post_limit".to_string())
        );
    }
}

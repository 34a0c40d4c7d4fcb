use axum::{
    extract::{ConnectInfo, Path},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use uuid::Uuid;

use crate::auth;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::extract_token;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::click_service::{ClickService, ClickSource};

/// POST /api/products/:id/click - Record a click and return the affiliate URL
/// for the client to open. The insert is fire-and-forget: a failed write is
/// logged, never surfaced to the visitor.
pub async fn record(
    Path(product_id): Path<Uuid>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> ApiResult<Value> {
    let affiliate_url = resolve_and_record(product_id, &headers, addr).await?;
    Ok(ApiResponse::success(json!({ "affiliate_url": affiliate_url })))
}

/// GET /r/:id - Record a click and 302 to the affiliate URL. Server-side
/// rendition of "open the affiliate link in a new tab".
pub async fn redirect(
    Path(product_id): Path<Uuid>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let affiliate_url = resolve_and_record(product_id, &headers, addr).await?;
    Ok(found(&affiliate_url))
}

/// Plain 302 Found; `axum::response::Redirect` only offers 303/307/308
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

async fn resolve_and_record(
    product_id: Uuid,
    headers: &HeaderMap,
    addr: SocketAddr,
) -> Result<String, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let service = ClickService::new(pool.clone());

    let affiliate_url = service
        .affiliate_url(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let source = click_source(headers, addr);
    tokio::spawn(async move {
        if let Err(e) = ClickService::new(pool).record(product_id, source).await {
            tracing::warn!(product_id = %product_id, "Failed to record click: {}", e);
        }
    });

    Ok(affiliate_url)
}

/// Visitor context from the request: logged-in user if a valid token rode
/// along, client IP (X-Forwarded-For first), user agent, referrer.
fn click_source(headers: &HeaderMap, addr: SocketAddr) -> ClickSource {
    let user_id = extract_token(headers)
        .and_then(|token| auth::verify_jwt(&token).ok())
        .map(|claims| claims.sub);

    let ip_address = forwarded_for(headers).unwrap_or_else(|| addr.ip().to_string());

    ClickSource {
        user_id,
        ip_address: Some(ip_address),
        user_agent: header_string(headers, "user-agent"),
        referrer: header_string(headers, "referer"),
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn found_redirect_uses_302_with_location() {
        let res = found("https://example.com/p/1");
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("https://example.com/p/1")
        );
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(forwarded_for(&headers).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn click_source_falls_back_to_peer_addr() {
        let headers = HeaderMap::new();
        let addr: SocketAddr = "192.0.2.4:51000".parse().unwrap();
        let source = click_source(&headers, addr);
        assert_eq!(source.ip_address.as_deref(), Some("192.0.2.4"));
        assert_eq!(source.user_id, None);
    }
}

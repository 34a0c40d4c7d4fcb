mod common;

use anyhow::Result;
use reqwest::{redirect::Policy, StatusCode};

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("client")
}

#[tokio::test]
async fn unauthenticated_dashboard_redirects_to_login() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = no_redirect_client();

    let res = client
        .get(format!("{}/dashboard", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/login?redirectTo=/dashboard");
    Ok(())
}

#[tokio::test]
async fn unauthenticated_admin_redirects_to_login() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = no_redirect_client();

    let res = client
        .get(format!("{}/admin/users", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/login?redirectTo=/admin/users");
    Ok(())
}

#[tokio::test]
async fn protected_api_without_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/posts", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn product_creation_is_bound_on_the_nested_post_path() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!(
            "{}/api/posts/00000000-0000-0000-0000-000000000000/products",
            server.base_url
        ))
        .json(&serde_json::json!({
            "name": "Linen shirt",
            "affiliate_url": "https://example.com/p/1",
            "x_coordinate": 40.0,
            "y_coordinate": 60.0
        }))
        .send()
        .await?;

    // A 405 would mean create fell off the nested path; without a token the
    // auth layer answers before any database work
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn garbage_bearer_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .header("authorization", "Bearer not-a-jwt")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

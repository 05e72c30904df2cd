//! Sign-in, sign-out and the admin gate.

use backoffice_core::UserRole;
use backoffice_integration_tests::{PASSWORD, TestContext, json_body};
use serde_json::json;

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_admin_login_sets_cookie_and_check_succeeds() {
    let ctx = TestContext::new().await;
    ctx.create_user("Root", "root@example.com", UserRole::Admin)
        .await;

    let client = ctx.anonymous();
    let resp = client
        .post(ctx.api("/auth/login"))
        .json(&json!({ "email": "ROOT@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();

    let cookie = resp
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(cookie.starts_with("admin_token="));
    assert!(cookie.contains("HttpOnly"));

    let body = json_body(resp, 200).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], "root@example.com");
    assert!(body["user"].get("password_hash").is_none());

    let check = json_body(client.get(ctx.api("/auth/check")).send().await.unwrap(), 200).await;
    assert_eq!(check["authenticated"], true);
    assert_eq!(check["user"]["role"], "admin");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_login_rejections() {
    let ctx = TestContext::new().await;
    ctx.create_user("Shopper", "shopper@example.com", UserRole::User)
        .await;
    ctx.create_user("Root", "root@example.com", UserRole::Admin)
        .await;
    let client = ctx.anonymous();

    let login = |email: &'static str, password: &'static str| {
        client
            .post(ctx.api("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
    };

    let body = json_body(login("shopper@example.com", PASSWORD).await.unwrap(), 403).await;
    assert_eq!(body["message"], "Access denied. Admin privileges required.");

    let body = json_body(login("root@example.com", "wrong-password").await.unwrap(), 401).await;
    assert_eq!(body["message"], "Invalid email or password");

    let body = json_body(login("nobody@example.com", PASSWORD).await.unwrap(), 401).await;
    assert_eq!(body["message"], "Invalid email or password");

    let resp = client
        .post(ctx.api("/auth/login"))
        .json(&json!({ "email": "root@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_gate_rejects_missing_and_forged_tokens() {
    let ctx = TestContext::new().await;
    let client = ctx.anonymous();

    let body = json_body(client.get(ctx.api("/categories")).send().await.unwrap(), 401).await;
    assert_eq!(body["message"], "Unauthorized");

    let resp = client
        .post(ctx.api("/categories"))
        .header(reqwest::header::COOKIE, "admin_token=not.a.token")
        .json(&json!({ "name": "Shoes", "slug": "shoes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_demoted_admin_is_forbidden_immediately() {
    let ctx = TestContext::new().await;
    let (_, root) = ctx.admin_client().await;
    let other = ctx
        .create_user("Deputy", "deputy@example.com", UserRole::Admin)
        .await;
    let deputy = ctx.login("deputy@example.com").await;

    let resp = root
        .put(ctx.api(&format!("/users/{}", other.id)))
        .json(&json!({ "name": "Deputy", "email": "deputy@example.com", "role": "user" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The deputy's token is still valid, but the role is re-read per request.
    let body = json_body(deputy.get(ctx.api("/brands")).send().await.unwrap(), 403).await;
    assert_eq!(body["message"], "Forbidden");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_logout_clears_session() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    let body = json_body(client.post(ctx.api("/auth/logout")).send().await.unwrap(), 200).await;
    assert!(body["message"].is_string());

    let resp = client.get(ctx.api("/auth/check")).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    ctx.cleanup().await;
}

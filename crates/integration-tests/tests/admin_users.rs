//! User management and last-admin protection.

use backoffice_admin::db::UserRepository;
use backoffice_core::UserRole;
use backoffice_integration_tests::{TestContext, json_body};
use serde_json::json;

async fn admin_count(ctx: &TestContext) -> i64 {
    UserRepository::new(&ctx.pool).count_admins().await.unwrap()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_sole_admin_cannot_be_demoted() {
    let ctx = TestContext::new().await;
    let (admin, client) = ctx.admin_client().await;

    let resp = client
        .put(ctx.api(&format!("/users/{}", admin.id)))
        .json(&json!({ "name": "Admin", "email": admin.email.as_str(), "role": "user" }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 400).await;
    assert_eq!(body["message"], "Cannot change the role of the last admin user");
    assert_eq!(admin_count(&ctx).await, 1);

    // Keeping the role is fine.
    let resp = client
        .put(ctx.api(&format!("/users/{}", admin.id)))
        .json(&json!({ "name": "Renamed", "email": admin.email.as_str() }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 200).await;
    assert_eq!(body["user"]["name"], "Renamed");
    assert_eq!(body["user"]["role"], "admin");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_admins_cannot_be_deleted() {
    let ctx = TestContext::new().await;
    let (admin, client) = ctx.admin_client().await;
    let shopper = ctx
        .create_user("Shopper", "shopper@example.com", UserRole::User)
        .await;

    let resp = client
        .delete(ctx.api(&format!("/users/{}", admin.id)))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 400).await;
    assert_eq!(body["message"], "Cannot delete an admin user");
    assert_eq!(admin_count(&ctx).await, 1);

    let resp = client
        .delete(ctx.api(&format!("/users/{}", shopper.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp, 200).await["message"], "User deleted successfully");

    let resp = client
        .delete(ctx.api(&format!("/users/{}", shopper.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp, 404).await["message"], "User not found");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_create_user_validation_and_duplicates() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    let create = |body: serde_json::Value| client.post(ctx.api("/users")).json(&body).send();

    let body = json_body(
        create(json!({ "name": "Ada", "email": "ada@example.com", "password": "analytical" }))
            .await
            .unwrap(),
        201,
    )
    .await;
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());

    let body = json_body(
        create(json!({ "name": "Ada 2", "email": "ADA@example.com", "password": "analytical" }))
            .await
            .unwrap(),
        400,
    )
    .await;
    assert_eq!(body["message"], "A user with this email already exists");

    let body = json_body(
        create(json!({ "name": "Bob", "email": "bob@example.com", "password": "short" }))
            .await
            .unwrap(),
        400,
    )
    .await;
    assert_eq!(body["message"], "Password must be at least 8 characters");

    let body = json_body(create(json!({ "name": "Bob" })).await.unwrap(), 400).await;
    assert_eq!(body["message"], "Name, email, and password are required");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_second_admin_can_be_demoted() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;
    let deputy = ctx
        .create_user("Deputy", "deputy@example.com", UserRole::Admin)
        .await;

    let resp = client
        .put(ctx.api(&format!("/users/{}", deputy.id)))
        .json(&json!({ "name": "Deputy", "email": "deputy@example.com", "role": "user" }))
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp, 200).await["user"]["role"], "user");
    assert_eq!(admin_count(&ctx).await, 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_update_of_missing_user_is_not_found_even_with_taken_email() {
    let ctx = TestContext::new().await;
    let (admin, client) = ctx.admin_client().await;

    for role in [None, Some("user")] {
        let mut payload = json!({ "name": "Ghost", "email": admin.email.as_str() });
        if let Some(role) = role {
            payload["role"] = json!(role);
        }
        let resp = client
            .put(ctx.api("/users/99999"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(json_body(resp, 404).await["message"], "User not found");
    }
    assert_eq!(admin_count(&ctx).await, 1);

    ctx.cleanup().await;
}

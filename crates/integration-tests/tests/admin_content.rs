//! Pages and blogs.

use backoffice_integration_tests::{TestContext, json_body};
use serde_json::json;

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_page_status_defaults_and_is_kept() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    let body = json_body(
        client
            .post(ctx.api("/pages"))
            .json(&json!({ "title": "About", "slug": "about" }))
            .send()
            .await
            .unwrap(),
        201,
    )
    .await;
    let page = &body["page"];
    assert_eq!(page["status"], "draft");

    let resp = client
        .put(ctx.api(&format!("/pages/{}", page["id"])))
        .json(&json!({ "title": "About", "slug": "about", "status": "published" }))
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp, 200).await["page"]["status"], "published");

    let resp = client
        .put(ctx.api(&format!("/pages/{}", page["id"])))
        .json(&json!({ "title": "About us", "slug": "about" }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 200).await;
    assert_eq!(body["page"]["status"], "published");
    assert_eq!(body["page"]["title"], "About us");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_blog_author_defaults_to_current_admin() {
    let ctx = TestContext::new().await;
    let (admin, client) = ctx.admin_client().await;

    let body = json_body(
        client
            .post(ctx.api("/blogs"))
            .json(&json!({ "title": "Hello", "slug": "hello", "content": "First post" }))
            .send()
            .await
            .unwrap(),
        201,
    )
    .await;
    assert_eq!(body["blog"]["author_id"], admin.id.as_i32());
    assert_eq!(body["blog"]["author_name"], "Admin");

    let resp = client
        .post(ctx.api("/blogs"))
        .json(&json!({ "title": "Ghost", "slug": "ghost", "author_id": 99999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(
        json_body(resp, 400).await["message"],
        "Referenced author does not exist"
    );

    let list = json_body(
        client.get(ctx.api("/blogs?search=first")).send().await.unwrap(),
        200,
    )
    .await;
    assert_eq!(list["total"], 1);

    ctx.cleanup().await;
}

//! Brands, categories and products: uniqueness, reference guards, listing,
//! input bounds and the upload flow.

use backoffice_integration_tests::{TestContext, json_body};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

async fn create_category(ctx: &TestContext, client: &reqwest::Client, slug: &str) -> Value {
    let resp = client
        .post(ctx.api("/categories"))
        .json(&json!({ "name": slug.to_uppercase(), "slug": slug }))
        .send()
        .await
        .unwrap();
    json_body(resp, 201).await["category"].clone()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_duplicate_category_slug_is_rejected() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    let first = create_category(&ctx, &client, "shoes").await;
    assert_eq!(first["slug"], "shoes");

    let resp = client
        .post(ctx.api("/categories"))
        .json(&json!({ "name": "Other Shoes", "slug": "shoes" }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 400).await;
    assert_eq!(body["message"], "A category with this slug already exists");

    let other = create_category(&ctx, &client, "hats").await;
    let resp = client
        .put(ctx.api(&format!("/categories/{}", other["id"])))
        .json(&json!({ "name": "Hats", "slug": "shoes" }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 400).await;
    assert_eq!(body["message"], "A different category with this slug already exists");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE slug = 'shoes'")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_referenced_category_and_brand_cannot_be_deleted() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    let category = create_category(&ctx, &client, "shoes").await;
    let brand = json_body(
        client
            .post(ctx.api("/brands"))
            .multipart(Form::new().text("name", "Acme").text("slug", "acme"))
            .send()
            .await
            .unwrap(),
        201,
    )
    .await["brand"]
        .clone();

    let form = Form::new()
        .text("name", "Trail Shoe")
        .text("slug", "trail-shoe")
        .text("price", "59.90")
        .text("stock", "3")
        .text("category_id", category["id"].to_string())
        .text("brand_id", brand["id"].to_string());
    let product = json_body(
        client.post(ctx.api("/products")).multipart(form).send().await.unwrap(),
        201,
    )
    .await["product"]
        .clone();
    assert_eq!(product["category_name"], "SHOES");
    assert_eq!(product["brand_name"], "Acme");
    assert_eq!(product["price"], "59.90");

    let resp = client
        .delete(ctx.api(&format!("/categories/{}", category["id"])))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 400).await;
    assert_eq!(body["message"], "Cannot delete category because it is used by products");

    let resp = client
        .delete(ctx.api(&format!("/brands/{}", brand["id"])))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 400).await;
    assert_eq!(body["message"], "Cannot delete brand because it is used by products");

    // Both survive, and become deletable once the product is gone.
    let resp = client
        .delete(ctx.api(&format!("/products/{}", product["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let resp = client
        .delete(ctx.api(&format!("/categories/{}", category["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_product_with_unknown_reference_is_rejected() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    let form = Form::new()
        .text("name", "Ghost")
        .text("slug", "ghost")
        .text("price", "1")
        .text("category_id", "9999");
    let body = json_body(
        client.post(ctx.api("/products")).multipart(form).send().await.unwrap(),
        400,
    )
    .await;
    assert_eq!(body["message"], "Referenced category or brand does not exist");

    let form = Form::new().text("name", "Ghost").text("slug", "ghost").text("price", "-2");
    let body = json_body(
        client.post(ctx.api("/products")).multipart(form).send().await.unwrap(),
        400,
    )
    .await;
    assert_eq!(body["message"], "Price must be a non-negative number");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_pagination_and_search() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    for i in 1..=23 {
        let slug = if i % 5 == 0 { format!("boot-{i}") } else { format!("misc-{i}") };
        create_category(&ctx, &client, &slug).await;
    }

    let page = |query: &'static str| {
        let client = client.clone();
        let url = ctx.api(&format!("/categories?{query}"));
        async move { json_body(client.get(url).send().await.unwrap(), 200).await }
    };

    let first = page("limit=10").await;
    assert_eq!(first["total"], 23);
    assert_eq!(first["totalPages"], 3);
    assert_eq!(first["page"], 1);
    assert_eq!(first["items"].as_array().unwrap().len(), 10);

    let last = page("limit=10&page=3").await;
    assert_eq!(last["items"].as_array().unwrap().len(), 3);

    let beyond = page("limit=10&page=9").await;
    assert_eq!(beyond["items"].as_array().unwrap().len(), 0);
    assert_eq!(beyond["total"], 23);

    let found = page("search=BOOT&limit=100").await;
    let items = found["items"].as_array().unwrap();
    assert_eq!(found["total"], 4);
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|c| c["name"].as_str().unwrap().contains("BOOT")));

    // Wildcards are literal.
    let none = page("search=%25&limit=100").await;
    assert_eq!(none["total"], 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_brand_icon_upload_lifecycle() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    let form = Form::new()
        .text("name", "Acme")
        .text("slug", "acme")
        .part("file", Part::bytes(b"first-icon".to_vec()).file_name("logo one.png"));
    let brand = json_body(
        client.post(ctx.api("/brands")).multipart(form).send().await.unwrap(),
        201,
    )
    .await["brand"]
        .clone();

    let first_icon = brand["icon"].as_str().unwrap().to_owned();
    assert!(first_icon.ends_with("_logo_one.png"));
    let first_path = ctx.upload_dir().join("brand-icons").join(&first_icon);
    assert!(first_path.exists());

    let served = client
        .get(format!("{}/uploads/brand-icons/{first_icon}", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(&served.bytes().await.unwrap()[..], b"first-icon");

    // An update without a file keeps the icon.
    let resp = client
        .put(ctx.api(&format!("/brands/{}", brand["id"])))
        .multipart(Form::new().text("name", "Acme Inc").text("slug", "acme"))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 200).await;
    assert_eq!(body["brand"]["icon"], first_icon.as_str());

    // A new file replaces and removes the old one.
    let form = Form::new()
        .text("name", "Acme Inc")
        .text("slug", "acme")
        .part("file", Part::bytes(b"second-icon".to_vec()).file_name("logo.png"));
    let body = json_body(
        client
            .put(ctx.api(&format!("/brands/{}", brand["id"])))
            .multipart(form)
            .send()
            .await
            .unwrap(),
        200,
    )
    .await;
    let second_icon = body["brand"]["icon"].as_str().unwrap().to_owned();
    assert_ne!(second_icon, first_icon);
    assert!(!first_path.exists());

    let resp = client
        .delete(ctx.api(&format!("/brands/{}", brand["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp, 200).await["message"], "Brand deleted successfully");
    assert!(!ctx.upload_dir().join("brand-icons").join(&second_icon).exists());

    let resp = client
        .get(ctx.api(&format!("/brands/{}", brand["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp, 404).await["message"], "Brand not found");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_non_numeric_id_is_bad_request() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    let resp = client.get(ctx.api("/products/abc")).send().await.unwrap();
    assert_eq!(resp.status(), 400);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_update_of_missing_row_is_not_found_even_with_taken_slug() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    create_category(&ctx, &client, "shoes").await;

    let resp = client
        .put(ctx.api("/categories/99999"))
        .json(&json!({ "name": "X", "slug": "shoes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp, 404).await["message"], "Category not found");

    let product = Form::new()
        .text("name", "Trail Shoe")
        .text("slug", "trail-shoe")
        .text("price", "10");
    json_body(
        client.post(ctx.api("/products")).multipart(product).send().await.unwrap(),
        201,
    )
    .await;

    let form = Form::new()
        .text("name", "Other")
        .text("slug", "trail-shoe")
        .text("price", "10");
    let resp = client
        .put(ctx.api("/products/99999"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(json_body(resp, 404).await["message"], "Product not found");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_values_too_large_for_their_columns_are_bad_requests() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    let resp = client
        .post(ctx.api("/categories"))
        .json(&json!({ "name": "a".repeat(300), "slug": "long" }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp, 400).await;
    assert_eq!(body["message"], "Name must be at most 255 characters");

    let form = Form::new()
        .text("name", "Gold Shoe")
        .text("slug", "gold-shoe")
        .text("price", "1000000000");
    let resp = client.post(ctx.api("/products")).multipart(form).send().await.unwrap();
    let body = json_body(resp, 400).await;
    assert_eq!(body["message"], "Price must be less than 100000000");

    let count: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM categories) + (SELECT COUNT(*) FROM products)",
    )
    .fetch_one(&ctx.pool)
    .await
    .unwrap();
    assert_eq!(count, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_failed_icon_write_stores_no_brand() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    // A plain file where the folder should be makes every icon write fail.
    std::fs::write(ctx.upload_dir().join("brand-icons"), b"not a directory").unwrap();

    let form = Form::new()
        .text("name", "Acme")
        .text("slug", "acme")
        .part("file", Part::bytes(b"icon".to_vec()).file_name("logo.png"));
    let resp = client.post(ctx.api("/brands")).multipart(form).send().await.unwrap();
    let body = json_body(resp, 500).await;
    assert_eq!(body["message"], "Internal server error");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brands")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set TEST_DATABASE_URL)"]
async fn test_rejected_row_write_removes_stored_upload() {
    let ctx = TestContext::new().await;
    let (_, client) = ctx.admin_client().await;

    json_body(
        client
            .post(ctx.api("/brands"))
            .multipart(Form::new().text("name", "Acme").text("slug", "acme"))
            .send()
            .await
            .unwrap(),
        201,
    )
    .await;

    let form = Form::new()
        .text("name", "Acme Again")
        .text("slug", "acme")
        .part("file", Part::bytes(b"icon".to_vec()).file_name("logo.png"));
    let resp = client.post(ctx.api("/brands")).multipart(form).send().await.unwrap();
    let body = json_body(resp, 400).await;
    assert_eq!(body["message"], "A brand with this slug already exists");

    let form = Form::new()
        .text("name", "Trail Shoe")
        .text("slug", "trail-shoe")
        .text("price", "10")
        .text("category_id", "99999")
        .part("file", Part::bytes(b"image".to_vec()).file_name("shoe.jpg"));
    let resp = client.post(ctx.api("/products")).multipart(form).send().await.unwrap();
    assert_eq!(resp.status(), 400);

    for folder in ["brand-icons", "product-images"] {
        let dir = ctx.upload_dir().join(folder);
        let leftover = std::fs::read_dir(&dir).map_or(0, Iterator::count);
        assert_eq!(leftover, 0, "orphaned files in {folder}");
    }

    ctx.cleanup().await;
}

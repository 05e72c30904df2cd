//! Product handlers. Multipart, with an optional image upload.

use std::str::FromStr;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing::instrument;

use backoffice_core::{BrandId, CategoryId, ProductId};

use super::{bounded, discard_upload, message, not_found, parse_slug};
use crate::db::listing::ListQuery;
use crate::db::{ListParams, Paginated, ProductRepository};
use crate::error::AppError;
use crate::extract::{AppPath, AppQuery, FormData};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductInput};
use crate::services::UploadFolder;
use crate::state::AppState;

const NOT_FOUND: &str = "Product not found";

/// `NUMERIC(10, 2)` holds values below 10^8.
const PRICE_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/{id}", get(show).put(update).delete(destroy))
}

/// Validate the text fields of a product form. The image is handled separately.
fn product_input(form: &FormData) -> Result<ProductInput, AppError> {
    let (Some(name), Some(slug), Some(price)) =
        (form.text("name"), form.text("slug"), form.text("price"))
    else {
        return Err(AppError::bad_request("Name, slug, and price are required"));
    };

    let price = Decimal::from_str(price)
        .ok()
        .filter(|p| *p >= Decimal::ZERO)
        .ok_or_else(|| AppError::bad_request("Price must be a non-negative number"))?
        .round_dp(2);
    if price >= PRICE_LIMIT {
        return Err(AppError::bad_request("Price must be less than 100000000"));
    }

    let stock = match form.text("stock") {
        None => 0,
        Some(s) => s
            .parse::<i32>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| AppError::bad_request("Stock must be a non-negative integer"))?,
    };

    Ok(ProductInput {
        name: bounded("Name", name)?.to_owned(),
        slug: parse_slug(slug)?,
        description: form.text_owned("description"),
        price,
        stock,
        category_id: optional_id::<CategoryId>(form, "category_id")?,
        brand_id: optional_id::<BrandId>(form, "brand_id")?,
        image_url: None,
    })
}

/// A blank id field means no reference.
fn optional_id<T: FromStr>(form: &FormData, field: &str) -> Result<Option<T>, AppError> {
    form.text(field)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| AppError::bad_request(format!("Invalid {field}")))
        })
        .transpose()
}

#[instrument(skip(_admin, state))]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Paginated<Product>>, AppError> {
    let params = ListParams::from(query);
    Ok(Json(ProductRepository::new(state.pool()).list(&params).await?))
}

#[instrument(skip(_admin, state))]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<ProductId>,
) -> Result<Json<Product>, AppError> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

#[instrument(skip(admin, state, form))]
async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut input = product_input(&form)?;
    input.image_url = state
        .uploads()
        .save(UploadFolder::ProductImages, form.take_file())
        .await?;

    let product = match ProductRepository::new(state.pool()).create(&input).await {
        Ok(product) => product,
        Err(e) => {
            discard_upload(&state, UploadFolder::ProductImages, input.image_url.as_deref()).await;
            return Err(e.into());
        }
    };

    tracing::info!(product_id = %product.id, admin_id = %admin.id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product created successfully", "product": product })),
    ))
}

#[instrument(skip(admin, state, form))]
async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<ProductId>,
    mut form: FormData,
) -> Result<Json<Value>, AppError> {
    let mut input = product_input(&form)?;
    input.image_url = state
        .uploads()
        .save(UploadFolder::ProductImages, form.take_file())
        .await?;

    let (product, replaced) = match ProductRepository::new(state.pool()).update(id, &input).await {
        Ok(updated) => updated,
        Err(e) => {
            discard_upload(&state, UploadFolder::ProductImages, input.image_url.as_deref()).await;
            return Err(not_found(NOT_FOUND)(e));
        }
    };
    discard_upload(&state, UploadFolder::ProductImages, replaced.as_deref()).await;

    tracing::info!(product_id = %product.id, admin_id = %admin.id, "Product updated");
    Ok(Json(json!({ "message": "Product updated successfully", "product": product })))
}

#[instrument(skip(admin, state))]
async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<ProductId>,
) -> Result<Json<Value>, AppError> {
    let image = ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found(NOT_FOUND))?;
    discard_upload(&state, UploadFolder::ProductImages, image.as_deref()).await;

    tracing::info!(product_id = %id, admin_id = %admin.id, "Product deleted");
    Ok(message("Product deleted successfully"))
}

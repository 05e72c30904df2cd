//! Brand handlers. Multipart, with an optional icon upload.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde_json::{Value, json};
use tracing::instrument;

use backoffice_core::BrandId;

use super::{bounded, discard_upload, message, not_found, parse_slug};
use crate::db::listing::ListQuery;
use crate::db::{BrandRepository, ListParams, Paginated};
use crate::error::AppError;
use crate::extract::{AppPath, AppQuery, FormData};
use crate::middleware::RequireAdmin;
use crate::models::{Brand, BrandInput};
use crate::services::UploadFolder;
use crate::state::AppState;

const NOT_FOUND: &str = "Brand not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/brands", get(list).post(create))
        .route("/brands/{id}", get(show).put(update).delete(destroy))
}

/// Validate the text fields of a brand form. The icon is handled separately.
fn brand_input(form: &FormData) -> Result<BrandInput, AppError> {
    let (Some(name), Some(slug)) = (form.text("name"), form.text("slug")) else {
        return Err(AppError::bad_request("Name and slug are required"));
    };

    Ok(BrandInput {
        name: bounded("Name", name)?.to_owned(),
        slug: parse_slug(slug)?,
        description: form.text_owned("description"),
        domain: form
            .text_owned("domain")
            .map(|d| bounded("Domain", d))
            .transpose()?,
        brand_url: form.text_owned("brand_url"),
        icon: None,
    })
}

#[instrument(skip(_admin, state))]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Paginated<Brand>>, AppError> {
    let params = ListParams::from(query);
    Ok(Json(BrandRepository::new(state.pool()).list(&params).await?))
}

#[instrument(skip(_admin, state))]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<BrandId>,
) -> Result<Json<Brand>, AppError> {
    BrandRepository::new(state.pool())
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
    let mut input = brand_input(&form)?;
    input.icon = state
        .uploads()
        .save(UploadFolder::BrandIcons, form.take_file())
        .await?;

    let brand = match BrandRepository::new(state.pool()).create(&input).await {
        Ok(brand) => brand,
        Err(e) => {
            discard_upload(&state, UploadFolder::BrandIcons, input.icon.as_deref()).await;
            return Err(e.into());
        }
    };

    tracing::info!(brand_id = %brand.id, admin_id = %admin.id, "Brand created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Brand created successfully", "brand": brand })),
    ))
}

#[instrument(skip(admin, state, form))]
async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<BrandId>,
    mut form: FormData,
) -> Result<Json<Value>, AppError> {
    let mut input = brand_input(&form)?;
    input.icon = state
        .uploads()
        .save(UploadFolder::BrandIcons, form.take_file())
        .await?;

    let (brand, replaced) = match BrandRepository::new(state.pool()).update(id, &input).await {
        Ok(updated) => updated,
        Err(e) => {
            discard_upload(&state, UploadFolder::BrandIcons, input.icon.as_deref()).await;
            return Err(not_found(NOT_FOUND)(e));
        }
    };
    discard_upload(&state, UploadFolder::BrandIcons, replaced.as_deref()).await;

    tracing::info!(brand_id = %brand.id, admin_id = %admin.id, "Brand updated");
    Ok(Json(json!({ "message": "Brand updated successfully", "brand": brand })))
}

#[instrument(skip(admin, state))]
async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<BrandId>,
) -> Result<Json<Value>, AppError> {
    let icon = BrandRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found(NOT_FOUND))?;
    discard_upload(&state, UploadFolder::BrandIcons, icon.as_deref()).await;

    tracing::info!(brand_id = %id, admin_id = %admin.id, "Brand deleted");
    Ok(message("Brand deleted successfully"))
}

//! Content page handlers.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use backoffice_core::{PageId, PageStatus};

use super::{bounded, message, not_found, parse_slug, trimmed};
use crate::db::listing::ListQuery;
use crate::db::{ListParams, PageRepository, Paginated};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Page, PageInput};
use crate::state::AppState;

const NOT_FOUND: &str = "Page not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pages", get(list).post(create))
        .route("/pages/{id}", get(show).put(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
struct PagePayload {
    title: Option<String>,
    slug: Option<String>,
    content: Option<String>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    status: Option<PageStatus>,
}

impl TryFrom<PagePayload> for PageInput {
    type Error = AppError;

    fn try_from(payload: PagePayload) -> Result<Self, Self::Error> {
        let (Some(title), Some(slug)) = (trimmed(payload.title), trimmed(payload.slug)) else {
            return Err(AppError::bad_request("Title and slug are required"));
        };

        Ok(Self {
            title: bounded("Title", title)?,
            slug: parse_slug(&slug)?,
            content: trimmed(payload.content),
            meta_title: trimmed(payload.meta_title)
                .map(|t| bounded("Meta title", t))
                .transpose()?,
            meta_description: trimmed(payload.meta_description),
            status: payload.status,
        })
    }
}

#[instrument(skip(_admin, state))]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Paginated<Page>>, AppError> {
    let params = ListParams::from(query);
    Ok(Json(PageRepository::new(state.pool()).list(&params).await?))
}

#[instrument(skip(_admin, state))]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<PageId>,
) -> Result<Json<Page>, AppError> {
    PageRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

#[instrument(skip(admin, state, payload))]
async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<PagePayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let input = PageInput::try_from(payload)?;
    let page = PageRepository::new(state.pool()).create(&input).await?;

    tracing::info!(page_id = %page.id, admin_id = %admin.id, "Page created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Page created successfully", "page": page })),
    ))
}

#[instrument(skip(admin, state, payload))]
async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<PageId>,
    AppJson(payload): AppJson<PagePayload>,
) -> Result<Json<Value>, AppError> {
    let input = PageInput::try_from(payload)?;
    let page = PageRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(page_id = %page.id, admin_id = %admin.id, "Page updated");
    Ok(Json(json!({ "message": "Page updated successfully", "page": page })))
}

#[instrument(skip(admin, state))]
async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<PageId>,
) -> Result<Json<Value>, AppError> {
    PageRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(page_id = %id, admin_id = %admin.id, "Page deleted");
    Ok(message("Page deleted successfully"))
}

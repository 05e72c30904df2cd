//! Category handlers.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use backoffice_core::CategoryId;

use super::{bounded, message, not_found, parse_slug, trimmed};
use crate::db::listing::ListQuery;
use crate::db::{CategoryRepository, ListParams, Paginated};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Category, CategoryInput};
use crate::state::AppState;

const NOT_FOUND: &str = "Category not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route("/categories/{id}", get(show).put(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
struct CategoryPayload {
    name: Option<String>,
    slug: Option<String>,
    description: Option<String>,
}

impl TryFrom<CategoryPayload> for CategoryInput {
    type Error = AppError;

    fn try_from(payload: CategoryPayload) -> Result<Self, Self::Error> {
        let (Some(name), Some(slug)) = (trimmed(payload.name), trimmed(payload.slug)) else {
            return Err(AppError::bad_request("Name and slug are required"));
        };

        Ok(Self {
            name: bounded("Name", name)?,
            slug: parse_slug(&slug)?,
            description: trimmed(payload.description),
        })
    }
}

#[instrument(skip(_admin, state))]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Paginated<Category>>, AppError> {
    let params = ListParams::from(query);
    Ok(Json(CategoryRepository::new(state.pool()).list(&params).await?))
}

#[instrument(skip(_admin, state))]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<CategoryId>,
) -> Result<Json<Category>, AppError> {
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

#[instrument(skip(admin, state))]
async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let input = CategoryInput::try_from(payload)?;
    let category = CategoryRepository::new(state.pool()).create(&input).await?;

    tracing::info!(category_id = %category.id, admin_id = %admin.id, "Category created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Category created successfully", "category": category })),
    ))
}

#[instrument(skip(admin, state))]
async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<CategoryId>,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<Json<Value>, AppError> {
    let input = CategoryInput::try_from(payload)?;
    let category = CategoryRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(category_id = %category.id, admin_id = %admin.id, "Category updated");
    Ok(Json(json!({ "message": "Category updated successfully", "category": category })))
}

#[instrument(skip(admin, state))]
async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<CategoryId>,
) -> Result<Json<Value>, AppError> {
    CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(category_id = %id, admin_id = %admin.id, "Category deleted");
    Ok(message("Category deleted successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(name: Option<&str>, slug: Option<&str>) -> CategoryPayload {
        CategoryPayload {
            name: name.map(str::to_owned),
            slug: slug.map(str::to_owned),
            description: Some("  ".to_owned()),
        }
    }

    #[test]
    fn test_missing_fields() {
        for p in [payload(None, Some("a")), payload(Some("A"), None), payload(Some(" "), Some("a"))] {
            let err = CategoryInput::try_from(p).unwrap_err();
            assert_eq!(err.to_string(), "Bad request: Name and slug are required");
        }
    }

    #[test]
    fn test_valid_payload() {
        let input = CategoryInput::try_from(payload(Some(" Shoes "), Some("shoes"))).unwrap();
        assert_eq!(input.name, "Shoes");
        assert_eq!(input.slug.as_str(), "shoes");
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_name_too_long() {
        let name = "a".repeat(300);
        let err = CategoryInput::try_from(payload(Some(name.as_str()), Some("long"))).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Name must be at most 255 characters");
    }
}

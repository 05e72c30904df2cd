//! Blog post handlers.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use backoffice_core::{BlogId, UserId};

use super::{bounded, message, not_found, parse_slug, trimmed};
use crate::db::listing::ListQuery;
use crate::db::{BlogRepository, ListParams, Paginated};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Blog, BlogInput};
use crate::state::AppState;

const NOT_FOUND: &str = "Blog not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list).post(create))
        .route("/blogs/{id}", get(show).put(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
struct BlogPayload {
    title: Option<String>,
    slug: Option<String>,
    content: Option<String>,
    author_id: Option<UserId>,
}

impl BlogPayload {
    /// Validate, crediting `fallback_author` when no author is given.
    fn into_input(self, fallback_author: UserId) -> Result<BlogInput, AppError> {
        let (Some(title), Some(slug)) = (trimmed(self.title), trimmed(self.slug)) else {
            return Err(AppError::bad_request("Title and slug are required"));
        };

        Ok(BlogInput {
            title: bounded("Title", title)?,
            slug: parse_slug(&slug)?,
            content: trimmed(self.content),
            author_id: self.author_id.unwrap_or(fallback_author),
        })
    }
}

#[instrument(skip(_admin, state))]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Paginated<Blog>>, AppError> {
    let params = ListParams::from(query);
    Ok(Json(BlogRepository::new(state.pool()).list(&params).await?))
}

#[instrument(skip(_admin, state))]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<BlogId>,
) -> Result<Json<Blog>, AppError> {
    BlogRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

#[instrument(skip(admin, state, payload))]
async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BlogPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let input = payload.into_input(admin.id)?;
    let blog = BlogRepository::new(state.pool()).create(&input).await?;

    tracing::info!(blog_id = %blog.id, admin_id = %admin.id, "Blog created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Blog created successfully", "blog": blog })),
    ))
}

#[instrument(skip(admin, state, payload))]
async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<BlogId>,
    AppJson(payload): AppJson<BlogPayload>,
) -> Result<Json<Value>, AppError> {
    let input = payload.into_input(admin.id)?;
    let blog = BlogRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(blog_id = %blog.id, admin_id = %admin.id, "Blog updated");
    Ok(Json(json!({ "message": "Blog updated successfully", "blog": blog })))
}

#[instrument(skip(admin, state))]
async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<BlogId>,
) -> Result<Json<Value>, AppError> {
    BlogRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(blog_id = %id, admin_id = %admin.id, "Blog deleted");
    Ok(message("Blog deleted successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> BlogPayload {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_author_defaults_to_admin() {
        let input = payload(json!({ "title": "Hello", "slug": "hello" }))
            .into_input(UserId::new(9))
            .unwrap();
        assert_eq!(input.author_id, UserId::new(9));

        let input = payload(json!({ "title": "Hello", "slug": "hello", "author_id": 3 }))
            .into_input(UserId::new(9))
            .unwrap();
        assert_eq!(input.author_id, UserId::new(3));
    }

    #[test]
    fn test_title_and_slug_required() {
        let err = payload(json!({ "slug": "hello" }))
            .into_input(UserId::new(1))
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Title and slug are required");
    }
}

//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (database ping)
//! GET  /uploads/{folder}/{file}        - Uploaded brand icons and product images
//!
//! # Auth (under /api)
//! POST /api/auth/login                 - Email/password sign-in, sets admin_token
//! POST /api/auth/logout                - Clears admin_token
//! GET  /api/auth/check                 - Current admin
//!
//! # Resources (under /api, admin only)
//! GET  /api/{resource}                 - Paginated list (?search=&page=&limit=)
//! POST /api/{resource}                 - Create
//! GET  /api/{resource}/{id}            - Fetch one
//! PUT  /api/{resource}/{id}            - Update
//! DELETE /api/{resource}/{id}          - Delete
//!
//!   resource = brands | categories | products | pages | blogs | users
//!
//! # Orders (under /api, admin only)
//! GET  /api/orders                     - List (?search=&status=&payment=&page=&limit=)
//! GET  /api/orders/{id}                - Order with line items
//! PUT  /api/orders/{id}                - Update status / payment status
//! ```
//!
//! Brands and products take `multipart/form-data` so an image can ride along;
//! everything else takes JSON.

use axum::{Json, Router, extract::DefaultBodyLimit};
use serde_json::{Value, json};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use backoffice_core::Slug;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::services::UploadFolder;
use crate::state::AppState;

pub mod auth;
pub mod blogs;
pub mod brands;
pub mod categories;
pub mod health;
pub mod orders;
pub mod pages;
pub mod products;
pub mod users;

/// Build the complete application router.
///
/// Sentry layers are added by the binary; everything else lives here so
/// integration tests serve exactly what production serves.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config().max_upload_bytes;
    let upload_root = state.uploads().root().to_path_buf();

    Router::new()
        .merge(health::router())
        .nest("/api", api())
        .nest_service("/uploads", ServeDir::new(upload_root))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

fn api() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(brands::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(pages::router())
        .merge(blogs::router())
        .merge(users::router())
        .merge(orders::router())
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Parse a slug field, mapping any failure to the client-facing message.
pub(crate) fn parse_slug(value: &str) -> Result<Slug, AppError> {
    Slug::parse(value).map_err(|_| {
        AppError::bad_request("Slug must contain only letters, numbers, hyphens and underscores")
    })
}

/// Longest value a `VARCHAR(255)` column holds, in characters.
const MAX_TEXT_CHARS: usize = 255;

/// Reject a value too long for its `VARCHAR(255)` column.
pub(crate) fn bounded<S: AsRef<str>>(label: &str, value: S) -> Result<S, AppError> {
    if value.as_ref().chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::bad_request(format!(
            "{label} must be at most {MAX_TEXT_CHARS} characters"
        )));
    }
    Ok(value)
}

/// Trim an optional JSON string, treating blank as absent.
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Map `RepositoryError::NotFound` to a 404 carrying `text`; other errors
/// convert as usual.
pub(crate) fn not_found(text: &'static str) -> impl FnOnce(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => AppError::NotFound(text.to_string()),
        other => other.into(),
    }
}

/// Remove a file stored earlier in a request whose row write then failed.
pub(crate) async fn discard_upload(state: &AppState, folder: UploadFolder, name: Option<&str>) {
    if let Some(name) = name {
        state.uploads().remove(folder, name).await;
    }
}

/// `{"message": text}`
pub(crate) fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

//! Sign-in, sign-out and session check.

use axum::{Json, Router, extract::State, routing::{get, post}};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::services::AuthService;
use crate::services::auth::{clear_cookie, session_cookie};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/check", get(check))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// Exchange email and password for the session cookie. Admins only.
#[instrument(skip(state, jar, body))]
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), AppError> {
    let email = body.email.as_deref().map(str::trim).unwrap_or_default();
    let password = body.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::bad_request("Email and password are required"));
    }

    let (user, token) = AuthService::new(state.pool(), state.tokens())
        .login(email, password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Login rejected"))?;

    tracing::info!(user_id = %user.id, "Admin signed in");

    let cookie = session_cookie(
        token,
        state.tokens().ttl(),
        state.config().secure_cookies(),
    );
    let user = CurrentUser::from(user);

    Ok((
        jar.add(cookie),
        Json(json!({ "message": "Login successful", "user": user })),
    ))
}

/// Clear the session cookie. Works without a valid session.
#[instrument(skip(state, jar))]
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.add(clear_cookie(state.config().secure_cookies()));
    (jar, Json(json!({ "message": "Logout successful" })))
}

/// Report the signed-in admin.
async fn check(RequireAdmin(user): RequireAdmin) -> Json<Value> {
    Json(json!({ "authenticated": true, "user": user }))
}

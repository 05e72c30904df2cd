//! Admin gate.
//!
//! Every `/api` handler except login and logout takes [`RequireAdmin`], so an
//! unauthenticated or non-admin request is rejected before the handler runs.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

use backoffice_core::{Email, UserId, UserRole};

use crate::error::AppError;
use crate::models::User;
use crate::services::authenticate;
use crate::state::AppState;

/// The signed-in user as exposed to handlers and `GET /api/auth/check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Extractor that requires a signed-in admin.
///
/// Rejects with 401 when the cookie is missing, the token does not verify, or
/// the user no longer exists, and with 403 when the user's current role is
/// not `admin`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(state, &parts.headers).await?;

        if !user.is_admin() {
            tracing::debug!(user_id = %user.id, "Non-admin rejected by admin gate");
            return Err(AppError::forbidden());
        }

        Ok(Self(user.into()))
    }
}

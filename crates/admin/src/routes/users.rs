//! User handlers.
//!
//! Passwords are hashed before they reach the repository and never leave it.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use backoffice_core::{Email, UserId, UserRole};

use super::{bounded, message, not_found, trimmed};
use crate::db::listing::ListQuery;
use crate::db::{ListParams, Paginated, UserRepository};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::RequireAdmin;
use crate::models::{NewUser, User, UserUpdate};
use crate::services::auth::{hash_password, validate_password};
use crate::state::AppState;

const NOT_FOUND: &str = "User not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/{id}", get(show).put(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<UserRole>,
}

fn parse_email(value: &str) -> Result<Email, AppError> {
    Email::parse(value).map_err(|_| AppError::bad_request("Invalid email address"))
}

/// Validate and hash a non-empty password.
fn new_password_hash(password: &str) -> Result<String, AppError> {
    validate_password(password)?;
    Ok(hash_password(password)?)
}

impl UserPayload {
    fn into_new_user(self) -> Result<NewUser, AppError> {
        let (Some(name), Some(email), Some(password)) = (
            trimmed(self.name),
            trimmed(self.email),
            self.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::bad_request(
                "Name, email, and password are required",
            ));
        };

        let email = parse_email(&email)?;
        Ok(NewUser {
            name: bounded("Name", name)?,
            email,
            password_hash: new_password_hash(&password)?,
            role: self.role.unwrap_or_default(),
        })
    }

    fn into_update(self) -> Result<UserUpdate, AppError> {
        let (Some(name), Some(email)) = (trimmed(self.name), trimmed(self.email)) else {
            return Err(AppError::bad_request("Name and email are required"));
        };

        let email = parse_email(&email)?;
        let password_hash = self
            .password
            .filter(|p| !p.is_empty())
            .map(|p| new_password_hash(&p))
            .transpose()?;

        Ok(UserUpdate {
            name: bounded("Name", name)?,
            email,
            password_hash,
            role: self.role,
        })
    }
}

#[instrument(skip(_admin, state))]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Paginated<User>>, AppError> {
    let params = ListParams::from(query);
    Ok(Json(UserRepository::new(state.pool()).list(&params).await?))
}

#[instrument(skip(_admin, state))]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<UserId>,
) -> Result<Json<User>, AppError> {
    UserRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

#[instrument(skip_all)]
async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let new_user = payload.into_new_user()?;
    let user = UserRepository::new(state.pool()).create(&new_user).await?;

    tracing::info!(user_id = %user.id, role = %user.role, admin_id = %admin.id, "User created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

#[instrument(skip_all, fields(user_id = %id))]
async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<UserId>,
    AppJson(payload): AppJson<UserPayload>,
) -> Result<Json<Value>, AppError> {
    let update = payload.into_update()?;
    let user = UserRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        password_changed = update.password_hash.is_some(),
        admin_id = %admin.id,
        "User updated"
    );
    Ok(Json(json!({ "message": "User updated successfully", "user": user })))
}

#[instrument(skip(admin, state))]
async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<UserId>,
) -> Result<Json<Value>, AppError> {
    UserRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found(NOT_FOUND))?;

    tracing::info!(user_id = %id, admin_id = %admin.id, "User deleted");
    Ok(message("User deleted successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::auth::verify_password;

    fn payload(json: serde_json::Value) -> UserPayload {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_create_requires_fields() {
        let err = payload(json!({ "name": "Ada", "email": "ada@example.com" }))
            .into_new_user()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: Name, email, and password are required"
        );
    }

    #[test]
    fn test_create_validates_email_and_password() {
        let err = payload(json!({ "name": "Ada", "email": "nope", "password": "longenough" }))
            .into_new_user()
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Invalid email address");

        let err = payload(json!({ "name": "Ada", "email": "ada@example.com", "password": "short" }))
            .into_new_user()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: Password must be at least 8 characters"
        );
    }

    #[test]
    fn test_create_hashes_and_defaults_role() {
        let user = payload(json!({
            "name": "Ada",
            "email": "Ada@Example.com",
            "password": "analytical-engine",
        }))
        .into_new_user()
        .unwrap();

        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.email.as_str(), "ada@example.com");
        assert!(verify_password("analytical-engine", &user.password_hash).is_ok());
    }

    #[test]
    fn test_update_keeps_password_and_role_when_omitted() {
        let update = payload(json!({ "name": "Ada", "email": "ada@example.com", "password": "" }))
            .into_update()
            .unwrap();

        assert!(update.password_hash.is_none());
        assert!(update.role.is_none());
    }

    #[test]
    fn test_update_requires_name_and_email() {
        let err = payload(json!({ "name": "Ada" })).into_update().unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Name and email are required");
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(serde_json::from_value::<UserPayload>(json!({ "role": "owner" })).is_err());
    }
}

//! User accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use backoffice_core::{Email, UserId, UserRole};

/// A user account. The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Validated input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    /// Argon2 PHC string, never the plaintext.
    pub password_hash: String,
    pub role: UserRole,
}

/// Validated input for updating a user.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub name: String,
    pub email: Email,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
}

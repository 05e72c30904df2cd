//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during sign-in and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Credentials are valid but the account is not an admin.
    #[error("account is not an admin")]
    NotAdmin,

    /// Password does not meet the minimum requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Argon2 failed to produce a hash.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token could not be issued or failed verification.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

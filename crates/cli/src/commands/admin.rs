//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! bo-cli admin create -e admin@example.com -n "Admin Name" -p 'a long password'
//! ```

use backoffice_admin::db::{RepositoryError, UserRepository};
use backoffice_admin::models::NewUser;
use backoffice_admin::services::AuthError;
use backoffice_admin::services::auth::{hash_password, validate_password};
use backoffice_core::{Email, UserId, UserRole};
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;

use super::{ConnectError, connect};

/// Length of generated passwords.
const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected or hashing failed.
    #[error("{0}")]
    Password(#[from] AuthError),

    /// User already exists, or the insert failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// A random alphanumeric password.
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

/// Create a new admin user.
///
/// When `password` is `None` a random one is generated and logged once.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create_user(
    email: &str,
    name: &str,
    password: Option<&str>,
) -> Result<UserId, AdminError> {
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;

    let (password, generated) = match password {
        Some(p) => (p.to_owned(), false),
        None => (generate_password(), true),
    };
    validate_password(&password)?;

    let new_user = NewUser {
        name: name.trim().to_owned(),
        email,
        password_hash: hash_password(&password)?,
        role: UserRole::Admin,
    };

    let pool = connect().await?;
    let user = UserRepository::new(&pool).create(&new_user).await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    if generated {
        tracing::warn!("Generated password (shown once): {password}");
    }

    pool.close().await;
    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_is_long_enough() {
        let password = generate_password();
        assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(validate_password(&password).is_ok());
        assert_ne!(password, generate_password());
    }
}

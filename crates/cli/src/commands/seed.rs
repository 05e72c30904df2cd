//! Seed the database with fake users for local development.

use backoffice_admin::db::{RepositoryError, UserRepository};
use backoffice_admin::models::NewUser;
use backoffice_admin::services::AuthError;
use backoffice_admin::services::auth::hash_password;
use backoffice_core::{Email, UserRole};
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use super::admin::generate_password;
use super::{ConnectError, connect};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Dennis", "Edsger", "Frances", "Grace", "John", "Katherine",
    "Linus", "Margaret", "Niklaus", "Radia", "Tim",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Berners-Lee", "Dijkstra", "Hamilton", "Hopper", "Johnson", "Knuth", "Liskov",
    "Lovelace", "McCarthy", "Perlman", "Shannon", "Turing", "Wirth",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("{0}")]
    Password(#[from] AuthError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("generated an invalid email: {0}")]
    InvalidEmail(String),
}

/// Name, email and role for one fake user; the password is hashed later.
#[derive(Debug)]
struct FakeUser {
    name: String,
    email: String,
    role: UserRole,
}

fn fake_user(rng: &mut impl Rng) -> FakeUser {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Ada");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Lovelace");
    let domain = DOMAINS.choose(rng).copied().unwrap_or("example.com");
    let suffix: u32 = rng.random_range(1000..100_000);

    FakeUser {
        name: format!("{first} {last}"),
        email: format!("{}.{}{suffix}@{domain}", first.to_lowercase(), last.to_lowercase()),
        role: if rng.random_bool(0.5) {
            UserRole::Admin
        } else {
            UserRole::User
        },
    }
}

/// Insert `count` fake users with random passwords and roles.
///
/// A generated email that collides with an existing user is skipped.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails for a
/// reason other than a duplicate email.
pub async fn users(count: u32) -> Result<(), SeedError> {
    let fakes: Vec<FakeUser> = {
        let mut rng = rand::rng();
        (0..count).map(|_| fake_user(&mut rng)).collect()
    };

    let pool = connect().await?;
    let repo = UserRepository::new(&pool);

    let mut inserted = 0_u32;
    for fake in fakes {
        let email =
            Email::parse(&fake.email).map_err(|_| SeedError::InvalidEmail(fake.email.clone()))?;
        let new_user = NewUser {
            name: fake.name,
            email,
            password_hash: hash_password(&generate_password())?,
            role: fake.role,
        };

        match repo.create(&new_user).await {
            Ok(user) => {
                inserted += 1;
                tracing::debug!(user_id = %user.id, role = %user.role, "Seeded user");
            }
            Err(RepositoryError::Conflict(_)) => {
                tracing::warn!(email = %new_user.email, "Skipping duplicate email");
            }
            Err(e) => return Err(e.into()),
        }
    }

    pool.close().await;
    tracing::info!("{inserted} fake users inserted successfully.");
    Ok(())
}

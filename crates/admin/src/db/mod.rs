//! Database operations for the admin `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts; only `admin` users may sign in
//! - `brands`, `categories`, `products` - Catalog
//! - `pages`, `blogs` - Content
//! - `orders`, `order_items` - Orders and line items
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p backoffice-cli -- migrate
//! ```
//!
//! Queries are built at runtime with `sqlx::query_as` and
//! [`sqlx::QueryBuilder`]; rows decode into per-repository structs.

pub mod blogs;
pub mod brands;
pub mod categories;
pub mod listing;
pub mod orders;
pub mod pages;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::{PgConnection, PgPool};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use blogs::BlogRepository;
pub use brands::BrandRepository;
pub use categories::CategoryRepository;
pub use listing::{ListParams, Paginated};
pub use orders::OrderRepository;
pub use pages::PageRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (slug, email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key violation (missing parent, or row still referenced).
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl RepositoryError {
    /// Map unique and foreign-key violations to resource-specific messages.
    ///
    /// `conflict` is used for `unique_violation`, `reference` for
    /// `foreign_key_violation`; anything else stays a database error.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str, reference: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return Self::InvalidReference(reference.to_string());
            }
        }
        Self::Database(err)
    }
}

/// Whether `table.column = value` exists on a row other than `except`.
///
/// Fast-path uniqueness check before a write; the unique constraint remains
/// the authority under concurrent writes.
pub(crate) async fn value_taken<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    table: &'static str,
    column: &'static str,
    value: &str,
    except: Option<i32>,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE {column} = $1 \
         AND ($2::INT4 IS NULL OR id <> $2))"
    );
    sqlx::query_scalar(&sql)
        .bind(value)
        .bind(except)
        .fetch_one(executor)
        .await
}

/// Lock row `id` of `table` until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the row does not exist.
pub(crate) async fn lock_row(
    conn: &mut PgConnection,
    table: &'static str,
    id: i32,
) -> Result<(), RepositoryError> {
    let sql = format!("SELECT id FROM {table} WHERE id = $1 FOR UPDATE");
    sqlx::query_scalar::<_, i32>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .map(drop)
        .ok_or(RepositoryError::NotFound)
}

/// Create a `PostgreSQL` connection pool.
///
/// Requests wait up to the acquire timeout for a free connection when all
/// `max_connections` are busy.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

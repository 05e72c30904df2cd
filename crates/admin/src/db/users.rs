//! User repository.
//!
//! Emails are stored normalized (see [`Email`]), so lookups and the unique
//! constraint are effectively case-insensitive.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use backoffice_core::{Email, UserId, UserRole};

use super::RepositoryError;
use super::listing::{ListParams, ListSpec, PagedQuery, Paginated};
use crate::models::{NewUser, User, UserUpdate};

const EMAIL_TAKEN: &str = "A user with this email already exists";
const EMAIL_TAKEN_BY_OTHER: &str = "A different user with this email already exists";
const LAST_ADMIN: &str = "Cannot change the role of the last admin user";
const ADMIN_DELETE: &str = "Cannot delete an admin user";

const LIST: ListSpec = ListSpec {
    columns: "id, name, email, role, created_at",
    from: "users",
    search_columns: &["name", "email"],
    order_by: "created_at DESC, id DESC",
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    role: UserRole,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user accounts.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated list, newest first, searchable by name and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<User>, RepositoryError> {
        PagedQuery::new(&LIST, params)
            .fetch::<UserRow>(self.pool)
            .await?
            .try_map(TryInto::try_into)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user and their password hash for sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            "SELECT id, name, email, role, created_at, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| Ok((row.user.try_into()?, row.password_hash)))
            .transpose()
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        if super::value_taken(self.pool, "users", "email", user.email.as_str(), None).await? {
            return Err(RepositoryError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, created_at
            ",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, EMAIL_TAKEN, EMAIL_TAKEN))?;

        row.try_into()
    }

    /// Update a user.
    ///
    /// Demoting an admin runs in a transaction that first locks every admin
    /// row, so two concurrent demotions cannot both see a second admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict` if the email belongs to another user
    /// or the update would leave no admin.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Admin rows are locked in id order before the target row.
        if update.role == Some(UserRole::User) {
            let admins: Vec<UserId> = sqlx::query_scalar(
                "SELECT id FROM users WHERE role = 'admin' ORDER BY id FOR UPDATE",
            )
            .fetch_all(&mut *tx)
            .await?;

            if admins.contains(&id) && admins.len() <= 1 {
                return Err(RepositoryError::Conflict(LAST_ADMIN.to_string()));
            }
        }

        super::lock_row(&mut *tx, "users", id.as_i32()).await?;

        if super::value_taken(
            &mut *tx,
            "users",
            "email",
            update.email.as_str(),
            Some(id.as_i32()),
        )
        .await?
        {
            return Err(RepositoryError::Conflict(EMAIL_TAKEN_BY_OTHER.to_string()));
        }

        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET name = $2,
                email = $3,
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role)
            WHERE id = $1
            RETURNING id, name, email, role, created_at
            ",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(update.password_hash.as_deref())
        .bind(update.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, EMAIL_TAKEN_BY_OTHER, EMAIL_TAKEN_BY_OTHER))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Delete a non-admin user.
    ///
    /// Their blogs and orders are kept with the author/user cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict` if the user is an admin.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let role: Option<UserRole> =
            sqlx::query_scalar("SELECT role FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        match role {
            None => return Err(RepositoryError::NotFound),
            Some(UserRole::Admin) => {
                return Err(RepositoryError::Conflict(ADMIN_DELETE.to_string()));
            }
            Some(UserRole::User) => {}
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Number of admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_admins(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use backoffice_core::{CategoryId, Slug};

use super::RepositoryError;
use super::listing::{ListParams, ListSpec, PagedQuery, Paginated};
use crate::models::{Category, CategoryInput};

const SLUG_TAKEN: &str = "A category with this slug already exists";
const SLUG_TAKEN_BY_OTHER: &str = "A different category with this slug already exists";
const IN_USE: &str = "Cannot delete category because it is used by products";

const COLUMNS: &str = "id, name, slug, description, created_at";

const LIST: ListSpec = ListSpec {
    columns: COLUMNS,
    from: "categories",
    search_columns: &["name", "description"],
    order_by: "id DESC",
};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    slug: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category slug in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            slug,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

/// Repository for product categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<Category>, RepositoryError> {
        PagedQuery::new(&LIST, params)
            .fetch::<CategoryRow>(self.pool)
            .await?
            .try_map(TryInto::try_into)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        if super::value_taken(self.pool, "categories", "slug", input.slug.as_str(), None).await? {
            return Err(RepositoryError::Conflict(SLUG_TAKEN.to_string()));
        }

        let sql = format!(
            "INSERT INTO categories (name, slug, description) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.description.as_deref())
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN, SLUG_TAKEN))?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if another category has the slug.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        super::lock_row(&mut *tx, "categories", id.as_i32()).await?;

        if super::value_taken(
            &mut *tx,
            "categories",
            "slug",
            input.slug.as_str(),
            Some(id.as_i32()),
        )
        .await?
        {
            return Err(RepositoryError::Conflict(SLUG_TAKEN_BY_OTHER.to_string()));
        }

        let sql = format!(
            "UPDATE categories SET name = $2, slug = $3, description = $4 WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.description.as_deref())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN_BY_OTHER, SLUG_TAKEN_BY_OTHER))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Delete a category no product references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::InvalidReference` if products use the category.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let in_use: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE category_id = c.id) \
             FROM categories c WHERE c.id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match in_use {
            None => return Err(RepositoryError::NotFound),
            Some(true) => return Err(RepositoryError::InvalidReference(IN_USE.to_string())),
            Some(false) => {}
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, IN_USE, IN_USE))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

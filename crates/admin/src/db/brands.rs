//! Brand repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use backoffice_core::{BrandId, Slug};

use super::RepositoryError;
use super::listing::{ListParams, ListSpec, PagedQuery, Paginated};
use crate::models::{Brand, BrandInput};

const SLUG_TAKEN: &str = "A brand with this slug already exists";
const SLUG_TAKEN_BY_OTHER: &str = "A different brand with this slug already exists";
const IN_USE: &str = "Cannot delete brand because it is used by products";

const COLUMNS: &str = "id, name, slug, description, domain, brand_url, icon, created_at";

const LIST: ListSpec = ListSpec {
    columns: COLUMNS,
    from: "brands",
    search_columns: &["name", "description"],
    order_by: "id DESC",
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct BrandRow {
    id: BrandId,
    name: String,
    slug: String,
    description: Option<String>,
    domain: Option<String>,
    brand_url: Option<String>,
    icon: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BrandRow> for Brand {
    type Error = RepositoryError;

    fn try_from(row: BrandRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid brand slug in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            slug,
            description: row.description,
            domain: row.domain,
            brand_url: row.brand_url,
            icon: row.icon,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for brands.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated list, searchable by name and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<Brand>, RepositoryError> {
        PagedQuery::new(&LIST, params)
            .fetch::<BrandRow>(self.pool)
            .await?
            .try_map(TryInto::try_into)
    }

    /// Get a brand by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BrandId) -> Result<Option<Brand>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM brands WHERE id = $1");
        let row = sqlx::query_as::<_, BrandRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &BrandInput) -> Result<Brand, RepositoryError> {
        if super::value_taken(self.pool, "brands", "slug", input.slug.as_str(), None).await? {
            return Err(RepositoryError::Conflict(SLUG_TAKEN.to_string()));
        }

        let sql = format!(
            "INSERT INTO brands (name, slug, description, domain, brand_url, icon) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, BrandRow>(&sql)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.description.as_deref())
            .bind(input.domain.as_deref())
            .bind(input.brand_url.as_deref())
            .bind(input.icon.as_deref())
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN, SLUG_TAKEN))?;

        row.try_into()
    }

    /// Update a brand, keeping the current icon when `input.icon` is `None`.
    ///
    /// Returns the updated brand and, when the icon was replaced, the file
    /// name of the previous icon so the caller can remove it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand does not exist.
    /// Returns `RepositoryError::Conflict` if another brand has the slug.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: BrandId,
        input: &BrandInput,
    ) -> Result<(Brand, Option<String>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT icon FROM brands WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let previous = previous.ok_or(RepositoryError::NotFound)?;

        if super::value_taken(
            &mut *tx,
            "brands",
            "slug",
            input.slug.as_str(),
            Some(id.as_i32()),
        )
        .await?
        {
            return Err(RepositoryError::Conflict(SLUG_TAKEN_BY_OTHER.to_string()));
        }

        let sql = format!(
            "UPDATE brands SET name = $2, slug = $3, description = $4, domain = $5, \
             brand_url = $6, icon = COALESCE($7, icon) WHERE id = $1 RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, BrandRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.description.as_deref())
            .bind(input.domain.as_deref())
            .bind(input.brand_url.as_deref())
            .bind(input.icon.as_deref())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN_BY_OTHER, SLUG_TAKEN_BY_OTHER))?;

        tx.commit().await?;

        let replaced = previous.filter(|old| input.icon.as_deref().is_some_and(|new| new != old));
        Ok((row.try_into()?, replaced))
    }

    /// Delete a brand no product references.
    ///
    /// Returns the icon file name, if any, for the caller to remove.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand does not exist.
    /// Returns `RepositoryError::InvalidReference` if products use the brand.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: BrandId) -> Result<Option<String>, RepositoryError> {
        let in_use: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE brand_id = b.id) FROM brands b WHERE b.id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match in_use {
            None => return Err(RepositoryError::NotFound),
            Some(true) => return Err(RepositoryError::InvalidReference(IN_USE.to_string())),
            Some(false) => {}
        }

        let icon: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM brands WHERE id = $1 RETURNING icon")
                .bind(id)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| RepositoryError::from_write(e, IN_USE, IN_USE))?;

        icon.ok_or(RepositoryError::NotFound)
    }
}

//! Content page repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use backoffice_core::{PageId, PageStatus, Slug};

use super::RepositoryError;
use super::listing::{ListParams, ListSpec, PagedQuery, Paginated};
use crate::models::{Page, PageInput};

const SLUG_TAKEN: &str = "A page with this slug already exists";
const SLUG_TAKEN_BY_OTHER: &str = "A different page with this slug already exists";

const COLUMNS: &str =
    "id, title, slug, content, meta_title, meta_description, status, created_at";

const LIST: ListSpec = ListSpec {
    columns: COLUMNS,
    from: "pages",
    search_columns: &["title", "slug", "content"],
    order_by: "created_at DESC, id DESC",
};

#[derive(Debug, sqlx::FromRow)]
struct PageRow {
    id: PageId,
    title: String,
    slug: String,
    content: Option<String>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    status: PageStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<PageRow> for Page {
    type Error = RepositoryError;

    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid page slug in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            title: row.title,
            slug,
            content: row.content,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

/// Repository for CMS pages.
pub struct PageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PageRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated list, newest first, searchable by title, slug and content.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<Page>, RepositoryError> {
        PagedQuery::new(&LIST, params)
            .fetch::<PageRow>(self.pool)
            .await?
            .try_map(TryInto::try_into)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PageId) -> Result<Option<Page>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM pages WHERE id = $1");
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &PageInput) -> Result<Page, RepositoryError> {
        if super::value_taken(self.pool, "pages", "slug", input.slug.as_str(), None).await? {
            return Err(RepositoryError::Conflict(SLUG_TAKEN.to_string()));
        }

        let sql = format!(
            "INSERT INTO pages (title, slug, content, meta_title, meta_description, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(input.content.as_deref())
            .bind(input.meta_title.as_deref())
            .bind(input.meta_description.as_deref())
            .bind(input.status.unwrap_or_default())
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN, SLUG_TAKEN))?;

        row.try_into()
    }

    /// Update a page. A `None` status keeps the stored one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the page does not exist.
    /// Returns `RepositoryError::Conflict` if another page has the slug.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: PageId,
        input: &PageInput,
    ) -> Result<Page, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        super::lock_row(&mut *tx, "pages", id.as_i32()).await?;

        if super::value_taken(
            &mut *tx,
            "pages",
            "slug",
            input.slug.as_str(),
            Some(id.as_i32()),
        )
        .await?
        {
            return Err(RepositoryError::Conflict(SLUG_TAKEN_BY_OTHER.to_string()));
        }

        let sql = format!(
            "UPDATE pages SET title = $2, slug = $3, content = $4, meta_title = $5, \
             meta_description = $6, status = COALESCE($7, status) WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(input.content.as_deref())
            .bind(input.meta_title.as_deref())
            .bind(input.meta_description.as_deref())
            .bind(input.status)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN_BY_OTHER, SLUG_TAKEN_BY_OTHER))?;

        tx.commit().await?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the page does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: PageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

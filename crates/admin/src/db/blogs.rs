//! Blog post repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use backoffice_core::{BlogId, Slug, UserId};

use super::RepositoryError;
use super::listing::{ListParams, ListSpec, PagedQuery, Paginated};
use crate::models::{Blog, BlogInput};

const SLUG_TAKEN: &str = "A blog with this slug already exists";
const SLUG_TAKEN_BY_OTHER: &str = "A different blog with this slug already exists";
const BAD_AUTHOR: &str = "Referenced author does not exist";

const COLUMNS: &str =
    "b.id, b.title, b.slug, b.content, b.author_id, u.name AS author_name, b.created_at";

const LIST: ListSpec = ListSpec {
    columns: COLUMNS,
    from: "blogs b LEFT JOIN users u ON b.author_id = u.id",
    search_columns: &["b.title", "b.content", "b.slug"],
    order_by: "b.created_at DESC, b.id DESC",
};

#[derive(Debug, sqlx::FromRow)]
struct BlogRow {
    id: BlogId,
    title: String,
    slug: String,
    content: Option<String>,
    author_id: Option<UserId>,
    author_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BlogRow> for Blog {
    type Error = RepositoryError;

    fn try_from(row: BlogRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid blog slug in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            title: row.title,
            slug,
            content: row.content,
            author_id: row.author_id,
            author_name: row.author_name,
            created_at: row.created_at,
        })
    }
}

/// Repository for blog posts.
pub struct BlogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated list with author names, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<Blog>, RepositoryError> {
        PagedQuery::new(&LIST, params)
            .fetch::<BlogRow>(self.pool)
            .await?
            .try_map(TryInto::try_into)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BlogId) -> Result<Option<Blog>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM blogs b LEFT JOIN users u ON b.author_id = u.id WHERE b.id = $1"
        );
        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::InvalidReference` if the author does not exist.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &BlogInput) -> Result<Blog, RepositoryError> {
        if super::value_taken(self.pool, "blogs", "slug", input.slug.as_str(), None).await? {
            return Err(RepositoryError::Conflict(SLUG_TAKEN.to_string()));
        }

        let sql = format!(
            "WITH b AS ( \
                INSERT INTO blogs (title, slug, content, author_id) \
                VALUES ($1, $2, $3, $4) \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM b LEFT JOIN users u ON b.author_id = u.id"
        );
        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(input.content.as_deref())
            .bind(input.author_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN, BAD_AUTHOR))?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the blog does not exist.
    /// Returns `RepositoryError::Conflict` if another blog has the slug.
    /// Returns `RepositoryError::InvalidReference` if the author does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(&self, id: BlogId, input: &BlogInput) -> Result<Blog, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        super::lock_row(&mut *tx, "blogs", id.as_i32()).await?;

        if super::value_taken(
            &mut *tx,
            "blogs",
            "slug",
            input.slug.as_str(),
            Some(id.as_i32()),
        )
        .await?
        {
            return Err(RepositoryError::Conflict(SLUG_TAKEN_BY_OTHER.to_string()));
        }

        let sql = format!(
            "WITH b AS ( \
                UPDATE blogs SET title = $2, slug = $3, content = $4, author_id = $5 \
                WHERE id = $1 \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM b LEFT JOIN users u ON b.author_id = u.id"
        );
        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(input.content.as_deref())
            .bind(input.author_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN_BY_OTHER, BAD_AUTHOR))?;

        tx.commit().await?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the blog does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: BlogId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

//! Product repository.
//!
//! Every read joins the category and brand so responses carry their names.
//! Writes go through a CTE that re-selects the written row with the same joins.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use backoffice_core::{BrandId, CategoryId, ProductId, Slug};

use super::RepositoryError;
use super::listing::{ListParams, ListSpec, PagedQuery, Paginated};
use crate::models::{Product, ProductInput};

const SLUG_TAKEN: &str = "A product with this slug already exists";
const SLUG_TAKEN_BY_OTHER: &str = "A different product with this slug already exists";
const BAD_REFERENCE: &str = "Referenced category or brand does not exist";

const COLUMNS: &str = "p.id, p.name, p.slug, p.description, p.price, p.stock, \
                       p.category_id, c.name AS category_name, \
                       p.brand_id, b.name AS brand_name, \
                       p.image_url, p.created_at";

const JOINS: &str = "LEFT JOIN categories c ON p.category_id = c.id \
                     LEFT JOIN brands b ON p.brand_id = b.id";

const LIST: ListSpec = ListSpec {
    columns: COLUMNS,
    from: "products p \
           LEFT JOIN categories c ON p.category_id = c.id \
           LEFT JOIN brands b ON p.brand_id = b.id",
    search_columns: &["p.name", "p.description"],
    order_by: "p.created_at DESC, p.id DESC",
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: String,
    description: Option<String>,
    price: Decimal,
    stock: i32,
    category_id: Option<CategoryId>,
    category_name: Option<String>,
    brand_id: Option<BrandId>,
    brand_name: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product slug in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            slug,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category_id: row.category_id,
            category_name: row.category_name,
            brand_id: row.brand_id,
            brand_name: row.brand_name,
            image_url: row.image_url,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated list, newest first, searchable by name and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<Product>, RepositoryError> {
        PagedQuery::new(&LIST, params)
            .fetch::<ProductRow>(self.pool)
            .await?
            .try_map(TryInto::try_into)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM products p {JOINS} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::InvalidReference` if the category or brand
    /// does not exist.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        if super::value_taken(self.pool, "products", "slug", input.slug.as_str(), None).await? {
            return Err(RepositoryError::Conflict(SLUG_TAKEN.to_string()));
        }

        let sql = format!(
            "WITH p AS ( \
                INSERT INTO products \
                    (name, slug, description, price, stock, category_id, brand_id, image_url) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM p {JOINS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.description.as_deref())
            .bind(input.price)
            .bind(input.stock)
            .bind(input.category_id)
            .bind(input.brand_id)
            .bind(input.image_url.as_deref())
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN, BAD_REFERENCE))?;

        row.try_into()
    }

    /// Update a product, keeping the current image when `input.image_url` is `None`.
    ///
    /// Returns the updated product and the previous image file name when it
    /// was replaced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if another product has the slug.
    /// Returns `RepositoryError::InvalidReference` if the category or brand
    /// does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<(Product, Option<String>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT image_url FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let previous = previous.ok_or(RepositoryError::NotFound)?;

        if super::value_taken(
            &mut *tx,
            "products",
            "slug",
            input.slug.as_str(),
            Some(id.as_i32()),
        )
        .await?
        {
            return Err(RepositoryError::Conflict(SLUG_TAKEN_BY_OTHER.to_string()));
        }

        let sql = format!(
            "WITH p AS ( \
                UPDATE products SET \
                    name = $2, slug = $3, description = $4, price = $5, stock = $6, \
                    category_id = $7, brand_id = $8, image_url = COALESCE($9, image_url) \
                WHERE id = $1 \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM p {JOINS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.description.as_deref())
            .bind(input.price)
            .bind(input.stock)
            .bind(input.category_id)
            .bind(input.brand_id)
            .bind(input.image_url.as_deref())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN_BY_OTHER, BAD_REFERENCE))?;

        tx.commit().await?;

        let replaced =
            previous.filter(|old| input.image_url.as_deref().is_some_and(|new| new != old));
        Ok((row.try_into()?, replaced))
    }

    /// Delete a product. Order lines keep their price with the product cleared.
    ///
    /// Returns the image file name, if any, for the caller to remove.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<Option<String>, RepositoryError> {
        let image: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM products WHERE id = $1 RETURNING image_url")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        image.ok_or(RepositoryError::NotFound)
    }
}

//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use backoffice_core::{BrandId, CategoryId, ProductId, Slug};

/// A catalog product with its category and brand names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    /// Serialized as a decimal string, e.g. `"19.99"`.
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub brand_id: Option<BrandId>,
    pub brand_name: Option<String>,
    /// Stored file name under `uploads/product-images/`.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated product fields for create and update.
///
/// On update, `image_url: None` keeps the existing image.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub image_url: Option<String>,
}

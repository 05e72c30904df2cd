//! Brand domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use backoffice_core::{BrandId, Slug};

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub brand_url: Option<String>,
    /// Stored file name under `uploads/brand-icons/`.
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated brand fields for create and update.
///
/// On update, `icon: None` keeps the existing icon.
#[derive(Debug, Clone)]
pub struct BrandInput {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub brand_url: Option<String>,
    pub icon: Option<String>,
}

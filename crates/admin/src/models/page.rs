//! Content pages.

use chrono::{DateTime, Utc};
use serde::Serialize;

use backoffice_core::{PageId, PageStatus, Slug};

/// A CMS page.
///
/// Not to be confused with [`crate::db::Paginated`], which is a page of list
/// results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub slug: Slug,
    pub content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub status: PageStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated page fields. A `None` status means `draft` on create and
/// "unchanged" on update.
#[derive(Debug, Clone)]
pub struct PageInput {
    pub title: String,
    pub slug: Slug,
    pub content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub status: Option<PageStatus>,
}

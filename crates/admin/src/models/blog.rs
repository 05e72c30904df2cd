//! Blog posts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use backoffice_core::{BlogId, Slug, UserId};

/// A blog post with its author's name resolved.
///
/// `author_id` is `None` once the author's account is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub slug: Slug,
    pub content: Option<String>,
    pub author_id: Option<UserId>,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BlogInput {
    pub title: String,
    pub slug: Slug,
    pub content: Option<String>,
    pub author_id: UserId,
}

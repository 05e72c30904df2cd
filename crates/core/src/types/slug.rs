//! URL-safe slugs for catalog and content entities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons a slug is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A unique, URL-safe identifier for brands, categories, products, pages and blogs.
///
/// Slugs are trimmed and lower-cased, then restricted to ASCII letters,
/// digits, `-` and `_`.
///
/// ```
/// use backoffice_core::Slug;
///
/// assert_eq!(Slug::parse(" Summer-Sale ").unwrap().as_str(), "summer-sale");
/// assert!(Slug::parse("has space").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Matches the `VARCHAR(255)` slug columns.
    pub const MAX_LENGTH: usize = 255;

    /// Parse and normalize a slug.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains a character outside `[a-z0-9_-]`.
    pub fn parse(input: &str) -> Result<Self, SlugError> {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(SlugError::Empty);
        }
        if normalized.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SlugError::InvalidCharacter(bad));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

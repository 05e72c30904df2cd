//! Core types for Backoffice.
//!
//! Type-safe wrappers for the domain concepts every resource handler shares.

pub mod email;
pub mod id;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use slug::{Slug, SlugError};
pub use status::*;

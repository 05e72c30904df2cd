//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Password sign-in, signed session tokens and the auth cookie
//! - `upload` - Storing uploaded brand icons and product images on disk

pub mod auth;
pub mod upload;

pub use auth::{AuthError, AuthService, Claims, TokenKeys, authenticate};
pub use upload::{UploadError, UploadFolder, UploadStore, UploadedFile};

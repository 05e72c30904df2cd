//! HTTP middleware and extractors for admin.
//!
//! # Layer Order (outermost first, see `main.rs` and `routes::app`)
//!
//! 1. Sentry hub and HTTP transaction layers
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. `DefaultBodyLimit` sized for uploads
//! 4. [`RequireAdmin`] extractor on every protected handler

pub mod auth;

pub use auth::{CurrentUser, RequireAdmin};

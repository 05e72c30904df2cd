//! Backoffice admin library.
//!
//! The admin API as a library, so the binary, the CLI and the integration
//! tests all build the same router and repositories.
//!
//! # Security
//!
//! Every `/api` route except sign-in and sign-out requires a signed-in user
//! whose current role is `admin`. The role is read from the database on each
//! request, never trusted from the token.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

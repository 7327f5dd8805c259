//! Proativa Core - Shared domain types.
//!
//! This crate provides the types shared by the production service and the CLI:
//! - `production` - Order/batch tracking service (library + HTTP server)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encodings are behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, batch statuses, units of measure and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Persistence for production tracking.
//!
//! # Database: `proativa` (`PostgreSQL`, schema `production`)
//!
//! ## Tables
//!
//! - `production.orders` - Order headers
//! - `production.order_items` - Requested product lines
//! - `production.batches` - Production runs with Kanban status
//! - `production.certificates` - Quality certificates (one per batch)
//! - `production.certificate_microorganisms` - Certificate concentration rows
//! - `production.certificate_physicochemicals` - Certificate analysis rows
//!
//! # Migrations
//!
//! Migrations are stored in `crates/production/migrations/` and run via:
//! ```bash
//! cargo run -p proativa-cli -- migrate
//! ```
//!
//! # Stores
//!
//! The board and the HTTP handlers talk to the [`OrderStore`] and
//! [`CertificateStore`] traits. [`PgStore`] is the production implementation;
//! [`MemoryStore`] backs tests and supports failure injection.

pub mod memory;
pub mod postgres;
pub mod store;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{CertificateStore, OrderStore, ProductionStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a second certificate for the same batch).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store could not be reached or refused the write.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

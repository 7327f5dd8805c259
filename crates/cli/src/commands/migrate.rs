//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! proativa migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PRODUCTION_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/production/migrations/`:
//! ```text
//! migrations/
//! ├── 20260301000001_create_production_orders.sql
//! └── 20260301000002_create_production_certificates.sql
//! ```

use proativa_production::db;

/// Errors raised while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("{0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the production schema migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn production() -> Result<(), MigrationError> {
    let database_url = super::database_url().map_err(MigrationError::Config)?;

    tracing::info!("Connecting to production database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running production migrations...");
    sqlx::migrate!("../production/migrations").run(&pool).await?;

    tracing::info!("Production migrations complete!");
    Ok(())
}

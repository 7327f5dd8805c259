//! CLI subcommand implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Load the production database URL, falling back to `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error naming the variable when neither is set.
pub fn database_url() -> Result<SecretString, String> {
    dotenvy::dotenv().ok();

    std::env::var("PRODUCTION_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "PRODUCTION_DATABASE_URL not set".to_string())
}

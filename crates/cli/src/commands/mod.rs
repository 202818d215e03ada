//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Error for a missing database URL.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: PLAYTECH_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;

/// Read the storefront database URL, falling back to `DATABASE_URL`.
pub fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();
    std::env::var("PLAYTECH_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}

/// Connect to the storefront database.
///
/// # Errors
///
/// Returns an error if the URL is missing or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    Ok(playtech_storefront::db::create_pool(&url).await?)
}

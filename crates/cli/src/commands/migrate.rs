//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! playtech-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PLAYTECH_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migration files live in `crates/storefront/migrations/` and are embedded
//! at compile time.

use thiserror::Error;

use super::database_url;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    MissingEnvVar(#[from] super::MissingDatabaseUrl),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let url = database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = playtech_storefront::db::create_pool(&url).await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}

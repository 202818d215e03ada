//! Admin user management commands.
//!
//! Promotion over HTTP needs an existing admin, so the first admin is made
//! here.
//!
//! # Usage
//!
//! ```bash
//! playtech-cli admin promote -u alice
//! ```

use playtech_core::Role;
use playtech_storefront::db::{PgUserStore, RepositoryError, UserStore};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    MissingEnvVar(#[from] super::MissingDatabaseUrl),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("No user with username: {0}")]
    UserNotFound(String),
}

/// Grant the admin role to an existing user.
///
/// Promoting a user who is already an admin succeeds without writing.
///
/// # Errors
///
/// Returns an error if the user does not exist or the database fails.
pub async fn promote(username: &str) -> Result<(), AdminError> {
    let url = super::database_url()?;
    let pool = playtech_storefront::db::create_pool(&url).await?;
    let users = PgUserStore::new(pool);

    let user = users
        .find_by_username(username)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(username.to_owned()))?;

    if user.role == Role::Admin {
        tracing::info!(username, "User is already an admin");
        return Ok(());
    }

    users.set_role(user.id, Role::Admin).await?;
    tracing::info!(username, user_id = %user.id, "User promoted to admin");
    Ok(())
}

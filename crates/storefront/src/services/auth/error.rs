//! Authentication error types.
//!
//! Client-facing variants display the exact message returned in the response
//! body.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::MailError;
use crate::services::token::TokenError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Another account already uses this email.
    #[error("Email already exists")]
    EmailTaken,

    /// Another account already uses this username.
    #[error("Username already exists")]
    UsernameTaken,

    /// No account matches the given username, email, or id.
    #[error("User does not exist")]
    UserNotFound,

    /// Wrong password for an existing account.
    #[error("Invalid password")]
    InvalidCredentials,

    /// No account holds the presented reset token.
    #[error("Link is expired. Generate a new reset link.")]
    ResetLinkInvalid,

    /// The reset token matched but its expiry has passed.
    #[error("Link is expired. Generate a new reset link.")]
    ResetLinkExpired,

    /// Caller lacks the admin role.
    #[error("Unauthorized")]
    Forbidden,

    /// The reset email could not be delivered.
    #[error("Email not sent: {0}")]
    Mail(#[from] MailError),

    /// Session token signing failed.
    #[error("session token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

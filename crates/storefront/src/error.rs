//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Service errors convert into
//! the taxonomy below; server-side failures are captured to Sentry before the
//! response is built and never expose their details to the client.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::email::MailError;
use crate::services::orders::OrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// No valid session.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but lacking the required role.
    #[error("{0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Wrong password.
    #[error("{0}")]
    InvalidCredentials(String),

    /// A reset link past its expiry.
    #[error("{0}")]
    Expired(String),

    /// The mail relay refused or failed.
    #[error("Email delivery failed: {0}")]
    EmailDelivery(#[source] MailError),

    /// Database operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) | Self::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Expired(_) => StatusCode::GONE,
            Self::EmailDelivery(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the client.
    fn public_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::EmailDelivery(_) => "Email not sent".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::Validation(msg) => Self::Validation(msg),
            AuthError::EmailTaken | AuthError::UsernameTaken => Self::Conflict(message),
            AuthError::UserNotFound | AuthError::ResetLinkInvalid => Self::NotFound(message),
            AuthError::InvalidCredentials => Self::InvalidCredentials(message),
            AuthError::ResetLinkExpired => Self::Expired(message),
            AuthError::Forbidden => Self::Forbidden(message),
            AuthError::Mail(e) => Self::EmailDelivery(e),
            AuthError::Repository(e) => e.into(),
            AuthError::Token(_) | AuthError::PasswordHash => Self::Internal(message),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        let message = err.to_string();
        match err {
            CartError::MissingFields | CartError::InvalidQuantity => Self::Validation(message),
            CartError::ProductNotFound | CartError::ItemNotFound | CartError::CartNotFound => {
                Self::NotFound(message)
            }
            CartError::Contended(_) => Self::Store(message),
            CartError::Repository(e) => e.into(),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Repository(e) => e.into(),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

//! Authentication extractor.
//!
//! Every protected handler takes a [`RequireUser`]. It reads the session
//! cookie, verifies the token and loads the account fresh from the store, so
//! a role change or account removal takes effect on the next request.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::COOKIE, request::Parts},
};
use tower_sessions::cookie::Cookie;
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, SESSION_COOKIE};
use crate::state::AppState;

const NOT_LOGGED_IN: &str = "User not logged in!";
const INVALID_SESSION: &str = "Invalid or expired session";

/// Extractor that requires a valid session.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(current): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", current.user.name)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthenticated(NOT_LOGGED_IN.to_string()))?;

        let user_id = state.tokens().verify(&token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AppError::Unauthenticated(INVALID_SESSION.to_string())
        })?;

        // A token for an account that no longer exists is just as invalid.
        let user = state
            .stores()
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(INVALID_SESSION.to_string()))?;

        Span::current().record("user_id", user_id.as_i32());
        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(CurrentUser::new(user)))
    }
}

/// Value of the session cookie, if the request carries one.
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

//! Account and session route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::JsonBody;
use crate::error::{Result, clear_sentry_user};
use crate::middleware::{RequireUser, removal_cookie, session_cookie};
use crate::models::PublicUser;
use crate::services::auth::{AuthService, Promotion, SignupInput};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Forgot-password request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

/// Register a customer account.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SignupInput>,
) -> Result<impl IntoResponse> {
    AuthService::new(&state).signup(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

/// Verify credentials and start a session.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse> {
    let outcome = AuthService::new(&state)
        .login(&request.username, &request.password)
        .await?;
    let cookie = session_cookie(&outcome.token.value);
    Ok((
        [(SET_COOKIE, cookie.to_string())],
        Json(json!({
            "message": "Logged in successfully",
            "token": outcome.token.value,
        })),
    ))
}

/// End the session by clearing the cookie.
pub async fn logout(RequireUser(current): RequireUser) -> impl IntoResponse {
    tracing::info!(user_id = %current.id(), "User logged out");
    clear_sentry_user();
    (
        [(SET_COOKIE, removal_cookie().to_string())],
        Json(json!({ "message": "Successfully logged out" })),
    )
}

/// Email a password reset link.
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ForgotPasswordRequest>,
) -> Result<impl IntoResponse> {
    let email = AuthService::new(&state)
        .forgot_password(&request.email)
        .await?;
    Ok(Json(json!({
        "message": format!("Email has been sent to {email}"),
    })))
}

/// Set a new password using a reset link.
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    JsonBody(request): JsonBody<ResetPasswordRequest>,
) -> Result<impl IntoResponse> {
    AuthService::new(&state)
        .reset_password(&token, &request.password, &request.confirm_password)
        .await?;
    Ok(Json(json!({ "message": "Password reset successfully" })))
}

/// The caller's profile, if the session is valid.
pub async fn check_logged_in(RequireUser(current): RequireUser) -> impl IntoResponse {
    Json(json!({
        "user": PublicUser::from(&current.user),
        "userId": current.id(),
    }))
}

pub async fn check_user_role(RequireUser(current): RequireUser) -> impl IntoResponse {
    Json(json!({ "role": current.role }))
}

/// Grant the admin role to another account. Admin only.
#[instrument(skip(state, current), fields(caller = %current.id()))]
pub async fn set_admin_role(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse> {
    let response = match AuthService::new(&state)
        .promote_to_admin(&current, &username)
        .await?
    {
        Promotion::Promoted => (
            StatusCode::OK,
            Json(json!({ "message": "User role updated to admin" })),
        ),
        Promotion::AlreadyAdmin => (
            StatusCode::ACCEPTED,
            Json(json!({ "message": "User is already an admin!" })),
        ),
    };
    Ok(response)
}

//! Profile route handlers.
//!
//! These routes require authentication.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::JsonBody;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::PublicUser;
use crate::services::auth::{AuthService, ChangePasswordInput};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateNameRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePhoneRequest {
    pub phone_number: String,
}

pub async fn details(RequireUser(current): RequireUser) -> impl IntoResponse {
    Json(json!({ "userDetails": PublicUser::from(&current.user) }))
}

#[instrument(skip_all, fields(user_id = %current.id()))]
pub async fn update_name(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    JsonBody(request): JsonBody<UpdateNameRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(&state)
        .update_name(&current.user, &request.name)
        .await?;
    Ok(Json(json!({
        "message": "Name updated successfully",
        "userData": PublicUser::from(&user),
    })))
}

#[instrument(skip_all, fields(user_id = %current.id()))]
pub async fn update_phone_number(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    JsonBody(request): JsonBody<UpdatePhoneRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(&state)
        .update_phone_number(&current.user, &request.phone_number)
        .await?;
    Ok(Json(json!({
        "message": "Phone number updated successfully",
        "userData": PublicUser::from(&user),
    })))
}

/// Change the password of the signed-in account.
#[instrument(skip_all, fields(user_id = %current.id()))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    JsonBody(input): JsonBody<ChangePasswordInput>,
) -> Result<impl IntoResponse> {
    AuthService::new(&state)
        .change_password(&current.user, input)
        .await?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

//! Cart route handlers.
//!
//! All cart routes act on the caller's own cart.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::JsonBody;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::cart::{AddItemInput, CartService, CartView, UpdateItemInput};
use crate::state::AppState;

/// The caller's cart lines with products resolved.
///
/// A user without a cart gets 203 and an empty object rather than an array.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Response> {
    let response = match CartService::new(&state).fetch(current.id()).await? {
        CartView::Absent => {
            (StatusCode::NON_AUTHORITATIVE_INFORMATION, Json(json!({}))).into_response()
        }
        CartView::Items(lines) => Json(lines).into_response(),
    };
    Ok(response)
}

pub async fn add(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    JsonBody(input): JsonBody<AddItemInput>,
) -> Result<impl IntoResponse> {
    CartService::new(&state).add_item(current.id(), input).await?;
    Ok(Json(json!({ "message": "Item added to cart." })))
}

pub async fn update(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(item_id): Path<String>,
    JsonBody(input): JsonBody<UpdateItemInput>,
) -> Result<impl IntoResponse> {
    let cart = CartService::new(&state)
        .update_item(current.id(), &item_id, input)
        .await?;
    Ok(Json(json!({ "message": "Item information updated.", "cart": cart })))
}

pub async fn remove(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse> {
    let cart = CartService::new(&state)
        .remove_item(current.id(), &item_id)
        .await?;
    Ok(Json(json!({ "message": "Item removed from cart.", "cart": cart })))
}

pub async fn clear(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<impl IntoResponse> {
    CartService::new(&state).clear(current.id()).await?;
    Ok(Json(json!({ "message": "Cart cleared successfully." })))
}

//! Order route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use playtech_core::Order;

use super::JsonBody;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::orders::{OrderService, SubmitOrderInput};
use crate::state::AppState;

/// The caller's orders, oldest first.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderService::new(&state).list(current.id()).await?))
}

/// Place an order from the submitted cart.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    JsonBody(input): JsonBody<SubmitOrderInput>,
) -> Result<impl IntoResponse> {
    let order_id = OrderService::new(&state).submit(current.id(), input).await?;
    Ok(Json(json!({ "orderId": order_id })))
}

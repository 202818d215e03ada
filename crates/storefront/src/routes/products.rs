//! Catalog route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::instrument;

use playtech_core::{NewProduct, Product};

use super::JsonBody;
use crate::error::Result;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// List every product.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(CatalogService::new(&state).list().await?))
}

/// Add a product to the catalog.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(product): JsonBody<NewProduct>,
) -> Result<impl IntoResponse> {
    let product = CatalogService::new(&state).create(product).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product added successfully",
            "product": product,
        })),
    ))
}

//! Catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::ProductId;
use order_store::{NewProduct, Product};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /products: the whole catalog with current stock.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.store.list_products().await?))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, ApiError> {
    state
        .store
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))
}

/// POST /products: adds a product to the catalog.
#[tracing::instrument(skip(state, req), fields(name = %req.name))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.store.insert_product(req).await?;
    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

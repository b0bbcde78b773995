//! Cart and checkout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, ProductId, Quantity};
use domain::{AddLineOutcome, Cart, CartLine, CartTotals};
use serde::{Deserialize, Serialize};
use storefront::PlacedOrder;

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

/// Quantities are in thousandths of a unit (2500 = 2.5 kg).
#[derive(Deserialize)]
pub struct AddLineRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

#[derive(Deserialize)]
pub struct UpdateLineRequest {
    pub quantity: Quantity,
}

#[derive(Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub delivery_date: Option<DateTime<Utc>>,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub customer_id: CustomerId,
    pub lines: Vec<CartLineResponse>,
    pub coupon_code: Option<String>,
    pub totals: CartTotals,
}

#[derive(Serialize)]
pub struct CartLineResponse {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
}

impl From<&CartLine> for CartLineResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id(),
            product_name: line.product.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price(),
            line_total: line.line_total(),
        }
    }
}

impl CartResponse {
    fn new(cart: &Cart, totals: CartTotals) -> Self {
        Self {
            customer_id: cart.customer_id(),
            lines: cart.lines().iter().map(CartLineResponse::from).collect(),
            coupon_code: cart.coupon().map(|c| c.code.clone()),
            totals,
        }
    }
}

#[derive(Serialize)]
pub struct CouponResponse {
    pub code: String,
    pub discount: Money,
}

// -- Handlers --

/// GET /customers/{id}/cart
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
) -> Result<Json<CartResponse>, ApiError> {
    let totals = state.storefront.totals(customer_id).await?;
    let cart = state
        .storefront
        .cart(customer_id)
        .unwrap_or_else(|| Cart::with_policy(customer_id, *state.storefront.policy()));
    Ok(Json(CartResponse::new(&cart, totals)))
}

/// DELETE /customers/{id}/cart
#[tracing::instrument(skip(state))]
pub async fn clear(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
) -> StatusCode {
    state.storefront.clear_cart(customer_id);
    StatusCode::NO_CONTENT
}

/// POST /customers/{id}/cart/lines: adds or merges a line.
///
/// The stock advisory in the response is a warning only.
#[tracing::instrument(skip(state, req))]
pub async fn add_line(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
    Json(req): Json<AddLineRequest>,
) -> Result<Json<AddLineOutcome>, ApiError> {
    let outcome = state
        .storefront
        .add_to_cart(customer_id, req.product_id, req.quantity)
        .await?;
    Ok(Json(outcome))
}

/// PUT /customers/{id}/cart/lines/{product_id}
#[tracing::instrument(skip(state, req))]
pub async fn update_line(
    State(state): State<Arc<AppState>>,
    Path((customer_id, product_id)): Path<(CustomerId, ProductId)>,
    Json(req): Json<UpdateLineRequest>,
) -> Result<Json<AddLineOutcome>, ApiError> {
    let outcome = state
        .storefront
        .update_quantity(customer_id, product_id, req.quantity)
        .await?;
    Ok(Json(outcome))
}

/// DELETE /customers/{id}/cart/lines/{product_id}
#[tracing::instrument(skip(state))]
pub async fn remove_line(
    State(state): State<Arc<AppState>>,
    Path((customer_id, product_id)): Path<(CustomerId, ProductId)>,
) -> Result<StatusCode, ApiError> {
    state
        .storefront
        .remove_from_cart(customer_id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /customers/{id}/cart/coupon
#[tracing::instrument(skip(state, req), fields(code = %req.code))]
pub async fn apply_coupon(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
    Json(req): Json<ApplyCouponRequest>,
) -> Result<Json<CouponResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let discount = state
        .storefront
        .apply_coupon(customer_id, &req.code, today)
        .await?;
    Ok(Json(CouponResponse {
        code: req.code,
        discount,
    }))
}

/// DELETE /customers/{id}/cart/coupon
#[tracing::instrument(skip(state))]
pub async fn clear_coupon(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
) -> StatusCode {
    state.storefront.clear_coupon(customer_id);
    StatusCode::NO_CONTENT
}

/// GET /customers/{id}/cart/totals
#[tracing::instrument(skip(state))]
pub async fn totals(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
) -> Result<Json<CartTotals>, ApiError> {
    Ok(Json(state.storefront.totals(customer_id).await?))
}

/// POST /customers/{id}/checkout: places the cart as a Pending order.
#[tracing::instrument(skip(state, req))]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<PlacedOrder>), ApiError> {
    let placed = state
        .storefront
        .place_order(customer_id, req.delivery_date, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

//! Coupon administration endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CustomerId;
use domain::Coupon;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Deserialize)]
pub struct GrantCouponRequest {
    pub code: String,
}

/// POST /coupons: publishes or replaces a coupon.
#[tracing::instrument(skip(state, coupon), fields(code = %coupon.code))]
pub async fn publish(
    State(state): State<Arc<AppState>>,
    Json(coupon): Json<Coupon>,
) -> (StatusCode, Json<Coupon>) {
    state.coupons.publish(coupon.clone());
    (StatusCode::CREATED, Json(coupon))
}

/// POST /customers/{id}/coupons: hands the customer one unused instance of a code.
#[tracing::instrument(skip(state, req))]
pub async fn grant(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
    Json(req): Json<GrantCouponRequest>,
) -> StatusCode {
    state.coupons.grant(customer_id, &req.code);
    StatusCode::NO_CONTENT
}

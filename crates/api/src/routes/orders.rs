//! Order lookup and lifecycle transition endpoints.
//!
//! A transition that loses its guard (wrong status, wrong actor, lost race)
//! answers 409 with `applied: false`; nothing was changed.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{CarrierId, CustomerId, OrderId};
use domain::Transition;
use order_store::Order;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct CarrierRequest {
    pub carrier_id: CarrierId,
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    pub carrier_id: CarrierId,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub customer_id: CustomerId,
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub customer_id: CustomerId,
    pub score: u8,
}

// -- Response types --

#[derive(Serialize)]
pub struct TransitionResponse {
    pub order_id: OrderId,
    pub transition: &'static str,
    pub applied: bool,
}

type TransitionResult = Result<(StatusCode, Json<TransitionResponse>), ApiError>;

fn transition_response(order_id: OrderId, transition: Transition, applied: bool) -> TransitionResult {
    let status = if applied {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    Ok((
        status,
        Json(TransitionResponse {
            order_id,
            transition: transition.as_str(),
            applied,
        }),
    ))
}

// -- Handlers --

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    state
        .store
        .get_order(order_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_id} not found")))
}

/// POST /orders/{id}/claim
#[tracing::instrument(skip(state, req))]
pub async fn claim(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<OrderId>,
    Json(req): Json<CarrierRequest>,
) -> TransitionResult {
    let applied = state.orders.claim(order_id, req.carrier_id).await?;
    transition_response(order_id, Transition::Claim, applied)
}

/// POST /orders/{id}/release
#[tracing::instrument(skip(state, req))]
pub async fn release(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<OrderId>,
    Json(req): Json<CarrierRequest>,
) -> TransitionResult {
    let applied = state.orders.release(order_id, req.carrier_id).await?;
    transition_response(order_id, Transition::Release, applied)
}

/// POST /orders/{id}/complete: `delivered_at` defaults to now.
#[tracing::instrument(skip(state, req))]
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<OrderId>,
    Json(req): Json<CompleteRequest>,
) -> TransitionResult {
    let delivered_at = req.delivered_at.unwrap_or_else(Utc::now);
    let applied = state
        .orders
        .complete(order_id, req.carrier_id, delivered_at)
        .await?;
    transition_response(order_id, Transition::Complete, applied)
}

/// POST /orders/{id}/cancel
#[tracing::instrument(skip(state, req))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<OrderId>,
    Json(req): Json<CancelRequest>,
) -> TransitionResult {
    let applied = state.orders.cancel(order_id, req.customer_id).await?;
    transition_response(order_id, Transition::Cancel, applied)
}

/// POST /orders/{id}/rate
#[tracing::instrument(skip(state, req))]
pub async fn rate(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<OrderId>,
    Json(req): Json<RateRequest>,
) -> TransitionResult {
    let applied = state
        .orders
        .rate(order_id, req.customer_id, req.score)
        .await?;
    transition_response(order_id, Transition::Rate, applied)
}

//! Read-side endpoints backed by the order views.
//!
//! Views fail soft: a store outage yields an empty list, never an error.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use common::{CarrierId, CustomerId, OrderStatus};
use order_store::{CarrierRating, Order};
use projections::{CarrierScope, StatusFilter};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string of the status listing. `status` is a comma-separated list.
#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListOrdersParams {
    fn into_filter(self) -> Result<StatusFilter, ApiError> {
        let statuses: Vec<OrderStatus> = match self.status.as_deref() {
            None | Some("") => Vec::new(),
            Some(list) => list
                .split(',')
                .map(|s| s.trim().parse::<OrderStatus>())
                .collect::<Result<_, _>>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        };
        Ok(StatusFilter {
            statuses,
            from: self.from,
            to: self.to,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailableParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CarrierOrdersParams {
    #[serde(default)]
    pub scope: CarrierScope,
}

/// GET /orders?status=Pending,Selected&from=..&to=..&limit=..&offset=..
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let filter = params.into_filter()?;
    Ok(Json(state.queries.by_status(&filter).await))
}

/// GET /orders/available: Pending orders nobody has claimed, oldest first.
#[tracing::instrument(skip(state))]
pub async fn available(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AvailableParams>,
) -> Json<Vec<Order>> {
    Json(state.queries.available(params.limit).await)
}

/// GET /customers/{id}/orders
#[tracing::instrument(skip(state))]
pub async fn by_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
) -> Json<Vec<Order>> {
    Json(state.queries.by_customer(customer_id).await)
}

/// GET /carriers/{id}/orders?scope=active|history
#[tracing::instrument(skip(state))]
pub async fn by_carrier(
    State(state): State<Arc<AppState>>,
    Path(carrier_id): Path<CarrierId>,
    Query(params): Query<CarrierOrdersParams>,
) -> Json<Vec<Order>> {
    Json(state.queries.by_carrier(carrier_id, params.scope).await)
}

/// GET /carriers/{id}/rating
#[tracing::instrument(skip(state))]
pub async fn carrier_rating(
    State(state): State<Arc<AppState>>,
    Path(carrier_id): Path<CarrierId>,
) -> Json<CarrierRating> {
    Json(state.queries.carrier_rating(carrier_id).await)
}

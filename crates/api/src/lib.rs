//! HTTP API server with observability for the grocery fulfillment core.
//!
//! Exposes the catalog, per-customer carts and checkout, carrier and customer
//! order transitions, and the order views as JSON, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, LogFormat};
pub use state::{AppState, SharedStore};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // Catalog
        .route(
            "/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route("/products/{id}", get(routes::products::get))
        // Coupons
        .route("/coupons", post(routes::coupons::publish))
        .route("/customers/{id}/coupons", post(routes::coupons::grant))
        // Cart and checkout
        .route(
            "/customers/{id}/cart",
            get(routes::cart::get).delete(routes::cart::clear),
        )
        .route("/customers/{id}/cart/lines", post(routes::cart::add_line))
        .route(
            "/customers/{id}/cart/lines/{product_id}",
            put(routes::cart::update_line).delete(routes::cart::remove_line),
        )
        .route(
            "/customers/{id}/cart/coupon",
            put(routes::cart::apply_coupon).delete(routes::cart::clear_coupon),
        )
        .route("/customers/{id}/cart/totals", get(routes::cart::totals))
        .route("/customers/{id}/checkout", post(routes::cart::checkout))
        // Order lifecycle
        .route("/orders", get(routes::queries::list))
        .route("/orders/available", get(routes::queries::available))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/{id}/claim", post(routes::orders::claim))
        .route("/orders/{id}/release", post(routes::orders::release))
        .route("/orders/{id}/complete", post(routes::orders::complete))
        .route("/orders/{id}/cancel", post(routes::orders::cancel))
        .route("/orders/{id}/rate", post(routes::orders::rate))
        // Views
        .route("/customers/{id}/orders", get(routes::queries::by_customer))
        .route("/carriers/{id}/orders", get(routes::queries::by_carrier))
        .route("/carriers/{id}/rating", get(routes::queries::carrier_rating))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{CartError, CheckoutError, DomainError, OrderError};
use order_store::StoreError;
use storefront::StorefrontError;

/// API-level error type that maps to HTTP responses.
///
/// Validation failures are 400/422, lost races and stock shortfalls are 409,
/// collaborator outages are 503 and store failures are 500.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Storefront error.
    Storefront(StorefrontError),
    /// Domain logic error.
    Domain(DomainError),
    /// Order store error.
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Storefront(err) => storefront_error_to_response(err),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Store(err) => store_error_to_response(err),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn storefront_error_to_response(err: StorefrontError) -> (StatusCode, String) {
    match &err {
        StorefrontError::UnknownProduct(_) => (StatusCode::NOT_FOUND, err.to_string()),
        StorefrontError::InsufficientStock(_) => (StatusCode::CONFLICT, err.to_string()),
        StorefrontError::EmptyCart
        | StorefrontError::BelowMinimumOrder { .. }
        | StorefrontError::InvalidDeliveryDate { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        StorefrontError::Cart(cart_err) => match cart_err {
            CartError::LineNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
            CartError::CouponAlreadyUsed { .. } => (StatusCode::CONFLICT, err.to_string()),
            CartError::InvalidQuantity { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
            CartError::CouponInvalid { .. }
            | CartError::EmptyCart
            | CartError::MissingDeliveryDate => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
        },
        StorefrontError::Checkout(checkout_err) => match checkout_err {
            CheckoutError::InsufficientStock(_) => (StatusCode::CONFLICT, err.to_string()),
            _ => (StatusCode::BAD_REQUEST, err.to_string()),
        },
        StorefrontError::CatalogService(_)
        | StorefrontError::CouponService(_)
        | StorefrontError::LoyaltyService(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        StorefrontError::Store(store_err) => (store_status(store_err), err.to_string()),
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Order(OrderError::InvalidRating { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        DomainError::Store(store_err) => (store_status(store_err), err.to_string()),
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    (store_status(&err), err.to_string())
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::InvalidOrder(_) | StoreError::InvalidProduct(_) => StatusCode::BAD_REQUEST,
        StoreError::InvalidRating(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StorefrontError> for ApiError {
    fn from(err: StorefrontError) -> Self {
        ApiError::Storefront(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

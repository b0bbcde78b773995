//! Storefront error types.

use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use domain::{CartError, CheckoutError};
use order_store::StoreError;
use thiserror::Error;

/// Errors that can occur while shopping or placing an order.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Checkout was attempted with no cart or an empty one.
    #[error("Cart is empty")]
    EmptyCart,

    /// The catalog has no such product.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// The pre-VAT subtotal is under the minimum order value.
    #[error("Order subtotal {subtotal} is below the minimum of {minimum}")]
    BelowMinimumOrder { subtotal: Money, minimum: Money },

    /// The delivery slot is in the past or too far ahead.
    #[error("Delivery date {requested} must be in the future and within {window_hours} hours")]
    InvalidDeliveryDate {
        requested: DateTime<Utc>,
        window_hours: i64,
    },

    /// A product could not cover its line; the cart was kept.
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// A cart rule rejected the request.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout rejected the snapshot.
    #[error("Checkout error: {0}")]
    Checkout(CheckoutError),

    /// Product catalog error.
    #[error("Catalog service error: {0}")]
    CatalogService(String),

    /// Coupon service error.
    #[error("Coupon service error: {0}")]
    CouponService(String),

    /// Loyalty service error.
    #[error("Loyalty service error: {0}")]
    LoyaltyService(String),

    /// Order store error.
    #[error("Order store error: {0}")]
    Store(#[from] StoreError),
}

impl From<CheckoutError> for StorefrontError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::InsufficientStock(product_id) => {
                StorefrontError::InsufficientStock(product_id)
            }
            CheckoutError::Store(e) => StorefrontError::Store(e),
            other => StorefrontError::Checkout(other),
        }
    }
}

/// Convenience type alias for storefront results.
pub type Result<T> = std::result::Result<T, StorefrontError>;

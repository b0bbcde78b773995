//! Per-customer cart aggregate.

mod aggregate;
mod coupon;
mod line;
mod totals;

pub use aggregate::Cart;
pub use coupon::{AppliedCoupon, Coupon};
pub use line::{AddLineOutcome, CartLine, StockAdvisory};
pub use totals::{CartTotals, OrderSnapshot};

use common::{ProductId, Quantity};
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: Quantity },

    /// No line for this product.
    #[error("Product {product_id} is not in the cart")]
    LineNotFound { product_id: ProductId },

    /// The coupon is inactive or past its expiry date.
    #[error("Coupon {code} is not valid")]
    CouponInvalid { code: String },

    /// The customer has no unused instance of the coupon.
    #[error("Coupon {code} has already been used")]
    CouponAlreadyUsed { code: String },

    /// The cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// No delivery slot was chosen.
    #[error("A delivery date is required")]
    MissingDeliveryDate,
}

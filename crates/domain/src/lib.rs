//! Business rules of the fulfillment core.
//!
//! This crate provides:
//! - the scarcity pricing rule
//! - the per-customer cart aggregate with discounts and VAT
//! - the checkout transaction that turns a cart snapshot into a persisted order
//! - the order state machine driving claim, release, complete, cancel and rate

pub mod cart;
pub mod checkout;
pub mod error;
pub mod order;
pub mod policy;
pub mod pricing;

pub use cart::{
    AddLineOutcome, AppliedCoupon, Cart, CartError, CartLine, CartTotals, Coupon, OrderSnapshot,
    StockAdvisory,
};
pub use checkout::{Checkout, CheckoutError};
pub use error::DomainError;
pub use order::{OrderError, OrderStateMachine, Transition};
pub use policy::CheckoutPolicy;
pub use pricing::effective_price;

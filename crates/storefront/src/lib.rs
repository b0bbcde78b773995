//! Storefront orchestration around the fulfillment core.
//!
//! Customers keep one cart per session. Placing an order runs these steps:
//! 1. Refresh every cart line from the catalog
//! 2. Check the minimum order value and the delivery slot
//! 3. Apply the loyalty discount and commit the checkout
//! 4. Redeem the coupon and drop the cart
//!
//! A checkout that runs out of stock leaves the cart in place so the customer
//! can adjust it and retry.

pub mod coordinator;
pub mod error;
pub mod services;
pub mod sessions;

pub use coordinator::{PlacedOrder, Storefront};
pub use error::{Result, StorefrontError};
pub use services::{
    CouponService, InMemoryCouponService, InMemoryLoyaltyService, InMemoryProductCatalog,
    LoyaltyService, ProductCatalog, StoreCatalog, StoreLoyalty,
};
pub use sessions::CartSessions;

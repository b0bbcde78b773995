//! External collaborator traits and their implementations.

pub mod catalog;
pub mod coupons;
pub mod loyalty;

pub use catalog::{InMemoryProductCatalog, ProductCatalog, StoreCatalog};
pub use coupons::{CouponService, InMemoryCouponService};
pub use loyalty::{InMemoryLoyaltyService, LoyaltyService, StoreLoyalty};

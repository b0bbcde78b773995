//! Read side of the fulfillment core.
//!
//! This crate provides the views couriers, customers and operators read:
//! - [`ReadModel`] trait with fail-soft query handling
//! - four views: available orders, carrier orders, customer orders, status listing
//! - [`OrderQueries`] facade bundling them over one store handle
//!
//! Views never mutate state. A store failure is logged and yields an empty
//! result rather than an error.

pub mod queries;
pub mod read_model;
pub mod views;

pub use order_store::CarrierRating;
pub use queries::{CarrierScope, OrderQueries};
pub use read_model::ReadModel;
pub use views::{
    AvailableOrdersView, CarrierOrdersView, CustomerOrdersView, StatusFilter, StatusListingView,
};

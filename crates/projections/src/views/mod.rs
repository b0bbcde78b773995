//! Read model views.

mod available;
mod carrier;
mod customer;
mod status;

pub use available::AvailableOrdersView;
pub use carrier::CarrierOrdersView;
pub use customer::CustomerOrdersView;
pub use status::{StatusFilter, StatusListingView};

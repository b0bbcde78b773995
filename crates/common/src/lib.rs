//! Shared identifiers and value types.
//!
//! Everything in here is persisted verbatim by the order store, so the
//! representations are integer based: money in minor units, quantities in
//! thousandths of a unit.

pub mod ids;
pub mod money;
pub mod quantity;
pub mod status;

pub use ids::{CarrierId, CustomerId, OrderId, ProductId};
pub use money::Money;
pub use quantity::Quantity;
pub use status::{OrderStatus, ParseEnumError, ProductCategory};

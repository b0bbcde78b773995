pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use common::{
    CarrierId, CustomerId, Money, OrderId, OrderStatus, ProductCategory, ProductId, Quantity,
};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use query::OrderQuery;
pub use record::{
    CarrierRating, CommitOutcome, NewOrder, NewProduct, Order, OrderLine, Product,
};
pub use store::{MAX_RATING, MIN_RATING, OrderStore, OrderStoreExt};

//! Orders waiting for a carrier.

use common::OrderStatus;
use order_store::{Order, OrderQuery, OrderStore};

use crate::read_model::ReadModel;

/// Pending orders that no carrier holds, oldest first.
#[derive(Clone)]
pub struct AvailableOrdersView<S> {
    store: S,
}

impl<S: OrderStore> AvailableOrdersView<S> {
    /// Creates a new view over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists available orders, optionally capped.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, limit: Option<usize>) -> Vec<Order> {
        let mut query = OrderQuery::new().status(OrderStatus::Pending).unclaimed();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.or_default(self.store.query_orders(query).await)
    }
}

impl<S: OrderStore> ReadModel for AvailableOrdersView<S> {
    fn name(&self) -> &'static str {
        "AvailableOrdersView"
    }
}

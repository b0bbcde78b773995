//! Customer order history.

use common::CustomerId;
use order_store::{Order, OrderQuery, OrderStore};

use crate::read_model::ReadModel;

/// Every order a customer has placed, in any status.
#[derive(Clone)]
pub struct CustomerOrdersView<S> {
    store: S,
}

impl<S: OrderStore> CustomerOrdersView<S> {
    /// Creates a new view over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists the customer's orders, most recent first.
    #[tracing::instrument(skip(self))]
    pub async fn history(&self, customer_id: CustomerId) -> Vec<Order> {
        let query = OrderQuery::for_customer(customer_id).newest_first();
        self.or_default(self.store.query_orders(query).await)
    }
}

impl<S: OrderStore> ReadModel for CustomerOrdersView<S> {
    fn name(&self) -> &'static str {
        "CustomerOrdersView"
    }
}

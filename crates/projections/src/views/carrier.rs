//! A carrier's deliveries and reputation.

use common::{CarrierId, OrderStatus};
use order_store::{CarrierRating, Order, OrderQuery, OrderStore};

use crate::read_model::ReadModel;

/// Orders a carrier holds or has delivered, and the carrier's rating.
#[derive(Clone)]
pub struct CarrierOrdersView<S> {
    store: S,
}

impl<S: OrderStore> CarrierOrdersView<S> {
    /// Creates a new view over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Orders the carrier is currently delivering, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn active(&self, carrier_id: CarrierId) -> Vec<Order> {
        let query = OrderQuery::for_carrier(carrier_id).status(OrderStatus::Selected);
        self.or_default(self.store.query_orders(query).await)
    }

    /// Orders the carrier delivered, most recent first.
    #[tracing::instrument(skip(self))]
    pub async fn history(&self, carrier_id: CarrierId) -> Vec<Order> {
        let query = OrderQuery::for_carrier(carrier_id)
            .status(OrderStatus::Delivered)
            .newest_first();
        self.or_default(self.store.query_orders(query).await)
    }

    /// Average of the carrier's ratings, or `Unrated` when there are none.
    #[tracing::instrument(skip(self))]
    pub async fn rating(&self, carrier_id: CarrierId) -> CarrierRating {
        self.or_default(self.store.carrier_rating(carrier_id).await)
    }
}

impl<S: OrderStore> ReadModel for CarrierOrdersView<S> {
    fn name(&self) -> &'static str {
        "CarrierOrdersView"
    }
}

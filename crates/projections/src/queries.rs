//! One entry point for every order view.

use common::{CarrierId, CustomerId};
use order_store::{CarrierRating, Order, OrderStore};
use serde::Deserialize;

use crate::views::{
    AvailableOrdersView, CarrierOrdersView, CustomerOrdersView, StatusFilter, StatusListingView,
};

/// Which of a carrier's orders to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierScope {
    /// Orders the carrier is delivering now.
    #[default]
    Active,
    /// Orders the carrier has delivered.
    History,
}

/// Facade over the order views sharing a single store handle.
#[derive(Clone)]
pub struct OrderQueries<S> {
    available: AvailableOrdersView<S>,
    carriers: CarrierOrdersView<S>,
    customers: CustomerOrdersView<S>,
    listing: StatusListingView<S>,
}

impl<S: OrderStore + Clone> OrderQueries<S> {
    /// Creates the views over the given store.
    pub fn new(store: S) -> Self {
        Self {
            available: AvailableOrdersView::new(store.clone()),
            carriers: CarrierOrdersView::new(store.clone()),
            customers: CustomerOrdersView::new(store.clone()),
            listing: StatusListingView::new(store),
        }
    }

    /// Pending orders no carrier holds, oldest first.
    pub async fn available(&self, limit: Option<usize>) -> Vec<Order> {
        self.available.list(limit).await
    }

    /// A carrier's active orders or delivery history.
    pub async fn by_carrier(&self, carrier_id: CarrierId, scope: CarrierScope) -> Vec<Order> {
        match scope {
            CarrierScope::Active => self.carriers.active(carrier_id).await,
            CarrierScope::History => self.carriers.history(carrier_id).await,
        }
    }

    /// A customer's full order history, most recent first.
    pub async fn by_customer(&self, customer_id: CustomerId) -> Vec<Order> {
        self.customers.history(customer_id).await
    }

    /// One page of orders across all customers.
    pub async fn by_status(&self, filter: &StatusFilter) -> Vec<Order> {
        self.listing.list(filter).await
    }

    /// A carrier's rating summary.
    pub async fn carrier_rating(&self, carrier_id: CarrierId) -> CarrierRating {
        self.carriers.rating(carrier_id).await
    }
}

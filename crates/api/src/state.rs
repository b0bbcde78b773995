//! Shared application state.

use std::sync::Arc;

use domain::{CheckoutPolicy, OrderStateMachine};
use order_store::OrderStore;
use projections::OrderQueries;
use storefront::{InMemoryCouponService, StoreCatalog, StoreLoyalty, Storefront};

/// Store handle shared by every component.
pub type SharedStore = Arc<dyn OrderStore>;

/// The storefront as wired by the server.
pub type AppStorefront = Storefront<
    SharedStore,
    StoreCatalog<SharedStore>,
    InMemoryCouponService,
    StoreLoyalty<SharedStore>,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub store: SharedStore,
    pub storefront: AppStorefront,
    pub orders: OrderStateMachine<SharedStore>,
    pub queries: OrderQueries<SharedStore>,
    pub coupons: InMemoryCouponService,
}

impl AppState {
    /// Wires every component over one store handle.
    pub fn new(store: SharedStore, policy: CheckoutPolicy) -> Self {
        let coupons = InMemoryCouponService::new();
        let storefront = Storefront::new(
            Arc::clone(&store),
            StoreCatalog::new(Arc::clone(&store)),
            coupons.clone(),
            StoreLoyalty::new(Arc::clone(&store)),
            policy,
        );

        Self {
            orders: OrderStateMachine::new(Arc::clone(&store)),
            queries: OrderQueries::new(Arc::clone(&store)),
            storefront,
            coupons,
            store,
        }
    }
}

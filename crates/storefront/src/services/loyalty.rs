//! Loyalty service trait and implementations.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::CustomerId;
use order_store::{OrderStore, OrderStoreExt};

use crate::error::StorefrontError;

/// Source of the completed-order count that drives the loyalty discount.
#[async_trait]
pub trait LoyaltyService: Send + Sync {
    async fn completed_order_count(&self, customer: CustomerId) -> Result<u32, StorefrontError>;
}

/// In-memory loyalty service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoyaltyService {
    counts: Arc<RwLock<HashMap<CustomerId, u32>>>,
}

impl InMemoryLoyaltyService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the completed-order count for a customer.
    pub fn set_count(&self, customer: CustomerId, count: u32) {
        self.counts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(customer, count);
    }
}

#[async_trait]
impl LoyaltyService for InMemoryLoyaltyService {
    async fn completed_order_count(&self, customer: CustomerId) -> Result<u32, StorefrontError> {
        let counts = self.counts.read().unwrap_or_else(PoisonError::into_inner);
        Ok(counts.get(&customer).copied().unwrap_or(0))
    }
}

/// Counts the customer's Delivered orders in the order store.
#[derive(Clone)]
pub struct StoreLoyalty<S> {
    store: S,
}

impl<S: OrderStore> StoreLoyalty<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: OrderStore> LoyaltyService for StoreLoyalty<S> {
    async fn completed_order_count(&self, customer: CustomerId) -> Result<u32, StorefrontError> {
        Ok(self.store.completed_order_count(customer).await?)
    }
}

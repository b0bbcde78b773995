//! Guarded order transitions.

use chrono::{DateTime, Utc};
use common::{CarrierId, CustomerId, OrderId};
use order_store::{MAX_RATING, MIN_RATING, OrderStore};

use crate::error::DomainError;

use super::{OrderError, Transition};

/// Drives orders through their lifecycle.
///
/// Every method is a single compare-and-set write in the store. `Ok(true)`
/// means the transition applied; `Ok(false)` means its guard did not hold
/// (another carrier won the claim, the status moved on, or the caller is
/// not the order's carrier or customer). Neither outcome is exceptional.
pub struct OrderStateMachine<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> OrderStateMachine<S> {
    /// Creates a new state machine over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// A carrier takes a Pending order.
    #[tracing::instrument(skip(self))]
    pub async fn claim(&self, order_id: OrderId, carrier_id: CarrierId) -> Result<bool, DomainError> {
        let applied = self.store.claim_order(order_id, carrier_id).await?;
        Ok(record(Transition::Claim, order_id, applied))
    }

    /// The holding carrier hands a Selected order back to the pool.
    #[tracing::instrument(skip(self))]
    pub async fn release(
        &self,
        order_id: OrderId,
        carrier_id: CarrierId,
    ) -> Result<bool, DomainError> {
        let applied = self.store.release_order(order_id, carrier_id).await?;
        Ok(record(Transition::Release, order_id, applied))
    }

    /// The holding carrier marks a Selected order delivered.
    #[tracing::instrument(skip(self))]
    pub async fn complete(
        &self,
        order_id: OrderId,
        carrier_id: CarrierId,
        delivered_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let applied = self
            .store
            .complete_order(order_id, carrier_id, delivered_at)
            .await?;
        Ok(record(Transition::Complete, order_id, applied))
    }

    /// The owning customer withdraws a Pending order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
    ) -> Result<bool, DomainError> {
        let applied = self.store.cancel_order(order_id, customer_id).await?;
        Ok(record(Transition::Cancel, order_id, applied))
    }

    /// The owning customer rates the carrier of a Delivered order, once.
    #[tracing::instrument(skip(self))]
    pub async fn rate(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        score: u8,
    ) -> Result<bool, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&score) {
            return Err(OrderError::InvalidRating { score }.into());
        }

        let applied = self.store.rate_order(order_id, customer_id, score).await?;
        Ok(record(Transition::Rate, order_id, applied))
    }
}

fn record(transition: Transition, order_id: OrderId, applied: bool) -> bool {
    let outcome = if applied { "applied" } else { "rejected" };
    metrics::counter!(
        "order_transitions_total",
        "transition" => transition.as_str(),
        "outcome" => outcome
    )
    .increment(1);

    if applied {
        tracing::info!(%order_id, %transition, "order transition applied");
    } else {
        tracing::info!(%order_id, %transition, "order transition rejected: guard did not hold");
    }
    applied
}

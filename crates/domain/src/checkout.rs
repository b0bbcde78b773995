//! The checkout transaction: one atomic commit of an order and its stock.

use std::time::Instant;

use chrono::Utc;
use common::{CustomerId, OrderId, ProductId, Quantity};
use order_store::{CommitOutcome, NewOrder, OrderStore, StoreError};
use thiserror::Error;

use crate::cart::OrderSnapshot;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A product could not cover its line; nothing was persisted.
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// The snapshot has no lines.
    #[error("Order has no lines")]
    EmptyOrder,

    /// A line carries a non-positive quantity.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity {
        product_id: ProductId,
        quantity: Quantity,
    },

    /// The snapshot was taken from another customer's cart.
    #[error("Snapshot belongs to customer {snapshot}, not {caller}")]
    CustomerMismatch {
        snapshot: CustomerId,
        caller: CustomerId,
    },

    /// The store failed; any partial work was rolled back.
    #[error("Order store error: {0}")]
    Store(#[from] StoreError),
}

/// Commits order snapshots against the store.
pub struct Checkout<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> Checkout<S> {
    /// Creates a new checkout over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persists the snapshot as a Pending order and takes its stock.
    ///
    /// Unit prices are used exactly as frozen in the snapshot; there is no
    /// retry and no re-pricing. When any line cannot be covered the whole
    /// order is abandoned and `InsufficientStock` names the first product
    /// that failed.
    #[tracing::instrument(skip(self, snapshot), fields(lines = snapshot.lines.len()))]
    pub async fn commit(
        &self,
        snapshot: OrderSnapshot,
        customer_id: CustomerId,
    ) -> Result<OrderId, CheckoutError> {
        validate_snapshot(&snapshot, customer_id)?;

        let started = Instant::now();
        let order = NewOrder {
            customer_id,
            lines: snapshot.lines,
            subtotal: snapshot.totals.subtotal,
            coupon_code: snapshot.coupon_code,
            coupon_discount: snapshot.totals.coupon_discount,
            loyalty_discount: snapshot.totals.loyalty_discount,
            vat: snapshot.totals.vat,
            total: snapshot.totals.grand_total,
            delivery_date: snapshot.delivery_date,
            created_at: Utc::now(),
        };

        let outcome = self.store.commit_order(order).await;
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        match outcome? {
            CommitOutcome::Committed(order_id) => {
                metrics::counter!("checkout_commits_total").increment(1);
                tracing::info!(%order_id, "order committed");
                Ok(order_id)
            }
            CommitOutcome::InsufficientStock(product_id) => {
                metrics::counter!("checkout_insufficient_stock_total").increment(1);
                tracing::warn!(%product_id, "checkout rejected: insufficient stock");
                Err(CheckoutError::InsufficientStock(product_id))
            }
        }
    }
}

fn validate_snapshot(snapshot: &OrderSnapshot, caller: CustomerId) -> Result<(), CheckoutError> {
    if snapshot.customer_id != caller {
        return Err(CheckoutError::CustomerMismatch {
            snapshot: snapshot.customer_id,
            caller,
        });
    }

    if snapshot.lines.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }

    if let Some(line) = snapshot.lines.iter().find(|l| !l.quantity.is_positive()) {
        return Err(CheckoutError::InvalidQuantity {
            product_id: line.product_id,
            quantity: line.quantity,
        });
    }

    Ok(())
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CarrierId, CustomerId, OrderId, OrderStatus, ProductId};

use crate::{
    CarrierRating, CommitOutcome, NewOrder, NewProduct, Order, OrderQuery, Product, Result,
    StoreError,
};

/// Lowest accepted carrier rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted carrier rating.
pub const MAX_RATING: u8 = 5;

/// Core trait for the relational store behind checkout and the order lifecycle.
///
/// Implementations are the single serialization point of the system: every
/// mutating method is one atomic unit of work, and the order transitions are
/// compare-and-set writes that report `Ok(false)` when their guard does not
/// hold (a lost race or a stale status).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Adds a product to the catalog and returns it with its generated id.
    async fn insert_product(&self, product: NewProduct) -> Result<Product>;

    /// Retrieves a product with its current stock.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists every product, ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Persists an order and decrements stock for each of its lines.
    ///
    /// Either the order, all of its lines and all decrements are persisted, or
    /// nothing is. A line whose product cannot cover the quantity aborts the
    /// whole commit with `CommitOutcome::InsufficientStock`, naming the first
    /// such product in line order.
    async fn commit_order(&self, order: NewOrder) -> Result<CommitOutcome>;

    /// Retrieves a single order with its lines.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Retrieves orders matching a query.
    async fn query_orders(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// `Pending` → `Selected`, assigning the carrier.
    async fn claim_order(&self, id: OrderId, carrier: CarrierId) -> Result<bool>;

    /// `Selected` → `Pending` when the caller holds the order.
    async fn release_order(&self, id: OrderId, carrier: CarrierId) -> Result<bool>;

    /// `Selected` → `Delivered` when the caller holds the order, recording the
    /// hand-over time as the delivery date.
    async fn complete_order(
        &self,
        id: OrderId,
        carrier: CarrierId,
        delivered_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// `Pending` → `Cancelled` when the caller owns the order.
    async fn cancel_order(&self, id: OrderId, customer: CustomerId) -> Result<bool>;

    /// Sets the carrier rating once, on a delivered order owned by the caller.
    async fn rate_order(&self, id: OrderId, customer: CustomerId, score: u8) -> Result<bool>;

    /// Averages the ratings a carrier has received.
    async fn carrier_rating(&self, carrier: CarrierId) -> Result<CarrierRating>;
}

// Shared handles, including `Arc<dyn OrderStore>` chosen at start-up
#[async_trait]
impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        (**self).insert_product(product).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        (**self).get_product(id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        (**self).list_products().await
    }

    async fn commit_order(&self, order: NewOrder) -> Result<CommitOutcome> {
        (**self).commit_order(order).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        (**self).get_order(id).await
    }

    async fn query_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        (**self).query_orders(query).await
    }

    async fn claim_order(&self, id: OrderId, carrier: CarrierId) -> Result<bool> {
        (**self).claim_order(id, carrier).await
    }

    async fn release_order(&self, id: OrderId, carrier: CarrierId) -> Result<bool> {
        (**self).release_order(id, carrier).await
    }

    async fn complete_order(
        &self,
        id: OrderId,
        carrier: CarrierId,
        delivered_at: DateTime<Utc>,
    ) -> Result<bool> {
        (**self).complete_order(id, carrier, delivered_at).await
    }

    async fn cancel_order(&self, id: OrderId, customer: CustomerId) -> Result<bool> {
        (**self).cancel_order(id, customer).await
    }

    async fn rate_order(&self, id: OrderId, customer: CustomerId, score: u8) -> Result<bool> {
        (**self).rate_order(id, customer, score).await
    }

    async fn carrier_rating(&self, carrier: CarrierId) -> Result<CarrierRating> {
        (**self).carrier_rating(carrier).await
    }
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Checks if an order exists.
    async fn order_exists(&self, id: OrderId) -> Result<bool> {
        Ok(self.get_order(id).await?.is_some())
    }

    /// Counts a customer's delivered orders.
    async fn completed_order_count(&self, customer: CustomerId) -> Result<u32> {
        let delivered = self
            .query_orders(OrderQuery::for_customer(customer).status(OrderStatus::Delivered))
            .await?;
        Ok(u32::try_from(delivered.len()).unwrap_or(u32::MAX))
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}

/// Validates an order before any store access.
pub fn validate_new_order(order: &NewOrder) -> Result<()> {
    if order.lines.is_empty() {
        return Err(StoreError::InvalidOrder(
            "Cannot commit an order without lines".to_string(),
        ));
    }

    for line in &order.lines {
        if !line.quantity.is_positive() {
            return Err(StoreError::InvalidOrder(format!(
                "Quantity for product {} must be positive, got {}",
                line.product_id, line.quantity
            )));
        }
        if line.unit_price.is_negative() {
            return Err(StoreError::InvalidOrder(format!(
                "Unit price for product {} must not be negative",
                line.product_id
            )));
        }
    }

    // Each product is decremented once per commit
    for (index, line) in order.lines.iter().enumerate() {
        if order.lines[..index]
            .iter()
            .any(|earlier| earlier.product_id == line.product_id)
        {
            return Err(StoreError::InvalidOrder(format!(
                "Product {} appears on more than one line",
                line.product_id
            )));
        }
    }

    Ok(())
}

/// Validates a rating score before any store access.
pub fn validate_rating(score: u8) -> Result<()> {
    if (MIN_RATING..=MAX_RATING).contains(&score) {
        Ok(())
    } else {
        Err(StoreError::InvalidRating(score))
    }
}

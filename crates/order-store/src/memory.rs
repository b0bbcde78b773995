use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CarrierId, CustomerId, OrderId, OrderStatus, ProductId, Quantity};
use tokio::sync::RwLock;

use crate::{
    CarrierRating, CommitOutcome, NewOrder, NewProduct, Order, OrderQuery, Product, Result,
    StoreError,
    store::{OrderStore, validate_new_order, validate_rating},
};

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    last_product_id: i64,
    last_order_id: i64,
}

impl State {
    /// Runs a guarded write on one order. The guard and the mutation happen
    /// under the same write lock, so concurrent callers are linearized.
    fn transition(
        &mut self,
        id: OrderId,
        guard: impl FnOnce(&Order) -> bool,
        apply: impl FnOnce(&mut Order),
    ) -> bool {
        match self.orders.get_mut(&id) {
            Some(order) if guard(order) => {
                apply(order);
                true
            }
            _ => false,
        }
    }
}

/// In-memory order store for tests and the demo server.
///
/// Every mutating call takes the single write lock for its whole duration,
/// which gives it the same all-or-nothing and compare-and-set semantics as
/// the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Overwrites a product's stock level. Used by restocking and test setup.
    pub async fn set_stock(&self, id: ProductId, stock: Quantity) -> Result<bool> {
        if stock.milli() < 0 {
            return Err(StoreError::InvalidProduct(format!(
                "stock must not be negative, got {stock}"
            )));
        }
        let mut state = self.state.write().await;
        Ok(match state.products.get_mut(&id) {
            Some(product) => {
                product.stock = stock;
                true
            }
            None => false,
        })
    }

    /// Clears all products and orders.
    pub async fn clear(&self) {
        *self.state.write().await = State::default();
    }
}

fn matches_query(order: &Order, query: &OrderQuery) -> bool {
    if let Some(customer) = query.customer_id
        && order.customer_id != customer
    {
        return false;
    }
    if let Some(carrier) = query.carrier_id
        && order.carrier_id != Some(carrier)
    {
        return false;
    }
    if let Some(ref statuses) = query.statuses
        && !statuses.contains(&order.status)
    {
        return false;
    }
    if query.unclaimed_only && order.carrier_id.is_some() {
        return false;
    }
    if let Some(from) = query.created_from
        && order.created_at < from
    {
        return false;
    }
    if let Some(to) = query.created_to
        && order.created_at > to
    {
        return false;
    }
    true
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        product.validate().map_err(StoreError::InvalidProduct)?;

        let mut state = self.state.write().await;
        state.last_product_id += 1;
        let product = product.into_product(ProductId::new(state.last_product_id));
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn commit_order(&self, order: NewOrder) -> Result<CommitOutcome> {
        validate_new_order(&order)?;

        let mut state = self.state.write().await;

        // Decrement in line order, remembering what to put back on failure
        let mut undo: Vec<(ProductId, Quantity)> = Vec::with_capacity(order.lines.len());
        let mut failed = None;
        for line in &order.lines {
            match state.products.get_mut(&line.product_id) {
                Some(product) if product.stock >= line.quantity => {
                    product.stock -= line.quantity;
                    undo.push((line.product_id, line.quantity));
                }
                _ => {
                    failed = Some(line.product_id);
                    break;
                }
            }
        }

        if let Some(product_id) = failed {
            tracing::warn!(%product_id, undone = undo.len(), "checkout rolled back: insufficient stock");
            for (id, quantity) in undo {
                if let Some(product) = state.products.get_mut(&id) {
                    product.stock += quantity;
                }
            }
            return Ok(CommitOutcome::InsufficientStock(product_id));
        }

        state.last_order_id += 1;
        let id = OrderId::new(state.last_order_id);
        state.orders.insert(id, order.into_order(id));
        Ok(CommitOutcome::Committed(id))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn query_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        if query.matches_nothing() {
            return Ok(Vec::new());
        }

        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| matches_query(o, &query))
            .cloned()
            .collect();

        orders.sort_by_key(|o| (o.created_at, o.id));
        if query.newest_first {
            orders.reverse();
        }

        let offset = query.offset.unwrap_or(0);
        let orders = orders.into_iter().skip(offset);
        Ok(match query.limit {
            Some(limit) => orders.take(limit).collect(),
            None => orders.collect(),
        })
    }

    async fn claim_order(&self, id: OrderId, carrier: CarrierId) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.transition(
            id,
            |o| o.status.can_claim(),
            |o| {
                o.status = OrderStatus::Selected;
                o.carrier_id = Some(carrier);
            },
        ))
    }

    async fn release_order(&self, id: OrderId, carrier: CarrierId) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.transition(
            id,
            |o| o.status.can_release() && o.carrier_id == Some(carrier),
            |o| {
                o.status = OrderStatus::Pending;
                o.carrier_id = None;
            },
        ))
    }

    async fn complete_order(
        &self,
        id: OrderId,
        carrier: CarrierId,
        delivered_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.transition(
            id,
            |o| o.status.can_complete() && o.carrier_id == Some(carrier),
            |o| {
                o.status = OrderStatus::Delivered;
                o.delivery_date = delivered_at;
            },
        ))
    }

    async fn cancel_order(&self, id: OrderId, customer: CustomerId) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.transition(
            id,
            |o| o.status.can_cancel() && o.customer_id == customer,
            |o| o.status = OrderStatus::Cancelled,
        ))
    }

    async fn rate_order(&self, id: OrderId, customer: CustomerId, score: u8) -> Result<bool> {
        validate_rating(score)?;

        let mut state = self.state.write().await;
        Ok(state.transition(
            id,
            |o| o.status.can_rate() && o.carrier_rating.is_none() && o.customer_id == customer,
            |o| o.carrier_rating = Some(score),
        ))
    }

    async fn carrier_rating(&self, carrier: CarrierId) -> Result<CarrierRating> {
        let state = self.state.read().await;
        let (sum, count) = state
            .orders
            .values()
            .filter(|o| o.carrier_id == Some(carrier))
            .filter_map(|o| o.carrier_rating)
            .fold((0u64, 0u64), |(sum, count), score| {
                (sum + u64::from(score), count + 1)
            });
        Ok(CarrierRating::from_scores(sum, count))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use common::{Money, ProductCategory};

    use super::*;
    use crate::{OrderLine, OrderStoreExt};

    async fn seed(store: &InMemoryOrderStore, name: &str, stock_units: i64) -> Product {
        store
            .insert_product(NewProduct {
                name: name.to_string(),
                category: ProductCategory::Vegetable,
                base_price: Money::from_units(10),
                stock: Quantity::from_units(stock_units),
                restock_threshold: Quantity::from_units(2),
            })
            .await
            .unwrap()
    }

    fn order_for(customer: i64, lines: &[(&Product, i64)]) -> NewOrder {
        let lines: Vec<_> = lines
            .iter()
            .map(|(product, milli)| OrderLine {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity: Quantity::from_milli(*milli),
                unit_price: product.base_price,
            })
            .collect();
        let subtotal = lines.iter().map(OrderLine::line_total).sum();
        NewOrder {
            customer_id: CustomerId::new(customer),
            lines,
            subtotal,
            coupon_code: None,
            coupon_discount: Money::zero(),
            loyalty_discount: Money::zero(),
            vat: Money::zero(),
            total: subtotal,
            delivery_date: Utc::now() + Duration::hours(24),
            created_at: Utc::now(),
        }
    }

    async fn committed(store: &InMemoryOrderStore, order: NewOrder) -> OrderId {
        match store.commit_order(order).await.unwrap() {
            CommitOutcome::Committed(id) => id,
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn commit_decrements_stock_and_stores_order() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 10).await;

        let id = committed(&store, order_for(1, &[(&tomato, 2_500)])).await;

        let product = store.get_product(tomato.id).await.unwrap().unwrap();
        assert_eq!(product.stock, Quantity::from_milli(7_500));

        let order = store.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.carrier_id, None);
        assert_eq!(order.lines.len(), 1);
    }

    #[tokio::test]
    async fn failed_line_rolls_back_earlier_decrements() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 10).await;
        let pepper = seed(&store, "Pepper", 1).await;

        let outcome = store
            .commit_order(order_for(1, &[(&tomato, 4_000), (&pepper, 2_000)]))
            .await
            .unwrap();

        assert_eq!(outcome, CommitOutcome::InsufficientStock(pepper.id));
        assert_eq!(store.order_count().await, 0);
        let tomato = store.get_product(tomato.id).await.unwrap().unwrap();
        assert_eq!(tomato.stock, Quantity::from_units(10));
    }

    #[tokio::test]
    async fn unknown_product_is_insufficient_stock() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 10).await;
        let mut ghost = tomato.clone();
        ghost.id = ProductId::new(99);

        let outcome = store
            .commit_order(order_for(1, &[(&ghost, 1_000)]))
            .await
            .unwrap();
        assert_eq!(outcome, CommitOutcome::InsufficientStock(ProductId::new(99)));
    }

    #[tokio::test]
    async fn exact_stock_can_be_bought_out() {
        let store = InMemoryOrderStore::new();
        let melon = seed(&store, "Melon", 3).await;

        committed(&store, order_for(1, &[(&melon, 3_000)])).await;

        let melon = store.get_product(melon.id).await.unwrap().unwrap();
        assert_eq!(melon.stock, Quantity::zero());
    }

    #[tokio::test]
    async fn claim_then_second_claim_fails() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 10).await;
        let id = committed(&store, order_for(1, &[(&tomato, 1_000)])).await;

        assert!(store.claim_order(id, CarrierId::new(5)).await.unwrap());
        assert!(!store.claim_order(id, CarrierId::new(6)).await.unwrap());

        let order = store.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Selected);
        assert_eq!(order.carrier_id, Some(CarrierId::new(5)));
    }

    #[tokio::test]
    async fn release_requires_the_holding_carrier() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 10).await;
        let id = committed(&store, order_for(1, &[(&tomato, 1_000)])).await;
        store.claim_order(id, CarrierId::new(5)).await.unwrap();

        assert!(!store.release_order(id, CarrierId::new(6)).await.unwrap());
        assert!(store.release_order(id, CarrierId::new(5)).await.unwrap());

        let order = store.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.carrier_id, None);
    }

    #[tokio::test]
    async fn complete_records_delivery_time() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 10).await;
        let id = committed(&store, order_for(1, &[(&tomato, 1_000)])).await;
        store.claim_order(id, CarrierId::new(5)).await.unwrap();

        let delivered_at = Utc::now();
        assert!(!store.complete_order(id, CarrierId::new(6), delivered_at).await.unwrap());
        assert!(store.complete_order(id, CarrierId::new(5), delivered_at).await.unwrap());

        let order = store.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.delivery_date, delivered_at);
        assert_eq!(store.completed_order_count(CustomerId::new(1)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn cancel_only_by_owner_while_pending() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 10).await;
        let id = committed(&store, order_for(1, &[(&tomato, 1_000)])).await;

        assert!(!store.cancel_order(id, CustomerId::new(2)).await.unwrap());
        assert!(store.cancel_order(id, CustomerId::new(1)).await.unwrap());
        assert!(!store.claim_order(id, CarrierId::new(5)).await.unwrap());

        let order = store.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn selected_order_cannot_be_cancelled() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 10).await;
        let id = committed(&store, order_for(1, &[(&tomato, 1_000)])).await;
        store.claim_order(id, CarrierId::new(5)).await.unwrap();

        assert!(!store.cancel_order(id, CustomerId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn rating_is_set_once_after_delivery() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 10).await;
        let id = committed(&store, order_for(1, &[(&tomato, 1_000)])).await;

        assert!(!store.rate_order(id, CustomerId::new(1), 4).await.unwrap());

        store.claim_order(id, CarrierId::new(5)).await.unwrap();
        store.complete_order(id, CarrierId::new(5), Utc::now()).await.unwrap();

        assert!(!store.rate_order(id, CustomerId::new(2), 4).await.unwrap());
        assert!(store.rate_order(id, CustomerId::new(1), 4).await.unwrap());
        assert!(!store.rate_order(id, CustomerId::new(1), 5).await.unwrap());
        assert!(matches!(
            store.rate_order(id, CustomerId::new(1), 0).await,
            Err(StoreError::InvalidRating(0))
        ));

        assert_eq!(
            store.carrier_rating(CarrierId::new(5)).await.unwrap(),
            CarrierRating::Rated {
                average: 4.0,
                count: 1
            }
        );
        assert_eq!(
            store.carrier_rating(CarrierId::new(6)).await.unwrap(),
            CarrierRating::Unrated
        );
    }

    #[tokio::test]
    async fn transitions_on_unknown_order_are_not_applied() {
        let store = InMemoryOrderStore::new();
        assert!(!store.claim_order(OrderId::new(42), CarrierId::new(1)).await.unwrap());
        assert!(!store.cancel_order(OrderId::new(42), CustomerId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn query_filters_and_paginates() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 100).await;
        let mut ids = Vec::new();
        for customer in [1, 2, 1, 1] {
            ids.push(committed(&store, order_for(customer, &[(&tomato, 1_000)])).await);
        }
        store.claim_order(ids[0], CarrierId::new(9)).await.unwrap();

        let mine = store
            .query_orders(OrderQuery::for_customer(CustomerId::new(1)))
            .await
            .unwrap();
        assert_eq!(mine.len(), 3);

        let available = store
            .query_orders(OrderQuery::new().status(OrderStatus::Pending).unclaimed())
            .await
            .unwrap();
        assert_eq!(
            available.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![ids[1], ids[2], ids[3]]
        );

        let newest = store
            .query_orders(OrderQuery::new().newest_first().limit(2))
            .await
            .unwrap();
        assert_eq!(newest.iter().map(|o| o.id).collect::<Vec<_>>(), vec![ids[3], ids[2]]);

        let page = store
            .query_orders(OrderQuery::new().offset(3).limit(10))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);

        let none = store
            .query_orders(OrderQuery::new().statuses(vec![]))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn set_stock_and_clear() {
        let store = InMemoryOrderStore::new();
        let tomato = seed(&store, "Tomato", 1).await;

        assert!(store.set_stock(tomato.id, Quantity::from_units(50)).await.unwrap());
        assert!(!store.set_stock(ProductId::new(77), Quantity::zero()).await.unwrap());
        assert!(store.set_stock(tomato.id, Quantity::from_milli(-1)).await.is_err());

        store.clear().await;
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_product_requires_positive_price_and_threshold() {
        let store = InMemoryOrderStore::new();
        let product = |base_price, restock_threshold| NewProduct {
            name: "Melon".to_string(),
            category: ProductCategory::Fruit,
            base_price,
            stock: Quantity::from_units(10),
            restock_threshold,
        };

        let free = store
            .insert_product(product(Money::zero(), Quantity::from_units(1)))
            .await;
        assert!(matches!(free, Err(StoreError::InvalidProduct(_))));

        let no_threshold = store
            .insert_product(product(Money::from_units(5), Quantity::zero()))
            .await;
        assert!(matches!(no_threshold, Err(StoreError::InvalidProduct(_))));

        assert!(store.list_products().await.unwrap().is_empty());
    }
}

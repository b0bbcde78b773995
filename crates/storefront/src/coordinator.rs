//! Storefront coordinator: cart commands and the place-order flow.

use chrono::{DateTime, NaiveDate, Utc};
use common::{CustomerId, Money, OrderId, ProductId, Quantity};
use domain::{AddLineOutcome, Cart, CartError, CartLine, CartTotals, Checkout, CheckoutPolicy};
use order_store::OrderStore;
use serde::Serialize;

use crate::error::{Result, StorefrontError};
use crate::services::{CouponService, LoyaltyService, ProductCatalog};
use crate::sessions::CartSessions;

/// A committed order as reported back to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub totals: CartTotals,
}

/// Drives cart sessions against the catalog, coupon and loyalty services
/// and commits finished carts through the checkout transaction.
pub struct Storefront<S, C, K, L>
where
    S: OrderStore,
    C: ProductCatalog,
    K: CouponService,
    L: LoyaltyService,
{
    checkout: Checkout<S>,
    catalog: C,
    coupons: K,
    loyalty: L,
    sessions: CartSessions,
}

impl<S, C, K, L> Storefront<S, C, K, L>
where
    S: OrderStore,
    C: ProductCatalog,
    K: CouponService,
    L: LoyaltyService,
{
    /// Creates a storefront whose carts price with `policy`.
    pub fn new(store: S, catalog: C, coupons: K, loyalty: L, policy: CheckoutPolicy) -> Self {
        Self {
            checkout: Checkout::new(store),
            catalog,
            coupons,
            loyalty,
            sessions: CartSessions::new(policy),
        }
    }

    /// Returns the cart sessions.
    pub fn sessions(&self) -> &CartSessions {
        &self.sessions
    }

    /// Returns the policy new carts price with.
    pub fn policy(&self) -> &CheckoutPolicy {
        self.sessions.policy()
    }

    /// Returns a copy of the customer's cart, if one is open.
    pub fn cart(&self, customer: CustomerId) -> Option<Cart> {
        self.sessions.get(customer)
    }

    /// Adds a product to the customer's cart at its current catalog state.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        customer: CustomerId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<AddLineOutcome> {
        let product = self
            .catalog
            .get(product_id)
            .await?
            .ok_or(StorefrontError::UnknownProduct(product_id))?;

        let outcome = self
            .sessions
            .with_cart(customer, |cart| cart.add_line(product, quantity))?;

        if outcome.advisory.is_warning() {
            tracing::warn!(%quantity, "cart line exceeds available stock");
        }
        Ok(outcome)
    }

    /// Replaces the quantity on an existing cart line.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        customer: CustomerId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<AddLineOutcome> {
        Ok(self
            .sessions
            .with_existing_cart(customer, |cart| cart.update_quantity(product_id, quantity))
            .unwrap_or(Err(CartError::LineNotFound { product_id }))?)
    }

    /// Removes a product's line from the customer's cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        customer: CustomerId,
        product_id: ProductId,
    ) -> Result<CartLine> {
        Ok(self
            .sessions
            .with_existing_cart(customer, |cart| cart.remove_line(product_id))
            .unwrap_or(Err(CartError::LineNotFound { product_id }))?)
    }

    /// Applies a coupon code to the customer's cart and returns its discount.
    ///
    /// The coupon is only redeemed once an order carrying it commits.
    #[tracing::instrument(skip(self))]
    pub async fn apply_coupon(
        &self,
        customer: CustomerId,
        code: &str,
        today: NaiveDate,
    ) -> Result<Money> {
        let coupon = self
            .coupons
            .lookup(code)
            .await?
            .ok_or_else(|| CartError::CouponInvalid {
                code: code.to_string(),
            })?;
        let holds_unused = self.coupons.holds_unused(customer, code).await?;

        Ok(self
            .sessions
            .with_cart(customer, |cart| cart.apply_coupon(&coupon, holds_unused, today))?)
    }

    /// Removes the coupon from the customer's cart.
    #[tracing::instrument(skip(self))]
    pub fn clear_coupon(&self, customer: CustomerId) -> bool {
        self.sessions
            .with_existing_cart(customer, |cart| cart.clear_coupon())
            .flatten()
            .is_some()
    }

    /// Returns the cart's price breakdown with an up-to-date loyalty discount.
    ///
    /// A customer without a cart gets all-zero totals.
    pub async fn totals(&self, customer: CustomerId) -> Result<CartTotals> {
        let completed = self.loyalty.completed_order_count(customer).await?;
        Ok(self
            .sessions
            .with_existing_cart(customer, |cart| {
                cart.compute_loyalty_discount(completed);
                cart.totals()
            })
            .unwrap_or_default())
    }

    /// Drops the customer's cart.
    pub fn clear_cart(&self, customer: CustomerId) {
        self.sessions.remove(customer);
    }

    /// Places the customer's cart as a Pending order.
    ///
    /// The cart leaves the session for the duration of the checkout, so a
    /// second concurrent call sees no cart. Lines are re-read from the
    /// catalog first, so the order is priced on current stock. When the
    /// order is rejected the cart goes back to the customer to adjust.
    #[tracing::instrument(skip(self))]
    pub async fn place_order(
        &self,
        customer: CustomerId,
        delivery_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<PlacedOrder> {
        let mut cart = self
            .sessions
            .take(customer)
            .ok_or(StorefrontError::EmptyCart)?;
        if cart.is_empty() {
            self.sessions.restore(cart);
            return Err(StorefrontError::EmptyCart);
        }

        let (order_id, totals, coupon_code) =
            match self.commit_cart(&mut cart, delivery_date, now).await {
                Ok(committed) => committed,
                Err(e) => {
                    if !self.sessions.restore(cart) {
                        tracing::debug!("newer cart opened during checkout, rejected cart dropped");
                    }
                    return Err(e);
                }
            };

        if let Some(code) = coupon_code {
            match self.coupons.redeem(customer, &code).await {
                Ok(true) => {}
                Ok(false) => tracing::warn!(%order_id, %code, "coupon had no unused instance left"),
                Err(e) => tracing::warn!(%order_id, %code, error = %e, "coupon redemption failed"),
            }
        }

        metrics::counter!("storefront_orders_placed_total").increment(1);
        tracing::info!(%order_id, total = %totals.grand_total, "order placed");
        Ok(PlacedOrder { order_id, totals })
    }

    async fn commit_cart(
        &self,
        cart: &mut Cart,
        delivery_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(OrderId, CartTotals, Option<String>)> {
        for product_id in cart.lines().iter().map(CartLine::product_id).collect::<Vec<_>>() {
            let product = self
                .catalog
                .get(product_id)
                .await?
                .ok_or(StorefrontError::UnknownProduct(product_id))?;
            cart.refresh_product(product);
        }

        let policy = *cart.policy();
        let subtotal = cart.subtotal();
        if !policy.meets_minimum(subtotal) {
            return Err(reject(
                "below_minimum",
                StorefrontError::BelowMinimumOrder {
                    subtotal,
                    minimum: policy.min_order,
                },
            ));
        }

        match delivery_date {
            Some(requested) if !policy.accepts_delivery_date(requested, now) => {
                return Err(reject(
                    "delivery_date",
                    StorefrontError::InvalidDeliveryDate {
                        requested,
                        window_hours: policy.delivery_window_hours,
                    },
                ));
            }
            _ => {}
        }

        let completed = self.loyalty.completed_order_count(cart.customer_id()).await?;
        cart.compute_loyalty_discount(completed);

        let snapshot = cart.to_order_snapshot(delivery_date)?;
        let totals = snapshot.totals;
        let coupon_code = snapshot.coupon_code.clone();

        match self.checkout.commit(snapshot, cart.customer_id()).await {
            Ok(order_id) => Ok((order_id, totals, coupon_code)),
            Err(e) => Err(reject("checkout", e.into())),
        }
    }
}

fn reject(reason: &'static str, error: StorefrontError) -> StorefrontError {
    metrics::counter!("storefront_place_order_rejected_total", "reason" => reason).increment(1);
    tracing::warn!(reason, error = %error, "place order rejected");
    error
}

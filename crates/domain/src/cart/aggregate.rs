//! Cart aggregate implementation.

use chrono::{DateTime, NaiveDate, Utc};
use common::{CustomerId, Money, OrderStatus, ProductId, Quantity};
use order_store::Product;
use serde::{Deserialize, Serialize};

use crate::policy::CheckoutPolicy;

use super::{
    AddLineOutcome, AppliedCoupon, CartError, CartLine, CartTotals, Coupon, OrderSnapshot,
};

/// A customer's cart.
///
/// Lines are unique by product and kept in the order they were first added.
/// The cart reserves nothing: stock is only taken at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Customer who owns the cart.
    customer_id: CustomerId,

    lines: Vec<CartLine>,

    coupon: Option<AppliedCoupon>,

    /// Last known completed-order count, used to recompute the loyalty discount.
    completed_orders: u32,

    policy: CheckoutPolicy,
}

impl Cart {
    /// Creates an empty cart with the default checkout policy.
    pub fn new(customer_id: CustomerId) -> Self {
        Self::with_policy(customer_id, CheckoutPolicy::default())
    }

    /// Creates an empty cart that prices with the given policy.
    pub fn with_policy(customer_id: CustomerId, policy: CheckoutPolicy) -> Self {
        Self {
            customer_id,
            lines: Vec::new(),
            coupon: None,
            completed_orders: 0,
            policy,
        }
    }
}

// Query methods
impl Cart {
    /// Returns the owning customer.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns all lines.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line for a product.
    pub fn get_line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the applied coupon, if any.
    pub fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// Returns the policy the cart prices with.
    pub fn policy(&self) -> &CheckoutPolicy {
        &self.policy
    }

    /// Sum of line totals at current effective prices.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Returns the full price breakdown.
    pub fn totals(&self) -> CartTotals {
        let subtotal = self.subtotal();
        let coupon = self
            .coupon
            .as_ref()
            .map(|c| c.discount)
            .unwrap_or_else(Money::zero);
        CartTotals::compute(
            subtotal,
            coupon,
            self.loyalty_discount_for(subtotal),
            self.policy.vat_bps,
        )
    }

    fn loyalty_discount_for(&self, subtotal: Money) -> Money {
        if self.policy.loyalty_applies(self.completed_orders) {
            subtotal.scale_bps(self.policy.loyalty_bps)
        } else {
            Money::zero()
        }
    }
}

// Command methods
impl Cart {
    /// Adds a product, merging with an existing line for the same product.
    ///
    /// The returned outcome carries the effective unit price for the merged
    /// quantity and warns when it exceeds the stock last seen; it never blocks.
    pub fn add_line(
        &mut self,
        product: Product,
        quantity: Quantity,
    ) -> Result<AddLineOutcome, CartError> {
        if !quantity.is_positive() {
            return Err(CartError::InvalidQuantity { quantity });
        }

        let index = match self.position(product.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::InvalidQuantity { quantity })?;
                line.product = product;
                index
            }
            None => {
                self.lines.push(CartLine { product, quantity });
                self.lines.len() - 1
            }
        };

        Ok(AddLineOutcome::for_line(&self.lines[index]))
    }

    /// Removes a product's line.
    pub fn remove_line(&mut self, product_id: ProductId) -> Result<CartLine, CartError> {
        let index = self
            .position(product_id)
            .ok_or(CartError::LineNotFound { product_id })?;
        Ok(self.lines.remove(index))
    }

    /// Replaces the quantity on an existing line.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<AddLineOutcome, CartError> {
        if !quantity.is_positive() {
            return Err(CartError::InvalidQuantity { quantity });
        }

        let index = self
            .position(product_id)
            .ok_or(CartError::LineNotFound { product_id })?;
        self.lines[index].quantity = quantity;
        Ok(AddLineOutcome::for_line(&self.lines[index]))
    }

    /// Replaces the catalog values captured on a line.
    ///
    /// Returns false if the product is not in the cart.
    pub fn refresh_product(&mut self, product: Product) -> bool {
        match self.position(product.id) {
            Some(index) => {
                self.lines[index].product = product;
                true
            }
            None => false,
        }
    }

    /// Applies a coupon, replacing any coupon applied before.
    ///
    /// `customer_holds_unused` is the coupon store's answer to whether this
    /// customer still owns an unredeemed instance of the code.
    pub fn apply_coupon(
        &mut self,
        coupon: &Coupon,
        customer_holds_unused: bool,
        today: NaiveDate,
    ) -> Result<Money, CartError> {
        if !coupon.is_valid_on(today) {
            return Err(CartError::CouponInvalid {
                code: coupon.code.clone(),
            });
        }
        if !customer_holds_unused {
            return Err(CartError::CouponAlreadyUsed {
                code: coupon.code.clone(),
            });
        }

        self.coupon = Some(AppliedCoupon {
            code: coupon.code.clone(),
            discount: coupon.discount,
        });
        Ok(coupon.discount)
    }

    /// Removes the applied coupon, returning it.
    pub fn clear_coupon(&mut self) -> Option<AppliedCoupon> {
        self.coupon.take()
    }

    /// Records the customer's completed-order count and returns the loyalty
    /// discount it earns on the current subtotal.
    pub fn compute_loyalty_discount(&mut self, completed_order_count: u32) -> Money {
        self.completed_orders = completed_order_count;
        self.loyalty_discount_for(self.subtotal())
    }

    /// Empties the cart, dropping lines and coupon.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.coupon = None;
    }

    /// Freezes the cart into an order snapshot with current effective prices.
    pub fn to_order_snapshot(
        &self,
        delivery_date: Option<DateTime<Utc>>,
    ) -> Result<OrderSnapshot, CartError> {
        if self.lines.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let delivery_date = delivery_date.ok_or(CartError::MissingDeliveryDate)?;

        Ok(OrderSnapshot {
            customer_id: self.customer_id,
            lines: self.lines.iter().map(CartLine::to_order_line).collect(),
            totals: self.totals(),
            coupon_code: self.coupon.as_ref().map(|c| c.code.clone()),
            delivery_date,
            status: OrderStatus::Pending,
        })
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id() == product_id)
    }
}

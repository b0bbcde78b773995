use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderStatus};
use order_store::OrderLine;
use serde::{Deserialize, Serialize};

/// Cart amounts, computed in a fixed order: subtotal, discounts, floor at zero, VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub coupon_discount: Money,
    pub loyalty_discount: Money,
    pub after_discounts: Money,
    pub vat: Money,
    pub grand_total: Money,
}

impl CartTotals {
    /// Computes totals from a subtotal and the discounts claimed against it.
    pub fn compute(
        subtotal: Money,
        coupon_discount: Money,
        loyalty_discount: Money,
        vat_bps: u32,
    ) -> Self {
        let after_discounts = (subtotal - coupon_discount - loyalty_discount).floor_at_zero();
        let vat = after_discounts.scale_bps(vat_bps);
        Self {
            subtotal,
            coupon_discount,
            loyalty_discount,
            after_discounts,
            vat,
            grand_total: after_discounts + vat,
        }
    }
}

/// An immutable copy of a cart, priced and ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub customer_id: CustomerId,
    pub lines: Vec<OrderLine>,
    pub totals: CartTotals,
    pub coupon_code: Option<String>,
    pub delivery_date: DateTime<Utc>,
    pub status: OrderStatus,
}

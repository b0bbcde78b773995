//! Business constants applied at checkout.

use chrono::{DateTime, Duration, Utc};
use common::Money;
use serde::{Deserialize, Serialize};

/// Checkout rules that operators may tune through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPolicy {
    /// Smallest pre-VAT subtotal accepted at checkout.
    pub min_order: Money,

    /// VAT rate in basis points.
    pub vat_bps: u32,

    /// Loyalty discount rate in basis points.
    pub loyalty_bps: u32,

    /// Completed orders needed before the loyalty discount applies.
    pub loyalty_min_orders: u32,

    /// How far ahead a delivery slot may be booked.
    pub delivery_window_hours: i64,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            min_order: Money::from_units(200),
            vat_bps: 1_800,
            loyalty_bps: 500,
            loyalty_min_orders: 5,
            delivery_window_hours: 48,
        }
    }
}

impl CheckoutPolicy {
    /// Returns true if the subtotal reaches the minimum order value.
    pub fn meets_minimum(&self, subtotal: Money) -> bool {
        subtotal >= self.min_order
    }

    /// Returns true if the customer qualifies for the loyalty discount.
    pub fn loyalty_applies(&self, completed_orders: u32) -> bool {
        completed_orders >= self.loyalty_min_orders
    }

    /// Returns true if the slot is in the future and inside the booking window.
    pub fn accepts_delivery_date(&self, delivery: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        delivery > now && delivery <= now + Duration::hours(self.delivery_window_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let policy = CheckoutPolicy::default();
        assert_eq!(policy.min_order.cents(), 20_000);
        assert_eq!(policy.vat_bps, 1_800);
        assert!(policy.loyalty_applies(5));
        assert!(!policy.loyalty_applies(4));
    }

    #[test]
    fn minimum_is_inclusive() {
        let policy = CheckoutPolicy::default();
        assert!(policy.meets_minimum(Money::from_units(200)));
        assert!(!policy.meets_minimum(Money::from_cents(19_999)));
    }

    #[test]
    fn delivery_window() {
        let policy = CheckoutPolicy::default();
        let now = Utc::now();
        assert!(!policy.accepts_delivery_date(now, now));
        assert!(!policy.accepts_delivery_date(now - Duration::hours(1), now));
        assert!(policy.accepts_delivery_date(now + Duration::hours(1), now));
        assert!(policy.accepts_delivery_date(now + Duration::hours(48), now));
        assert!(!policy.accepts_delivery_date(now + Duration::hours(49), now));
    }
}

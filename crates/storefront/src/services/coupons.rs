//! Coupon service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::CustomerId;
use domain::Coupon;

use crate::error::StorefrontError;

/// Coupon publication and per-customer redemption.
#[async_trait]
pub trait CouponService: Send + Sync {
    /// Looks up a published coupon by code.
    async fn lookup(&self, code: &str) -> Result<Option<Coupon>, StorefrontError>;

    /// Returns true if the customer still owns an unredeemed instance of the code.
    async fn holds_unused(&self, customer: CustomerId, code: &str)
    -> Result<bool, StorefrontError>;

    /// Marks one instance as used. Returns false if none was left.
    async fn redeem(&self, customer: CustomerId, code: &str) -> Result<bool, StorefrontError>;
}

#[derive(Debug, Default)]
struct InMemoryCouponState {
    coupons: HashMap<String, Coupon>,
    unused: HashMap<(CustomerId, String), u32>,
    redeemed: u32,
    fail_on_redeem: bool,
}

/// In-memory coupon service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCouponService {
    state: Arc<RwLock<InMemoryCouponState>>,
}

impl InMemoryCouponService {
    /// Creates a new empty coupon service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes or replaces a coupon.
    pub fn publish(&self, coupon: Coupon) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .coupons
            .insert(coupon.code.clone(), coupon);
    }

    /// Gives the customer one more unused instance of the code.
    pub fn grant(&self, customer: CustomerId, code: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state.unused.entry((customer, code.to_string())).or_default() += 1;
    }

    /// Configures the service to fail on redemption.
    pub fn set_fail_on_redeem(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_redeem = fail;
    }

    /// Returns the number of successful redemptions.
    pub fn redeemed_count(&self) -> u32 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .redeemed
    }
}

#[async_trait]
impl CouponService for InMemoryCouponService {
    async fn lookup(&self, code: &str) -> Result<Option<Coupon>, StorefrontError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.coupons.get(code).cloned())
    }

    async fn holds_unused(
        &self,
        customer: CustomerId,
        code: &str,
    ) -> Result<bool, StorefrontError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .unused
            .get(&(customer, code.to_string()))
            .is_some_and(|n| *n > 0))
    }

    async fn redeem(&self, customer: CustomerId, code: &str) -> Result<bool, StorefrontError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.fail_on_redeem {
            return Err(StorefrontError::CouponService(
                "Coupon store unavailable".to_string(),
            ));
        }

        match state.unused.get_mut(&(customer, code.to_string())) {
            Some(n) if *n > 0 => {
                *n -= 1;
                state.redeemed += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use common::Money;

    use super::*;

    fn fresh20() -> Coupon {
        Coupon {
            code: "FRESH20".to_string(),
            discount: Money::from_units(20),
            active: true,
            expires_on: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn lookup_published_coupon() {
        let coupons = InMemoryCouponService::new();
        coupons.publish(fresh20());

        assert_eq!(coupons.lookup("FRESH20").await.unwrap(), Some(fresh20()));
        assert_eq!(coupons.lookup("NOPE").await.unwrap(), None);
    }

    #[tokio::test]
    async fn redeem_consumes_one_instance() {
        let coupons = InMemoryCouponService::new();
        let customer = CustomerId::new(1);
        coupons.grant(customer, "FRESH20");

        assert!(coupons.holds_unused(customer, "FRESH20").await.unwrap());
        assert!(coupons.redeem(customer, "FRESH20").await.unwrap());
        assert!(!coupons.holds_unused(customer, "FRESH20").await.unwrap());
        assert!(!coupons.redeem(customer, "FRESH20").await.unwrap());
        assert_eq!(coupons.redeemed_count(), 1);
    }

    #[tokio::test]
    async fn instances_are_per_customer() {
        let coupons = InMemoryCouponService::new();
        coupons.grant(CustomerId::new(1), "FRESH20");

        assert!(!coupons.holds_unused(CustomerId::new(2), "FRESH20").await.unwrap());
    }
}

use chrono::NaiveDate;
use common::Money;
use serde::{Deserialize, Serialize};

/// A fixed-amount discount code as published by the coupon store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub discount: Money,
    pub active: bool,
    /// Last day on which the coupon can be redeemed.
    pub expires_on: NaiveDate,
}

impl Coupon {
    /// Returns true if the coupon can be redeemed on `today`.
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        self.active && self.expires_on >= today && !self.discount.is_negative()
    }
}

/// The coupon currently applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: Money,
}

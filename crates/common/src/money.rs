//! Money in minor units.

use serde::{Deserialize, Serialize};

use crate::Quantity;

/// Basis points in one whole (100%).
const BPS_PER_WHOLE: i128 = 10_000;

/// Money amount represented in minor units (kuruş / cents) to avoid
/// floating point drift in totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from minor units.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from whole currency units.
    pub const fn from_units(units: i64) -> Self {
        Self {
            cents: units * 100,
        }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in minor units.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-unit portion.
    pub fn units(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the minor-unit remainder.
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Clamps negative amounts to zero.
    pub fn floor_at_zero(self) -> Money {
        Money {
            cents: self.cents.max(0),
        }
    }

    /// Multiplies by an integer factor.
    pub fn multiply(&self, factor: i64) -> Money {
        Money {
            cents: self.cents * factor,
        }
    }

    /// Price of `quantity` at `self` per whole unit, rounded half away from zero.
    pub fn times_quantity(&self, quantity: Quantity) -> Money {
        let raw = i128::from(self.cents) * i128::from(quantity.milli());
        Money {
            cents: round_div(raw, i128::from(Quantity::MILLI_PER_UNIT)),
        }
    }

    /// Applies a rate expressed in basis points (1800 = 18%).
    pub fn scale_bps(&self, bps: u32) -> Money {
        let raw = i128::from(self.cents) * i128::from(bps);
        Money {
            cents: round_div(raw, BPS_PER_WHOLE),
        }
    }
}

/// Integer division rounding half away from zero.
fn round_div(numerator: i128, denominator: i128) -> i64 {
    let half = denominator / 2;
    let rounded = if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    };
    i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN })
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-₺{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "₺{}.{:02}", self.units(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents -= rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

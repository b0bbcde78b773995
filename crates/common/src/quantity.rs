//! Fractional quantities (kilograms or units) stored as thousandths.

use serde::{Deserialize, Serialize};

/// A quantity of goods in thousandths of a unit.
///
/// Produce is sold by the kilogram, so `Quantity::from_milli(2_500)` is 2.5 kg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(i64);

impl Quantity {
    /// Thousandths in one whole unit.
    pub const MILLI_PER_UNIT: i64 = 1_000;

    /// Creates a quantity from thousandths of a unit.
    pub const fn from_milli(milli: i64) -> Self {
        Self(milli)
    }

    /// Creates a quantity of whole units.
    pub const fn from_units(units: i64) -> Self {
        Self(units * Self::MILLI_PER_UNIT)
    }

    /// Converts a decimal amount, rounding to the nearest thousandth.
    ///
    /// Returns `None` for NaN or infinite input.
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let milli = (value * Self::MILLI_PER_UNIT as f64).round();
        if milli.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Self(milli as i64))
    }

    /// Returns zero.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the raw thousandths.
    pub fn milli(&self) -> i64 {
        self.0
    }

    /// Returns the quantity as a decimal number, for display only.
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / Self::MILLI_PER_UNIT as f64
    }

    /// Adds two quantities, returning `None` on overflow.
    pub fn checked_add(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_add(rhs.0).map(Quantity)
    }

    /// Returns true if the quantity is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = Self::MILLI_PER_UNIT.unsigned_abs();
        write!(f, "{sign}{}.{:03}", abs / per, abs % per)
    }
}

impl std::ops::Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Self) -> Self::Output {
        Quantity(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Self) -> Self::Output {
        Quantity(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_units_scales_to_milli() {
        assert_eq!(Quantity::from_units(10).milli(), 10_000);
    }

    #[test]
    fn from_decimal_rounds_to_thousandths() {
        assert_eq!(Quantity::from_decimal(2.5), Some(Quantity::from_milli(2_500)));
        assert_eq!(Quantity::from_decimal(0.0004), Some(Quantity::zero()));
        assert_eq!(Quantity::from_decimal(f64::NAN), None);
        assert_eq!(Quantity::from_decimal(f64::INFINITY), None);
    }

    #[test]
    fn display() {
        assert_eq!(Quantity::from_milli(2_500).to_string(), "2.500");
        assert_eq!(Quantity::from_milli(-5).to_string(), "-0.005");
    }

    #[test]
    fn arithmetic() {
        let mut q = Quantity::from_units(15);
        q -= Quantity::from_units(10);
        assert_eq!(q, Quantity::from_units(5));
        assert!(q.is_positive());
        assert!(!(q - Quantity::from_units(6)).is_positive());
    }

    #[test]
    fn checked_add_detects_overflow() {
        let half = Quantity::from_milli(i64::MAX / 2 + 1);
        assert_eq!(half.checked_add(half), None);
        assert_eq!(
            Quantity::from_units(1).checked_add(Quantity::from_milli(500)),
            Some(Quantity::from_milli(1_500))
        );
    }
}

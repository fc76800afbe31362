//! # Quantity Module
//!
//! Fixed-point quantities in hundredths of a unit.
//!
//! Sale lines and stock levels are decimal quantities (a bulk-to-singles
//! split can leave 0.50 of a carton on hand), and the conservation
//! invariant (sold minus reversed equals remaining) must hold exactly.
//! Floats cannot promise that, so quantities get the same treatment money
//! gets: one integer unit, fixed at two decimal places.
//!
//! ## Usage
//! ```rust
//! use meridian_core::quantity::Quantity;
//!
//! let sold = Quantity::from_units(10);
//! let reversed = Quantity::from_decimal(4.0);
//! assert_eq!((sold - reversed).hundredths(), 600);
//! assert_eq!(format!("{}", sold - reversed), "6.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A quantity in hundredths of a unit (1.00 unit = 100 hundredths).
///
/// Signed: original sale lines are positive, reversal lines negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from hundredths of a unit.
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Creates a quantity from whole units.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::from_units(4).hundredths(), 400);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 100)
    }

    /// Converts a decimal quantity to fixed-point, rounding to two
    /// decimal places, half away from zero. Boundary use only.
    pub fn from_decimal(quantity: f64) -> Self {
        Quantity((quantity * 100.0).round() as i64)
    }

    /// Converts back to a decimal for the response boundary.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the raw value in hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Checks if the quantity is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the quantity is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the quantity is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Quantity(self.0.abs())
    }

    /// Returns the smaller of two quantities.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Quantity(self.0.min(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::zero()
    }
}

/// Displays the quantity as a two-decimal number, e.g. `6.00` or `-4.50`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        assert_eq!(Quantity::from_units(10).hundredths(), 1000);
        assert_eq!(Quantity::from_units(-4).hundredths(), -400);
    }

    #[test]
    fn test_from_decimal_rounds_to_two_places() {
        assert_eq!(Quantity::from_decimal(4.0).hundredths(), 400);
        assert_eq!(Quantity::from_decimal(0.125).hundredths(), 13);
        assert_eq!(Quantity::from_decimal(-0.125).hundredths(), -13);
        assert_eq!(Quantity::from_decimal(2.5).hundredths(), 250);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Quantity::from_units(6)), "6.00");
        assert_eq!(format!("{}", Quantity::from_hundredths(-450)), "-4.50");
        assert_eq!(format!("{}", Quantity::from_hundredths(5)), "0.05");
        assert_eq!(format!("{}", Quantity::zero()), "0.00");
    }

    #[test]
    fn test_arithmetic_and_checks() {
        let sold = Quantity::from_units(10);
        let reversed = Quantity::from_units(4);

        assert_eq!((sold - reversed).hundredths(), 600);
        assert_eq!((-reversed).hundredths(), -400);
        assert!(sold.is_positive());
        assert!((-sold).is_negative());
        assert!(Quantity::zero().is_zero());
        assert_eq!(sold.min(reversed), reversed);
        assert_eq!((-reversed).abs(), reversed);
    }

    /// Conservation stays exact across fixed-point arithmetic: splitting a
    /// quantity into parts and summing them back loses nothing.
    #[test]
    fn test_conservation_exact() {
        let total = Quantity::from_decimal(10.0);
        let parts = [
            Quantity::from_decimal(3.33),
            Quantity::from_decimal(3.33),
            Quantity::from_decimal(3.34),
        ];
        let sum = parts.iter().fold(Quantity::zero(), |acc, &p| acc + p);
        assert_eq!(sum, total);
    }
}

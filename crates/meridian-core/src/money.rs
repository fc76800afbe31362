//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Repeated decimal multiplication across many reversal lines drifts:    │
//! │    the sum of the parts stops equalling the whole.                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Decimal input is rounded to cents ONCE at the boundary; every       │
//! │    allocation after that is exact integer math, so                     │
//! │    "sum of reversal lines == reversal total" is provable.              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use meridian_core::money::Money;
//! use meridian_core::quantity::Quantity;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(200); // $2.00
//!
//! // Line total for 4.00 units
//! let line = price.line_total(Quantity::from_units(4));
//! assert_eq!(line.cents(), 800);
//!
//! // Proportional share: 8.00 out of a 20.00 sale with a 1.00 discount
//! let share = line.pro_rata(Money::from_cents(100), Money::from_cents(2000));
//! assert_eq!(share.cents(), 40);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::quantity::Quantity;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: reversal sales carry negative subtotal/discount/total
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount (e.g. `12.345`) to Money, rounding to the
    /// nearest cent, half away from zero.
    ///
    /// This is the ONLY place a float touches money: the request boundary.
    /// Every computation after this point is integer math.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(12.345).cents(), 1235);
    /// assert_eq!(Money::from_decimal(-5.505).cents(), -551);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Money((amount * 100.0).round() as i64)
    }

    /// Converts back to a decimal amount for the response boundary.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Line total: unit price × fixed-point quantity, rounded to cents.
    ///
    /// ## Why Rounding Here
    /// A quantity of 2.50 units at $1.99 is 497.5 exact cents; the ledger
    /// stores whole cents, so the product is rounded half away from zero.
    /// Whole-unit quantities never round.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::money::Money;
    /// use meridian_core::quantity::Quantity;
    ///
    /// let price = Money::from_cents(199);
    /// assert_eq!(price.line_total(Quantity::from_hundredths(250)).cents(), 498);
    /// assert_eq!(price.line_total(Quantity::from_units(3)).cents(), 597);
    /// ```
    pub fn line_total(&self, quantity: Quantity) -> Money {
        // i128 prevents overflow on large amounts
        Money(div_round(self.0 as i128 * quantity.hundredths() as i128, 100))
    }

    /// Proportional share: `round(self × part / whole)`.
    ///
    /// Used to split an aggregate discount across reversal lines in
    /// proportion to the value being reversed. Returns zero when `whole`
    /// is zero.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::money::Money;
    ///
    /// // 8.00 of a 20.00 subtotal with a 1.00 discount → 0.40
    /// let line = Money::from_cents(800);
    /// let share = line.pro_rata(Money::from_cents(100), Money::from_cents(2000));
    /// assert_eq!(share.cents(), 40);
    /// ```
    pub fn pro_rata(&self, part: Money, whole: Money) -> Money {
        if whole.is_zero() {
            return Money::zero();
        }
        Money(div_round(self.0 as i128 * part.0 as i128, whole.0 as i128))
    }
}

/// Integer division rounded half away from zero.
///
/// The usual `(x + d/2) / d` shortcut only rounds correctly for
/// non-negative numerators; reversal aggregates are signed, so the sign
/// is handled symmetrically.
fn div_round(numerator: i128, denominator: i128) -> i64 {
    let sign = if (numerator < 0) != (denominator < 0) {
        -1
    } else {
        1
    };
    let n = numerator.abs();
    let d = denominator.abs();
    (sign * ((n + d / 2) / d)) as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Callers format for actual display
/// to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation: a reversal undoes value, so every aggregate is the negated
/// sum of its per-line parts.
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_from_decimal_rounds_to_nearest_cent() {
        assert_eq!(Money::from_decimal(12.34).cents(), 1234);
        assert_eq!(Money::from_decimal(12.345).cents(), 1235);
        assert_eq!(Money::from_decimal(12.344).cents(), 1234);
        assert_eq!(Money::from_decimal(0.0).cents(), 0);
        assert_eq!(Money::from_decimal(-5.505).cents(), -551);
    }

    #[test]
    fn test_decimal_round_trip() {
        let money = Money::from_cents(760);
        assert!((money.to_decimal() - 7.60).abs() < f64::EPSILON);
        assert_eq!(Money::from_decimal(money.to_decimal()), money);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-760)), "-7.60");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_line_total_whole_units() {
        let price = Money::from_cents(200);
        assert_eq!(price.line_total(Quantity::from_units(4)).cents(), 800);
    }

    #[test]
    fn test_line_total_fractional_quantity_rounds() {
        // 2.50 × $1.99 = 497.5 cents → 498
        let price = Money::from_cents(199);
        assert_eq!(price.line_total(Quantity::from_hundredths(250)).cents(), 498);
        // 0.33 × $1.00 = 33 cents exactly
        let unit = Money::from_cents(100);
        assert_eq!(unit.line_total(Quantity::from_hundredths(33)).cents(), 33);
    }

    #[test]
    fn test_pro_rata_basic() {
        // 8.00 of a 20.00 subtotal with a 1.00 discount → 0.40
        let line = Money::from_cents(800);
        let share = line.pro_rata(Money::from_cents(100), Money::from_cents(2000));
        assert_eq!(share.cents(), 40);
    }

    #[test]
    fn test_pro_rata_rounds_half_away_from_zero() {
        // 1 cent of a 3-cent subtotal with a 1-cent discount: 0.333 → 0
        let share = Money::from_cents(1).pro_rata(Money::from_cents(1), Money::from_cents(3));
        assert_eq!(share.cents(), 0);
        // 0.5 exactly rounds away from zero
        let share = Money::from_cents(1).pro_rata(Money::from_cents(1), Money::from_cents(2));
        assert_eq!(share.cents(), 1);
    }

    #[test]
    fn test_pro_rata_zero_whole() {
        let share = Money::from_cents(800).pro_rata(Money::from_cents(100), Money::zero());
        assert_eq!(share.cents(), 0);
    }

    #[test]
    fn test_div_round_signs() {
        assert_eq!(div_round(5, 2), 3);
        assert_eq!(div_round(-5, 2), -3);
        assert_eq!(div_round(4, 2), 2);
        assert_eq!(div_round(-4, 2), -2);
        assert_eq!(div_round(7, 3), 2);
        assert_eq!(div_round(-7, 3), -2);
    }

    /// Splitting a discount across lines can drift from the ideal by at
    /// most one cent per line; the per-line shares still never exceed the
    /// whole. This documents the intentional per-line rounding.
    #[test]
    fn test_pro_rata_drift_bounded() {
        let subtotal = Money::from_cents(1000);
        let discount = Money::from_cents(99);
        let parts = [Money::from_cents(333), Money::from_cents(333), Money::from_cents(334)];

        let shares: i64 = parts
            .iter()
            .map(|p| p.pro_rata(discount, subtotal).cents())
            .sum();

        // Ideal is 99; independent rounding may drift by ±1 per line
        assert!((shares - 99).abs() <= parts.len() as i64);
    }
}

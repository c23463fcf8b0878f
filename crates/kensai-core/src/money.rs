//! # Money Module
//!
//! Provides the `Money` type for quote totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Quote items arrive from the frontend as JSON floats:                   │
//! │    {"quantity": 3, "price": 0.1}                                        │
//! │    0.1 * 3 = 0.30000000000000004                                        │
//! │                                                                         │
//! │  OUR SOLUTION: convert each line to integer cents exactly once,         │
//! │  then sum, tax and compare in cents.                                    │
//! │                                                                         │
//! │  Every operation is checked: a figure that leaves the i64 range comes   │
//! │  back as `None`, never as a wrapped or saturated value.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kensai_core::money::Money;
//! use kensai_core::types::TaxRate;
//!
//! let line = Money::from_major_f64(199.5).unwrap().scale(2.0).unwrap(); // $399.00
//! let tax = line.calculate_tax(TaxRate::from_bps(1600)).unwrap();     // $63.84
//! assert_eq!(line.checked_add(tax).unwrap().cents(), 46284);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos / cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a major-unit float (`10.99`) into cents, rounding half away
    /// from zero.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` range.
    ///
    /// ## Example
    /// ```rust
    /// use kensai_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(10.99).unwrap().cents(), 1099);
    /// assert!(Money::from_major_f64(f64::NAN).is_none());
    /// ```
    pub fn from_major_f64(amount: f64) -> Option<Self> {
        cents_from_f64(amount * 100.0).map(Money)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts `other`. `None` on overflow.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Multiplies by a (possibly fractional) quantity, rounding to the cent.
    ///
    /// Quotes for printed material often carry fractional quantities
    /// (`2.5` m²), so this cannot be an integer multiply. Returns `None`
    /// when the quantity is not finite or the product leaves the `i64`
    /// range.
    ///
    /// ## Example
    /// ```rust
    /// use kensai_core::money::Money;
    ///
    /// let per_m2 = Money::from_cents(1999);
    /// assert_eq!(per_m2.scale(2.5).unwrap().cents(), 4998);
    /// assert!(per_m2.scale(f64::INFINITY).is_none());
    /// ```
    pub fn scale(&self, quantity: f64) -> Option<Money> {
        cents_from_f64(self.0 as f64 * quantity).map(Money)
    }

    /// Calculates tax with half-up rounding on integer math.
    ///
    /// ## Implementation
    /// `(amount * bps + 5000) / 10000` in i128. `None` when the tax does
    /// not fit back into `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use kensai_core::money::Money;
    /// use kensai_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(1000);
    /// assert_eq!(subtotal.calculate_tax(TaxRate::from_bps(825)).unwrap().cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        let tax_cents = (i128::from(self.0) * i128::from(rate.bps()) + 5000) / 10000;
        i64::try_from(tax_cents).ok().map(Money)
    }
}

/// Rounds a cent amount held as a float. NaN, infinities and anything
/// outside the `i64` range give `None`.
fn cents_from_f64(cents: f64) -> Option<i64> {
    let cents = cents.round();
    // i64::MAX as f64 is 2^63, one past the largest i64.
    if !cents.is_finite() || cents >= i64::MAX as f64 || cents < i64::MIN as f64 {
        return None;
    }
    Some(cents as i64)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. The frontend does locale formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_f64() {
        assert_eq!(Money::from_major_f64(10.99).unwrap().cents(), 1099);
        assert_eq!(Money::from_major_f64(0.1 + 0.2).unwrap().cents(), 30);
        assert_eq!(Money::from_major_f64(-5.5).unwrap().cents(), -550);
        assert!(Money::from_major_f64(f64::INFINITY).is_none());
        assert!(Money::from_major_f64(1e300).is_none());
        assert!(Money::from_major_f64(-1e300).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b).unwrap().cents(), 1500);
        assert_eq!(a.checked_sub(b).unwrap().cents(), 500);
        assert_eq!(b.checked_sub(a).unwrap().cents(), -500);

        assert!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)).is_none());
        assert!(Money::from_cents(i64::MIN).checked_sub(b).is_none());
    }

    #[test]
    fn test_scale() {
        assert_eq!(Money::from_cents(299).scale(3.0).unwrap().cents(), 897);
        assert_eq!(Money::from_cents(1999).scale(2.5).unwrap().cents(), 4998);
        assert_eq!(Money::from_cents(100).scale(0.0).unwrap().cents(), 0);
        assert!(Money::from_cents(100).scale(f64::NAN).is_none());
        assert!(Money::from_cents(i64::MAX / 2).scale(3.0).is_none());
    }

    #[test]
    fn test_tax_calculation() {
        let amount = Money::from_cents(1000);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(1000)).unwrap().cents(), 100);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(825)).unwrap().cents(), 83);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(1600)).unwrap().cents(), 160);

        let huge = Money::from_cents(i64::MAX / 2);
        assert!(huge.calculate_tax(TaxRate::from_bps(30_000)).is_none());
    }
}

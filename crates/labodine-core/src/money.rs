//! # Money Module
//!
//! Provides the `Money` type and the id-ID amount format used on every page.
//!
//! ## Why Integer Rupiah?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  (10 / 100) * 33333  = 3333.3000000000002  ❌ leaks into the receipt    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Rupiah (the smallest unit in practice)           │
//! │    33333 * 10 / 100 = 3333  (truncated, explicitly)                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Localized Amounts
//! The cashier types and reads amounts as `100.000` ("." groups thousands,
//! no decimals). [`format_localized_amount`] and [`parse_localized_amount`]
//! are exact inverses for every non-negative amount:
//!
//! ```rust
//! use labodine_core::money::{format_localized_amount, parse_localized_amount};
//!
//! assert_eq!(format_localized_amount(1_250_000), "1.250.000");
//! assert_eq!(parse_localized_amount("1.250.000"), 1_250_000);
//! assert_eq!(parse_localized_amount("Rp 200.000"), 200_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Thousands separator used by the id-ID locale.
pub const THOUSANDS_SEPARATOR: char = '.';

/// Currency prefix shown next to amounts.
pub const CURRENCY_PREFIX: &str = "Rp";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: change due can be negative while the cashier is still
///   typing the tendered amount; net profit can be negative.
/// - **Transparent serde**: serializes as a bare integer, matching the
///   backend's `harga`, `subtotal`, `total` fields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    ///
    /// ```rust
    /// use labodine_core::money::Money;
    ///
    /// let price = Money::from_rupiah(50_000);
    /// assert_eq!(price.rupiah(), 50_000);
    /// ```
    #[inline]
    pub const fn from_rupiah(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in whole rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
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

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ```rust
    /// use labodine_core::money::Money;
    ///
    /// let line = Money::from_rupiah(50_000).multiply_quantity(2);
    /// assert_eq!(line.rupiah(), 100_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `floor(self × percent / 100)`.
    ///
    /// Truncation, never rounding: 10% of Rp 33.333 is Rp 3.333, not 3.334.
    /// Uses i128 so that large subtotals cannot overflow the product.
    pub fn percent_floor(&self, percent: u8) -> Money {
        let scaled = self.0 as i128 * percent as i128;
        Money(scaled.div_euclid(100) as i64)
    }

    /// Clamps negative values to zero.
    #[inline]
    pub fn clamp_non_negative(self) -> Money {
        Money(self.0.max(0))
    }

    /// Renders the amount with "." thousands separators (`1.250.000`).
    pub fn to_localized(&self) -> String {
        format_localized_amount(self.0)
    }

    /// Parses a display string such as `Rp 1.250.000`.
    pub fn parse_localized(display: &str) -> Money {
        Money(parse_localized_amount(display))
    }
}

// =============================================================================
// Localized Format / Parse
// =============================================================================

/// Renders an integer with "." as the thousands separator and no decimals.
///
/// Negative values keep a leading `-`.
pub fn format_localized_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if amount < 0 {
        out.push('-');
    }

    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(ch);
    }

    out
}

/// Parses a localized amount by keeping only its ASCII digits.
///
/// Separators, the `Rp` prefix, spaces and any other characters are
/// dropped, so the result is always non-negative. An input without digits
/// yields `0`. Inputs with more digits than fit an `i64` saturate at
/// `i64::MAX`.
pub fn parse_localized_amount(display: &str) -> i64 {
    let mut value: i64 = 0;

    for digit in display.chars().filter_map(|c| c.to_digit(10)) {
        value = match value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit as i64))
        {
            Some(v) => v,
            None => return i64::MAX,
        };
    }

    value
}

// =============================================================================
// Trait Implementations
// =============================================================================
//
// Arithmetic saturates at the i64 bounds instead of panicking.

/// Shows the amount the way the receipt prints it: `Rp 90.000`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", CURRENCY_PREFIX, self.to_localized())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_localized_amount() {
        assert_eq!(format_localized_amount(0), "0");
        assert_eq!(format_localized_amount(7), "7");
        assert_eq!(format_localized_amount(999), "999");
        assert_eq!(format_localized_amount(1_000), "1.000");
        assert_eq!(format_localized_amount(90_000), "90.000");
        assert_eq!(format_localized_amount(100_000), "100.000");
        assert_eq!(format_localized_amount(1_250_000), "1.250.000");
        assert_eq!(format_localized_amount(-15_500), "-15.500");
    }

    #[test]
    fn test_parse_localized_amount() {
        assert_eq!(parse_localized_amount("200.000"), 200_000);
        assert_eq!(parse_localized_amount("Rp 1.250.000"), 1_250_000);
        assert_eq!(parse_localized_amount(""), 0);
        assert_eq!(parse_localized_amount("abc"), 0);
        assert_eq!(parse_localized_amount("  12 500 "), 12_500);
    }

    #[test]
    fn test_parse_saturates_on_overflow() {
        assert_eq!(parse_localized_amount("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_localized_round_trip() {
        let samples = [
            0,
            1,
            12,
            123,
            1_234,
            12_345,
            123_456,
            1_234_567,
            90_000,
            1_000_000_000,
            i64::MAX,
        ];
        for n in samples {
            assert_eq!(parse_localized_amount(&format_localized_amount(n)), n, "n = {n}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_rupiah(90_000).to_string(), "Rp 90.000");
        assert_eq!(Money::zero().to_string(), "Rp 0");
    }

    #[test]
    fn test_percent_floor_truncates() {
        assert_eq!(Money::from_rupiah(100_000).percent_floor(10).rupiah(), 10_000);
        assert_eq!(Money::from_rupiah(33_333).percent_floor(10).rupiah(), 3_333);
        assert_eq!(Money::from_rupiah(999).percent_floor(15).rupiah(), 149);
        assert_eq!(Money::from_rupiah(12_345).percent_floor(0).rupiah(), 0);
        assert_eq!(Money::from_rupiah(12_345).percent_floor(100).rupiah(), 12_345);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_rupiah(1_000);
        let b = Money::from_rupiah(500);

        assert_eq!((a + b).rupiah(), 1_500);
        assert_eq!((a - b).rupiah(), 500);
        assert_eq!((a * 3).rupiah(), 3_000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.rupiah(), 2_000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let big = Money::from_rupiah(i64::MAX / 2 + 1);

        assert_eq!(big.multiply_quantity(2).rupiah(), i64::MAX);
        assert_eq!((big * 3).rupiah(), i64::MAX);
        assert_eq!((big + big).rupiah(), i64::MAX);
        assert_eq!((Money::from_rupiah(i64::MIN) - big).rupiah(), i64::MIN);

        let total: Money = [big, big, big].iter().sum();
        assert_eq!(total.rupiah(), i64::MAX);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_rupiah(-10).clamp_non_negative(), Money::zero());
        assert_eq!(Money::from_rupiah(10).clamp_non_negative().rupiah(), 10);
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_rupiah(50_000)).unwrap();
        assert_eq!(json, "50000");
        let back: Money = serde_json::from_str("125000").unwrap();
        assert_eq!(back.rupiah(), 125_000);
    }
}

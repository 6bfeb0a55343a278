//! # Points Module
//!
//! Provides the `Points` type, the storefront's unit of price.
//!
//! ## Why a Newtype?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POINTS ARE NOT MONEY                                                   │
//! │                                                                         │
//! │  Treats are priced in whole "points" (30 pts), never fractions.        │
//! │  A bare integer would happily mix with quantities and counts:          │
//! │    total = price + quantity        ← compiles, nonsense                │
//! │                                                                         │
//! │  With a newtype:                                                        │
//! │    Points + Points   ✅                                                 │
//! │    Points × quantity ✅                                                 │
//! │    Points + quantity ❌ (type error)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the wire `Points` is a bare JSON number, so persisted orders read
//! `"totalPoints": 60`.
//!
//! ## Usage
//! ```rust
//! use bites_core::points::Points;
//!
//! let price = Points::new(30);
//! let line = price * 2;
//! assert_eq!(line.value(), 60);
//! assert_eq!(line.to_string(), "60 pts");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use ts_rs::TS;

/// A non-negative amount of points.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Points(#[ts(type = "number")] u64);

impl Points {
    /// Creates a points value.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Points(value)
    }

    /// Zero points.
    #[inline]
    pub const fn zero() -> Self {
        Points(0)
    }

    /// Returns the raw integer value.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Line total for `quantity` units at this price.
    ///
    /// Saturates instead of wrapping; a catalog of two-digit prices never
    /// gets near the limit, but a hand-edited import might.
    #[inline]
    pub const fn times(&self, quantity: u32) -> Self {
        Points(self.0.saturating_mul(quantity as u64))
    }

    /// Average over `count` entries, rounded to one decimal place.
    ///
    /// Returns `0.0` for an empty set rather than dividing by zero.
    ///
    /// ```rust
    /// use bites_core::points::Points;
    ///
    /// assert_eq!(Points::new(100).average_over(3), 33.3);
    /// assert_eq!(Points::new(90).average_over(0), 0.0);
    /// ```
    pub fn average_over(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let avg = self.0 as f64 / count as f64;
        (avg * 10.0).round() / 10.0
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pts", self.0)
    }
}

impl From<u64> for Points {
    fn from(value: u64) -> Self {
        Points(value)
    }
}

impl Add for Points {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Points(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Points {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

/// Multiplication by a cart quantity.
impl Mul<u32> for Points {
    type Output = Self;

    #[inline]
    fn mul(self, quantity: u32) -> Self {
        self.times(quantity)
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Self {
        iter.fold(Points::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Points> for Points {
    fn sum<I: Iterator<Item = &'a Points>>(iter: I) -> Self {
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
    fn test_display() {
        assert_eq!(Points::new(30).to_string(), "30 pts");
        assert_eq!(Points::zero().to_string(), "0 pts");
    }

    #[test]
    fn test_arithmetic() {
        let a = Points::new(30);
        let b = Points::new(12);

        assert_eq!((a + b).value(), 42);
        assert_eq!((a * 3).value(), 90);

        let mut acc = Points::zero();
        acc += a;
        acc += b;
        assert_eq!(acc.value(), 42);
    }

    #[test]
    fn test_sum() {
        let lines = vec![Points::new(30), Points::new(60), Points::new(5)];
        let total: Points = lines.iter().sum();
        assert_eq!(total.value(), 95);

        let empty: Points = Vec::<Points>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_times_saturates() {
        let huge = Points::new(u64::MAX - 1);
        assert_eq!(huge.times(2).value(), u64::MAX);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        assert_eq!(Points::new(90).average_over(2), 45.0);
        assert_eq!(Points::new(100).average_over(3), 33.3);
        assert_eq!(Points::new(200).average_over(3), 66.7);
        assert_eq!(Points::zero().average_over(0), 0.0);
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Points::new(30)).unwrap();
        assert_eq!(json, "30");

        let parsed: Points = serde_json::from_str("60").unwrap();
        assert_eq!(parsed, Points::new(60));

        assert!(serde_json::from_str::<Points>("-1").is_err());
    }
}

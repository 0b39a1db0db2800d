//! Basis-point representation for percentages.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, Rounding};
use crate::error::AmmError;

/// Maximum value that represents 100%.
pub const MAX_BPS: u32 = 10_000;

/// A percentage expressed in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// Governance parameters such as invariant bounds legitimately exceed
/// 100% (the default ceiling is 11 000 bp), so any `u32` is accepted;
/// use [`is_valid_percent`](Self::is_valid_percent) where a true
/// percentage is required.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Amount, BasisPoints, Rounding};
///
/// let bp = BasisPoints::new(30);
/// assert_eq!(bp.apply(Amount::new(1_000), Rounding::Up).ok(), Some(Amount::new(3)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// Zero basis points (0%).
    pub const ZERO: Self = Self(0);

    /// 100% expressed in basis points.
    pub const MAX_PERCENT: Self = Self(MAX_BPS);

    /// Creates a new `BasisPoints` from a raw `u32` value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying `u32` value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the value is in the valid percentage range (`0..=10_000`).
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 <= MAX_BPS
    }

    /// Returns `10 000 − self`, or `None` above 100%.
    #[must_use]
    pub const fn complement(&self) -> Option<Self> {
        match MAX_BPS.checked_sub(self.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Computes `amount × self / 10 000` with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the intermediate product overflows.
    pub fn apply(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        crate::math::mul_div(
            amount.get(),
            u128::from(self.0),
            u128::from(MAX_BPS),
            rounding,
        )
        .map(Amount::new)
    }

    /// Converts a whole-number percentage into basis points.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if `percent × 100` overflows.
    pub const fn from_percent(percent: u32) -> crate::error::Result<Self> {
        match percent.checked_mul(100) {
            Some(v) => Ok(Self(v)),
            None => Err(AmmError::Overflow("percent to basis points overflow")),
        }
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

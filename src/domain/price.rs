//! Deterministic fixed-point exchange rate.

use core::fmt;
use core::str::FromStr;

use ethnum::U256;
use fixed::types::U64F64;
use serde::{Deserialize, Serialize};

use super::{Amount, Rounding};
use crate::error::AmmError;
use crate::math::{div_u256, mul_div, narrow};

/// Number of fractional bits in the underlying fixed-point value.
const FRAC_BITS: u32 = 64;

/// Exchange rate between two tokens as `quote / base`.
///
/// Pool prices are always quoted as token B per token A
/// (`reserve_b / reserve_a`). The value is a [`U64F64`] so that every
/// replica computes the same bits; floating point never enters a state
/// transition.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Amount, Price, Rounding};
///
/// let Ok(price) = Price::from_ratio(2_000_000, 1_000_000) else {
///     return;
/// };
/// assert_eq!(price.to_string(), "2");
/// assert_eq!(price.mul_amount(Amount::new(10), Rounding::Down).ok(), Some(Amount::new(20)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(U64F64);

impl Price {
    /// Zero price, used for pools without reserves.
    pub const ZERO: Self = Self(U64F64::from_bits(0));

    /// Price of exactly one.
    pub const ONE: Self = Self(U64F64::from_bits(1u128 << FRAC_BITS));

    /// Wraps a raw fixed-point value.
    #[must_use]
    pub const fn from_fixed(value: U64F64) -> Self {
        Self(value)
    }

    /// Returns the raw fixed-point value.
    #[must_use]
    pub const fn to_fixed(self) -> U64F64 {
        self.0
    }

    /// Returns the raw bit pattern (value × 2⁶⁴).
    #[must_use]
    pub const fn to_bits(self) -> u128 {
        self.0.to_bits()
    }

    /// Returns `true` for a zero price.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.to_bits() == 0
    }

    /// Builds `numerator / denominator`, rounded down to the nearest
    /// representable value.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DivisionByZero`] if `denominator` is zero.
    /// - [`AmmError::Overflow`] if the ratio is `2⁶⁴` or more.
    pub fn from_ratio(numerator: u128, denominator: u128) -> crate::error::Result<Self> {
        if denominator == 0 {
            return Err(AmmError::DivisionByZero);
        }
        let scaled = U256::from(numerator) << FRAC_BITS;
        let bits = narrow(
            div_u256(scaled, U256::from(denominator), Rounding::Down)?,
            "price ratio overflow",
        )?;
        Ok(Self(U64F64::from_bits(bits)))
    }

    /// Builds a price from two amounts: `quote / base`.
    ///
    /// # Errors
    ///
    /// See [`from_ratio`](Self::from_ratio).
    pub fn from_amounts(quote: Amount, base: Amount) -> crate::error::Result<Self> {
        Self::from_ratio(quote.get(), base.get())
    }

    /// Converts a base amount to the quote denomination: `amount × price`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result exceeds `u128`.
    pub fn mul_amount(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        mul_div(amount.get(), self.to_bits(), 1u128 << FRAC_BITS, rounding).map(Amount::new)
    }

    /// Converts a quote amount to the base denomination: `amount / price`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DivisionByZero`] if the price is zero.
    /// - [`AmmError::Overflow`] if the result exceeds `u128`.
    pub fn div_amount(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        mul_div(amount.get(), 1u128 << FRAC_BITS, self.to_bits(), rounding).map(Amount::new)
    }

    /// Reciprocal price (`1 / self`), rounded down.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DivisionByZero`] if the price is zero.
    /// - [`AmmError::Overflow`] if the reciprocal is `2⁶⁴` or more.
    pub fn inverse(&self) -> crate::error::Result<Self> {
        if self.is_zero() {
            return Err(AmmError::DivisionByZero);
        }
        let one_squared = U256::ONE << (2 * FRAC_BITS);
        let bits = narrow(
            div_u256(one_squared, U256::from(self.to_bits()), Rounding::Down)?,
            "inverse price overflow",
        )?;
        Ok(Self(U64F64::from_bits(bits)))
    }

    /// Absolute relative deviation from `reference` in basis points,
    /// rounded down and saturating at `u32::MAX`.
    ///
    /// A zero reference yields zero: there is nothing to deviate from.
    #[must_use]
    pub fn deviation_bps(&self, reference: &Self) -> u32 {
        let reference_bits = reference.to_bits();
        if reference_bits == 0 {
            return 0;
        }
        let diff = self.to_bits().abs_diff(reference_bits);
        let scaled = U256::from(diff) * U256::from(10_000u32) / U256::from(reference_bits);
        if scaled > U256::from(u32::MAX) {
            u32::MAX
        } else {
            scaled.as_u32()
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U64F64::from_str(s)
            .map(Self)
            .map_err(|_| AmmError::InvalidPrice("not a decimal price"))
    }
}

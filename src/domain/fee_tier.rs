//! Swap fee tiers built on [`BasisPoints`].

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, BasisPoints, Rounding};
use crate::error::AmmError;

/// A pool's swap fee, wrapping [`BasisPoints`] with the three presets
/// the exchange offers.
///
/// The total fee is charged on the input amount (rounded up). It is then
/// split between liquidity providers and the protocol by
/// [`split`](Self::split).
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Amount, BasisPoints, FeeTier, Rounding};
///
/// let tier = FeeTier::STANDARD;
/// let fee = tier.fee_on(Amount::new(1_000)).ok();
/// assert_eq!(fee, Some(Amount::new(3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "BasisPoints", into = "BasisPoints")]
pub struct FeeTier(BasisPoints);

/// Result of splitting a collected fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Portion retained in the reserves for liquidity providers.
    pub lp: Amount,
    /// Portion set aside for the protocol.
    pub protocol: Amount,
}

impl FeeTier {
    /// 0.05% fee: correlated or stable pairs.
    pub const LOW: Self = Self(BasisPoints::new(5));

    /// 0.30% fee: standard volatile pairs.
    pub const STANDARD: Self = Self(BasisPoints::new(30));

    /// 1.00% fee: exotic, high-volatility pairs.
    pub const HIGH: Self = Self(BasisPoints::new(100));

    /// Upper bound accepted by [`new`](Self::new).
    pub const MAX: BasisPoints = BasisPoints::new(1_000);

    /// Creates a fee tier from arbitrary basis points.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidParams`] if the fee exceeds 10%.
    pub const fn new(basis_points: BasisPoints) -> crate::error::Result<Self> {
        if basis_points.get() > Self::MAX.get() {
            return Err(AmmError::InvalidParams("fee tier above 10%"));
        }
        Ok(Self(basis_points))
    }

    /// Returns the underlying [`BasisPoints`].
    #[must_use]
    pub const fn basis_points(&self) -> BasisPoints {
        self.0
    }

    /// Returns `true` for one of the preset tiers.
    #[must_use]
    pub const fn is_standard(&self) -> bool {
        matches!(self.0.get(), 5 | 30 | 100)
    }

    /// Total fee on `amount_in`, rounded up in favour of the pool.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the intermediate product overflows.
    pub fn fee_on(&self, amount_in: Amount) -> crate::error::Result<Amount> {
        self.0.apply(amount_in, Rounding::Up)
    }

    /// Splits a collected fee; the protocol receives
    /// `floor(fee × protocol_share / 10 000)` and LPs keep the rest.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidParams`] if `protocol_share` exceeds 100%.
    pub fn split(fee: Amount, protocol_share: BasisPoints) -> crate::error::Result<FeeSplit> {
        if !protocol_share.is_valid_percent() {
            return Err(AmmError::InvalidParams("protocol fee share above 100%"));
        }
        let protocol = protocol_share.apply(fee, Rounding::Down)?;
        let lp = fee
            .checked_sub(&protocol)
            .ok_or(AmmError::Underflow("lp fee underflow"))?;
        Ok(FeeSplit { lp, protocol })
    }
}

impl TryFrom<BasisPoints> for FeeTier {
    type Error = AmmError;

    fn try_from(value: BasisPoints) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeeTier> for BasisPoints {
    fn from(value: FeeTier) -> Self {
        value.0
    }
}

impl Default for FeeTier {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeeTier({})", self.0)
    }
}

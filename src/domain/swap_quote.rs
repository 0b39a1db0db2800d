//! Outcome of a swap computation.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, BasisPoints, FeeSplit, Price, Rounding};
use crate::error::AmmError;

/// The outcome of a swap computation: amounts exchanged, fee split and
/// price impact.
///
/// Produced identically by simulation and execution, so a simulated
/// quote is byte-for-byte the result the swap would commit.
///
/// # Invariants
///
/// - `amount_in > 0` and `amount_out > 0`.
/// - `fee.lp + fee.protocol < amount_in`.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Amount, FeeSplit, SwapQuote};
///
/// let fee = FeeSplit { lp: Amount::new(3), protocol: Amount::ZERO };
/// let quote = SwapQuote::new(Amount::new(1_000), Amount::new(990), fee);
/// assert!(quote.is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapQuote {
    amount_in: Amount,
    amount_out: Amount,
    lp_fee: Amount,
    protocol_fee: Amount,
    price_impact: BasisPoints,
}

impl SwapQuote {
    /// Creates a new `SwapQuote` with validated invariants and zero
    /// price impact.
    ///
    /// # Errors
    ///
    /// - [`AmmError::ZeroAmount`] if `amount_in` is zero.
    /// - [`AmmError::InsufficientLiquidity`] if `amount_out` is zero.
    /// - [`AmmError::InvalidAmount`] if the fee consumes the whole input.
    pub const fn new(
        amount_in: Amount,
        amount_out: Amount,
        fee: FeeSplit,
    ) -> crate::error::Result<Self> {
        if amount_in.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        if amount_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        let Some(total_fee) = fee.lp.checked_add(&fee.protocol) else {
            return Err(AmmError::Overflow("fee total overflow"));
        };
        if total_fee.get() >= amount_in.get() {
            return Err(AmmError::InvalidAmount("fee must be less than amount_in"));
        }
        Ok(Self {
            amount_in,
            amount_out,
            lp_fee: fee.lp,
            protocol_fee: fee.protocol,
            price_impact: BasisPoints::ZERO,
        })
    }

    /// Returns a copy carrying the given price impact.
    #[must_use]
    pub const fn with_price_impact(mut self, impact: BasisPoints) -> Self {
        self.price_impact = impact;
        self
    }

    /// Returns the input amount.
    #[must_use]
    pub const fn amount_in(&self) -> Amount {
        self.amount_in
    }

    /// Returns the output amount.
    #[must_use]
    pub const fn amount_out(&self) -> Amount {
        self.amount_out
    }

    /// Returns the total fee charged on the input.
    #[must_use]
    pub const fn fee(&self) -> Amount {
        Amount::new(self.lp_fee.get() + self.protocol_fee.get())
    }

    /// Returns the fee portion retained in the reserves.
    #[must_use]
    pub const fn lp_fee(&self) -> Amount {
        self.lp_fee
    }

    /// Returns the fee portion set aside for the protocol.
    #[must_use]
    pub const fn protocol_fee(&self) -> Amount {
        self.protocol_fee
    }

    /// Returns the execution price impact.
    #[must_use]
    pub const fn price_impact(&self) -> BasisPoints {
        self.price_impact
    }

    /// Realized price as `amount_out / amount_in`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the ratio is not representable.
    pub fn effective_price(&self) -> crate::error::Result<Price> {
        Price::from_amounts(self.amount_out, self.amount_in)
    }

    /// Minimum acceptable output for a maximum slippage tolerance:
    /// `floor(amount_out × (10 000 − slippage) / 10 000)`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidParams`] if `slippage` exceeds 100%.
    pub fn min_out_with_slippage(&self, slippage: BasisPoints) -> crate::error::Result<Amount> {
        let keep = slippage
            .complement()
            .ok_or(AmmError::InvalidParams("slippage above 100%"))?;
        keep.apply(self.amount_out, Rounding::Down)
    }
}

impl fmt::Display for SwapQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwapQuote(in={}, out={}, fee={}, impact={})",
            self.amount_in,
            self.amount_out,
            self.fee(),
            self.price_impact
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn split(lp: u128, protocol: u128) -> FeeSplit {
        FeeSplit {
            lp: Amount::new(lp),
            protocol: Amount::new(protocol),
        }
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn valid_quote() {
        let Ok(q) = SwapQuote::new(Amount::new(1_000), Amount::new(1_992), split(3, 0)) else {
            panic!("expected Ok");
        };
        assert_eq!(q.amount_in(), Amount::new(1_000));
        assert_eq!(q.amount_out(), Amount::new(1_992));
        assert_eq!(q.fee(), Amount::new(3));
        assert_eq!(q.price_impact(), BasisPoints::ZERO);
    }

    #[test]
    fn zero_amounts_rejected() {
        assert_eq!(
            SwapQuote::new(Amount::ZERO, Amount::new(1), split(0, 0)),
            Err(AmmError::ZeroAmount)
        );
        assert_eq!(
            SwapQuote::new(Amount::new(1), Amount::ZERO, split(0, 0)),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn fee_must_be_below_input() {
        assert!(SwapQuote::new(Amount::new(100), Amount::new(50), split(60, 40)).is_err());
        assert!(SwapQuote::new(Amount::new(100), Amount::new(50), split(60, 39)).is_ok());
    }

    // -- Derived values -----------------------------------------------------

    #[test]
    fn fee_split_is_preserved() {
        let Ok(q) = SwapQuote::new(Amount::new(10_000), Amount::new(9_000), split(25, 5)) else {
            panic!("expected Ok");
        };
        assert_eq!(q.lp_fee(), Amount::new(25));
        assert_eq!(q.protocol_fee(), Amount::new(5));
        assert_eq!(q.fee(), Amount::new(30));
    }

    #[test]
    fn slippage_floor() {
        let Ok(q) = SwapQuote::new(Amount::new(1_000), Amount::new(1_992), split(3, 0)) else {
            panic!("expected Ok");
        };
        // 1992 × 0.99 = 1972.08
        assert_eq!(
            q.min_out_with_slippage(BasisPoints::new(100)).ok(),
            Some(Amount::new(1_972))
        );
        assert!(q.min_out_with_slippage(BasisPoints::new(10_001)).is_err());
    }

    #[test]
    fn effective_price() {
        let Ok(q) = SwapQuote::new(Amount::new(100), Amount::new(200), split(1, 0)) else {
            panic!("expected Ok");
        };
        assert_eq!(q.effective_price().ok(), Price::from_ratio(2, 1).ok());
    }

    #[test]
    fn display() {
        let Ok(q) = SwapQuote::new(Amount::new(100), Amount::new(90), split(3, 0)) else {
            panic!("expected Ok");
        };
        let q = q.with_price_impact(BasisPoints::new(12));
        assert_eq!(q.to_string(), "SwapQuote(in=100, out=90, fee=3, impact=12bp)");
    }
}

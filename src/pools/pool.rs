//! Constant-product pool state and swap math.
//!
//! The swap invariant is `x × y = k` where `x` and `y` are the reserves
//! of the two denoms. Fees are deducted from the input amount **before**
//! the pricing formula is applied.
//!
//! # Swap Algorithm (token in → token out)
//!
//! 1. `fee = ceil(amount_in × fee_bps / 10 000)`
//! 2. `net_input = amount_in − fee`
//! 3. `amount_out = floor(reserve_out × net_input / (reserve_in + net_input))`
//! 4. `protocol_fee = floor(fee × protocol_share / 10 000)`
//! 5. `reserve_in += amount_in − protocol_fee` (LP fee stays in the pool)
//! 6. `reserve_out −= amount_out`
//!
//! Step 3 equals `reserve_out − ceil(k / (reserve_in + net_input))`, so the
//! rounding always favours the pool.
//!
//! # Invariant
//!
//! After every swap `k_after ≥ k_before`, because the LP fee component
//! increases the input reserve without a corresponding output.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use crate::breaker::CircuitBreaker;
use crate::config::EngineParams;
use crate::domain::{
    Amount, BasisPoints, BlockContext, Denom, DenomPair, FeeTier, MAX_BPS, PoolId, Price,
    Rounding, Shares, SwapQuote,
};
use crate::error::AmmError;
use crate::guard::ReserveSnapshot;
use crate::math::{CheckedArithmetic, mul_div, wide_product};

/// A constant-product liquidity pool for one canonical denom pair.
///
/// # State
///
/// - `reserve_a` / `reserve_b`: balances backing the price, LP fees included
/// - `total_shares`: outstanding LP shares; zero iff both reserves are zero
/// - `lp_fees_*` / `protocol_fees_*`: lifetime fee counters; protocol fees
///   are held in escrow outside the reserves until withdrawn
/// - `breaker`: circuit-breaker state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    id: PoolId,
    pair: DenomPair,
    reserve_a: Amount,
    reserve_b: Amount,
    total_shares: Shares,
    fee_tier: FeeTier,
    lp_fees_a: Amount,
    lp_fees_b: Amount,
    protocol_fees_a: Amount,
    protocol_fees_b: Amount,
    breaker: CircuitBreaker,
    last_price: Price,
    created_at: u64,
}

/// Which side of the pair an input denom is on, with the matching reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    /// `true` when the input is token A.
    pub a_to_b: bool,
    /// Reserve of the input denom.
    pub reserve_in: Amount,
    /// Reserve of the output denom.
    pub reserve_out: Amount,
}

impl Pool {
    /// Creates an empty pool. Reserves arrive with the first deposit.
    #[must_use]
    pub const fn new(id: PoolId, pair: DenomPair, fee_tier: FeeTier, block: BlockContext) -> Self {
        Self {
            id,
            pair,
            reserve_a: Amount::ZERO,
            reserve_b: Amount::ZERO,
            total_shares: Shares::ZERO,
            fee_tier,
            lp_fees_a: Amount::ZERO,
            lp_fees_b: Amount::ZERO,
            protocol_fees_a: Amount::ZERO,
            protocol_fees_b: Amount::ZERO,
            breaker: CircuitBreaker::new(Price::ZERO, block.time),
            last_price: Price::ZERO,
            created_at: block.height,
        }
    }

    /// Returns the pool id.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Returns the canonical denom pair.
    #[must_use]
    pub const fn pair(&self) -> &DenomPair {
        &self.pair
    }

    /// Returns the reserve of token A.
    #[must_use]
    pub const fn reserve_a(&self) -> Amount {
        self.reserve_a
    }

    /// Returns the reserve of token B.
    #[must_use]
    pub const fn reserve_b(&self) -> Amount {
        self.reserve_b
    }

    /// Returns the outstanding LP shares.
    #[must_use]
    pub const fn total_shares(&self) -> Shares {
        self.total_shares
    }

    /// Returns the fee tier.
    #[must_use]
    pub const fn fee_tier(&self) -> FeeTier {
        self.fee_tier
    }

    /// Lifetime LP fees as `(a, b)`.
    #[must_use]
    pub const fn lp_fees(&self) -> (Amount, Amount) {
        (self.lp_fees_a, self.lp_fees_b)
    }

    /// Unwithdrawn protocol fees as `(a, b)`.
    #[must_use]
    pub const fn protocol_fees(&self) -> (Amount, Amount) {
        (self.protocol_fees_a, self.protocol_fees_b)
    }

    /// Returns the circuit breaker.
    #[must_use]
    pub const fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Returns the circuit breaker for mutation.
    pub fn breaker_mut(&mut self) -> &mut CircuitBreaker {
        &mut self.breaker
    }

    /// Price recorded after the most recent committed swap.
    #[must_use]
    pub const fn last_price(&self) -> Price {
        self.last_price
    }

    /// Height of the creating block.
    #[must_use]
    pub const fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Current reserves and share supply.
    #[must_use]
    pub const fn snapshot(&self) -> ReserveSnapshot {
        ReserveSnapshot {
            reserve_a: self.reserve_a,
            reserve_b: self.reserve_b,
            total_shares: self.total_shares,
        }
    }

    /// `reserve_a × reserve_b`.
    #[must_use]
    pub fn product(&self) -> U256 {
        wide_product(self.reserve_a.get(), self.reserve_b.get())
    }

    /// Spot price as token B per token A; zero for an empty pool.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the ratio is `2⁶⁴` or more.
    pub fn price(&self) -> crate::error::Result<Price> {
        if self.reserve_a.is_zero() {
            return Ok(Price::ZERO);
        }
        Price::from_amounts(self.reserve_b, self.reserve_a)
    }

    /// Resolves `denom_in` to a swap direction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidDenom`] if `denom_in` is not in the pair.
    pub fn direction(&self, denom_in: &Denom) -> crate::error::Result<Direction> {
        let a_to_b = self.pair.is_a_to_b(denom_in)?;
        let (reserve_in, reserve_out) = if a_to_b {
            (self.reserve_a, self.reserve_b)
        } else {
            (self.reserve_b, self.reserve_a)
        };
        Ok(Direction {
            a_to_b,
            reserve_in,
            reserve_out,
        })
    }

    /// Computes an exact-in swap without mutating the pool.
    ///
    /// Enforces the swap-size and price-impact caps from `params`; pause
    /// and deadline checks belong to the caller, which knows the block.
    ///
    /// # Errors
    ///
    /// - [`AmmError::ZeroAmount`] if `amount_in` is zero.
    /// - [`AmmError::InvalidDenom`] if `denom_in` is not in the pair.
    /// - [`AmmError::InsufficientLiquidity`] if a reserve is empty or the
    ///   output rounds to zero.
    /// - [`AmmError::SwapTooLarge`] if `amount_in` exceeds the size cap.
    /// - [`AmmError::PriceImpactTooHigh`] if the impact exceeds its cap.
    pub fn quote_exact_in(
        &self,
        denom_in: &Denom,
        amount_in: Amount,
        params: &EngineParams,
    ) -> crate::error::Result<SwapQuote> {
        if amount_in.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        let Direction {
            reserve_in,
            reserve_out,
            ..
        } = self.direction(denom_in)?;
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let max_in = params.max_swap_size.apply(reserve_in, Rounding::Down)?;
        if amount_in > max_in {
            return Err(AmmError::SwapTooLarge {
                amount_in,
                max_bps: params.max_swap_size.get(),
            });
        }

        let fee = self.fee_tier.fee_on(amount_in)?;
        let split = FeeTier::split(fee, params.protocol_fee_share)?;
        let net_input = amount_in.safe_sub(&fee)?;
        let denominator = reserve_in.safe_add(&net_input)?;
        let amount_out = Amount::new(mul_div(
            reserve_out.get(),
            net_input.get(),
            denominator.get(),
            Rounding::Down,
        )?);
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }
        let quote = SwapQuote::new(amount_in, amount_out, split)?;

        let impact = price_impact(amount_in, amount_out, reserve_in, reserve_out)?;
        if impact > params.max_price_impact {
            return Err(AmmError::PriceImpactTooHigh {
                impact_bps: impact.get(),
                max_bps: params.max_price_impact.get(),
            });
        }
        Ok(quote.with_price_impact(impact))
    }

    /// Commits a quote produced by [`quote_exact_in`](Self::quote_exact_in)
    /// on this same state.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidDenom`] if `denom_in` is not in the pair.
    /// - [`AmmError::Overflow`] / [`AmmError::Underflow`] on reserve arithmetic.
    pub fn apply_swap(&mut self, denom_in: &Denom, quote: &SwapQuote) -> crate::error::Result<()> {
        let Direction {
            a_to_b,
            reserve_in,
            reserve_out,
        } = self.direction(denom_in)?;
        let retained = quote.amount_in().safe_sub(&quote.protocol_fee())?;
        let new_in = reserve_in.safe_add(&retained)?;
        let new_out = reserve_out.safe_sub(&quote.amount_out())?;
        if a_to_b {
            self.reserve_a = new_in;
            self.reserve_b = new_out;
            self.lp_fees_a = self.lp_fees_a.safe_add(&quote.lp_fee())?;
            self.protocol_fees_a = self.protocol_fees_a.safe_add(&quote.protocol_fee())?;
        } else {
            self.reserve_b = new_in;
            self.reserve_a = new_out;
            self.lp_fees_b = self.lp_fees_b.safe_add(&quote.lp_fee())?;
            self.protocol_fees_b = self.protocol_fees_b.safe_add(&quote.protocol_fee())?;
        }
        self.last_price = self.price()?;
        Ok(())
    }

    /// Adds reserves and mints shares.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if a reserve or the supply overflows.
    pub fn deposit(
        &mut self,
        amount_a: Amount,
        amount_b: Amount,
        minted: Shares,
    ) -> crate::error::Result<()> {
        self.reserve_a = self.reserve_a.safe_add(&amount_a)?;
        self.reserve_b = self.reserve_b.safe_add(&amount_b)?;
        self.total_shares = self.total_shares.safe_add(&minted)?;
        self.last_price = self.price()?;
        Ok(())
    }

    /// Removes reserves and burns shares.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if a reserve or the supply underflows.
    pub fn withdraw(
        &mut self,
        amount_a: Amount,
        amount_b: Amount,
        burned: Shares,
    ) -> crate::error::Result<()> {
        self.reserve_a = self.reserve_a.safe_sub(&amount_a)?;
        self.reserve_b = self.reserve_b.safe_sub(&amount_b)?;
        self.total_shares = self.total_shares.safe_sub(&burned)?;
        self.last_price = self.price()?;
        Ok(())
    }

    /// Zeroes the protocol fee counters and returns what they held.
    pub fn take_protocol_fees(&mut self) -> (Amount, Amount) {
        let taken = (self.protocol_fees_a, self.protocol_fees_b);
        self.protocol_fees_a = Amount::ZERO;
        self.protocol_fees_b = Amount::ZERO;
        taken
    }
}

/// Execution price impact in basis points, rounded up:
/// `1 − (amount_out / reserve_out) / (amount_in / reserve_in)`.
///
/// Includes the fee, so a tiny swap reports roughly the fee rate.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `amount_in` or `reserve_out` is zero.
pub fn price_impact(
    amount_in: Amount,
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> crate::error::Result<BasisPoints> {
    let denominator = wide_product(amount_in.get(), reserve_out.get());
    if denominator == U256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    let numerator = wide_product(amount_out.get(), reserve_in.get());
    let full = U256::from(MAX_BPS);
    let kept = match numerator.checked_mul(full) {
        Some(scaled) => scaled / denominator,
        None => full,
    };
    let kept = if kept > full { MAX_BPS } else { kept.as_u32() };
    Ok(BasisPoints::new(MAX_BPS - kept))
}

//! Constant-product invariant guard.
//!
//! Every mutating pool operation passes its hypothetical post-state
//! through [`InvariantGuard`] before anything is committed. The guard
//! accepts the operation only if
//!
//! ```text
//! floor × k_ref ≤ k_post ≤ ceiling × k_ref
//! ```
//!
//! where `k_ref` is the pre-operation product for swaps and the product
//! rescaled by `(shares_after / shares_before)²` for liquidity changes,
//! i.e. liquidity changes are checked per LP share.
//!
//! Liquidity changes are held to the floor only. Share minting and
//! redemption both round toward the pool, so the per-share product of
//! the remaining holders can only grow, and by a large factor once the
//! remaining supply is small.
//!
//! A post-state inside the band but within `near_miss_margin` of either
//! edge is accepted and reported as a [`Verdict::NearMiss`], which the
//! caller feeds to the pool's circuit breaker.

use ethnum::U256;
use tracing::debug;

use crate::config::EngineParams;
use crate::domain::{Amount, BasisPoints, MAX_BPS, Shares};
use crate::error::AmmError;
use crate::math::{scale_u256, wide_product};

/// Reserves and share supply of a pool at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveSnapshot {
    /// Reserve of token A.
    pub reserve_a: Amount,
    /// Reserve of token B.
    pub reserve_b: Amount,
    /// Outstanding LP shares.
    pub total_shares: Shares,
}

impl ReserveSnapshot {
    /// `reserve_a × reserve_b`.
    #[must_use]
    pub fn product(&self) -> U256 {
        wide_product(self.reserve_a.get(), self.reserve_b.get())
    }

    /// Returns `true` if either reserve is empty.
    #[must_use]
    pub const fn is_drained(&self) -> bool {
        self.reserve_a.is_zero() || self.reserve_b.is_zero()
    }
}

/// Outcome of an accepted invariant check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Comfortably inside the band.
    Clear,
    /// Inside the band, but close to an edge.
    NearMiss,
    /// Not evaluated: bootstrap deposit or full withdrawal.
    Skipped,
}

/// Band check on the constant product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvariantGuard {
    floor: BasisPoints,
    ceiling: BasisPoints,
    margin: BasisPoints,
}

impl InvariantGuard {
    /// Creates a guard with explicit bounds.
    #[must_use]
    pub const fn new(floor: BasisPoints, ceiling: BasisPoints, margin: BasisPoints) -> Self {
        Self {
            floor,
            ceiling,
            margin,
        }
    }

    /// Creates a guard from the block's parameter snapshot.
    #[must_use]
    pub const fn from_params(params: &EngineParams) -> Self {
        Self::new(
            params.invariant_floor,
            params.invariant_ceiling,
            params.near_miss_margin,
        )
    }

    /// Checks `post_k` against the band around `pre_k`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvariantViolation`] if `post_k` is outside the band.
    /// - [`AmmError::Overflow`] if a bound is not representable.
    pub fn check(&self, pre_k: U256, post_k: U256) -> crate::error::Result<Verdict> {
        self.evaluate(pre_k, post_k, true)
    }

    /// Checks `post_k` against the floor around `pre_k` only.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn check_floor(&self, pre_k: U256, post_k: U256) -> crate::error::Result<Verdict> {
        self.evaluate(pre_k, post_k, false)
    }

    fn evaluate(&self, pre_k: U256, post_k: U256, capped: bool) -> crate::error::Result<Verdict> {
        let bps = U256::from(MAX_BPS);
        let lower = scale_u256(pre_k, U256::from(self.floor.get()), bps)?;
        let upper = scale_u256(pre_k, U256::from(self.ceiling.get()), bps)?;
        if post_k < lower || (capped && post_k > upper) {
            return Err(AmmError::InvariantViolation {
                pre_k: pre_k.to_string(),
                post_k: post_k.to_string(),
            });
        }
        let margin = U256::from(self.margin.get());
        let near_lower = scale_u256(lower, bps + margin, bps)?;
        let inner = if margin > bps { U256::ZERO } else { bps - margin };
        let near_upper = scale_u256(upper, inner, bps)?;
        if post_k < near_lower || (capped && post_k > near_upper) {
            debug!(pre_k = %pre_k, post_k = %post_k, "invariant near miss");
            return Ok(Verdict::NearMiss);
        }
        Ok(Verdict::Clear)
    }

    /// Checks a swap: the product itself must stay inside the band.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn check_swap(
        &self,
        pre: &ReserveSnapshot,
        post: &ReserveSnapshot,
    ) -> crate::error::Result<Verdict> {
        self.check(pre.product(), post.product())
    }

    /// Checks a liquidity change per LP share, against the floor only.
    ///
    /// Bootstrap deposits (no prior shares) and withdrawals that drain the
    /// pool have no meaningful reference and are skipped.
    ///
    /// # Errors
    ///
    /// See [`check`](Self::check).
    pub fn check_liquidity(
        &self,
        pre: &ReserveSnapshot,
        post: &ReserveSnapshot,
    ) -> crate::error::Result<Verdict> {
        if pre.total_shares.is_zero() || pre.is_drained() || post.is_drained() {
            return Ok(Verdict::Skipped);
        }
        let before = U256::from(pre.total_shares.get());
        let after = U256::from(post.total_shares.get());
        let expected = scale_u256(scale_u256(pre.product(), after, before)?, after, before)?;
        self.check_floor(expected, post.product())
    }
}

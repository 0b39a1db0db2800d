//! Pool creation and pool queries.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use super::Engine;
use super::msgs::{LiquidityReceipt, MsgCreatePool};
use crate::breaker::BreakerStatus;
use crate::domain::{Amount, Denom, FeeTier, Page, PoolId, Price, resolve_limit};
use crate::pools::Pool;
use crate::traits::{Bank, BlockClock, ParamSource};

/// Aggregated view of one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Pool id.
    pub pool_id: PoolId,
    /// Token B per token A.
    pub price_a_to_b: Price,
    /// Token A per token B; zero for an empty pool.
    pub price_b_to_a: Price,
    /// `reserve_a × reserve_b`, as a decimal string.
    pub k: String,
    /// `reserve_a + reserve_b` in raw units, saturating.
    pub tvl: Amount,
    /// Lifetime LP fees `(a, b)`.
    pub lp_fees: (Amount, Amount),
    /// Unwithdrawn protocol fees `(a, b)`.
    pub protocol_fees: (Amount, Amount),
    /// Number of LP positions.
    pub positions: usize,
    /// Breaker status at the current block time.
    pub breaker_status: BreakerStatus,
}

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Creates a pool, seeding it with the creator's deposit.
    ///
    /// The fee tier defaults to the governance default when the message
    /// carries none.
    ///
    /// # Errors
    ///
    /// - [`AmmError::ZeroAmount`](crate::error::AmmError::ZeroAmount) for a zero deposit.
    /// - [`AmmError::InvalidDenom`](crate::error::AmmError::InvalidDenom) for identical denoms.
    /// - [`AmmError::DuplicatePool`](crate::error::AmmError::DuplicatePool) if the pair exists.
    /// - [`AmmError::InsufficientLiquidity`](crate::error::AmmError::InsufficientLiquidity)
    ///   if the seed mints fewer than `min_initial_shares`.
    /// - [`AmmError::InsufficientFunds`](crate::error::AmmError::InsufficientFunds).
    pub fn create_pool(&mut self, msg: MsgCreatePool) -> crate::error::Result<LiquidityReceipt> {
        self.atomic("create_pool", |tx| tx.create_pool(&msg))
    }

    /// [`create_pool`](Self::create_pool) with an explicit fee tier.
    ///
    /// # Errors
    ///
    /// As [`create_pool`](Self::create_pool).
    pub fn create_pool_with_fee(
        &mut self,
        mut msg: MsgCreatePool,
        fee_tier: FeeTier,
    ) -> crate::error::Result<LiquidityReceipt> {
        msg.fee_tier = Some(fee_tier);
        self.create_pool(msg)
    }

    /// Returns the pool with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`](crate::error::AmmError::PoolNotFound).
    pub fn get_pool(&self, id: PoolId) -> crate::error::Result<&Pool> {
        self.state.pools.get(id)
    }

    /// Returns the pool for a pair, in either order.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PairNotFound`](crate::error::AmmError::PairNotFound).
    pub fn get_pool_by_tokens(&self, a: &Denom, b: &Denom) -> crate::error::Result<&Pool> {
        self.state.pools.get_by_denoms(a, b)
    }

    /// Pools in id order after `cursor`; a `limit` of zero means the cap.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PageLimitExceeded`](crate::error::AmmError::PageLimitExceeded)
    /// if `limit` exceeds `max_page_size`.
    pub fn list_pools(&self, cursor: Option<PoolId>, limit: u32) -> crate::error::Result<Page<Pool>> {
        let limit = resolve_limit(limit, self.params.max_page_size)?;
        Ok(self.state.pools.page(cursor, limit))
    }

    /// Prices, product, value locked, fees, positions and breaker status.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`](crate::error::AmmError::PoolNotFound).
    /// - [`AmmError::Overflow`](crate::error::AmmError::Overflow) if a price
    ///   is not representable.
    pub fn get_pool_stats(&self, id: PoolId) -> crate::error::Result<PoolStats> {
        let pool = self.state.pools.get(id)?;
        let price_a_to_b = pool.price()?;
        let price_b_to_a = if price_a_to_b.is_zero() {
            Price::ZERO
        } else {
            Price::from_amounts(pool.reserve_a(), pool.reserve_b())?
        };
        let k: U256 = pool.product();
        Ok(PoolStats {
            pool_id: id,
            price_a_to_b,
            price_b_to_a,
            k: k.to_string(),
            tvl: Amount::new(pool.reserve_a().get().saturating_add(pool.reserve_b().get())),
            lp_fees: pool.lp_fees(),
            protocol_fees: pool.protocol_fees(),
            positions: self.state.positions.for_pool(id).count(),
            breaker_status: pool.breaker().status_at(self.block.time),
        })
    }
}

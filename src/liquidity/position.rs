//! LP positions and the book that holds them.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::domain::{Address, PoolId, Shares};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;

/// Shares one provider holds in one pool.
///
/// # Invariants
///
/// - `shares > 0`: a position whose shares reach zero is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPosition {
    owner: Address,
    pool_id: PoolId,
    shares: Shares,
    last_deposit_height: u64,
}

impl LiquidityPosition {
    /// Returns the provider.
    #[must_use]
    pub const fn owner(&self) -> &Address {
        &self.owner
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Returns the shares held.
    #[must_use]
    pub const fn shares(&self) -> Shares {
        self.shares
    }

    /// Height of the most recent deposit.
    #[must_use]
    pub const fn last_deposit_height(&self) -> u64 {
        self.last_deposit_height
    }

    /// First height at which the shares may be withdrawn.
    #[must_use]
    pub const fn unlocked_at(&self, lock_blocks: u64) -> u64 {
        self.last_deposit_height.saturating_add(lock_blocks)
    }
}

/// All LP positions, keyed by `(pool, owner)` so that one pool's
/// positions are contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionBook {
    #[serde(with = "crate::domain::entries")]
    positions: BTreeMap<(PoolId, Address), LiquidityPosition>,
}

impl PositionBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the position of `owner` in `pool_id`, if any.
    #[must_use]
    pub fn get(&self, pool_id: PoolId, owner: &Address) -> Option<&LiquidityPosition> {
        self.positions.get(&(pool_id, owner.clone()))
    }

    /// Adds freshly minted shares and restarts the withdrawal lock.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the holding overflows.
    pub fn credit(
        &mut self,
        pool_id: PoolId,
        owner: &Address,
        minted: Shares,
        height: u64,
    ) -> crate::error::Result<()> {
        let position = self
            .positions
            .entry((pool_id, owner.clone()))
            .or_insert_with(|| LiquidityPosition {
                owner: owner.clone(),
                pool_id,
                shares: Shares::ZERO,
                last_deposit_height: height,
            });
        position.shares = position.shares.safe_add(&minted)?;
        position.last_deposit_height = height;
        Ok(())
    }

    /// Burns shares from a position, removing it when emptied.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PositionNotFound`] if `owner` holds nothing in the pool.
    /// - [`AmmError::LiquidityLocked`] if the last deposit is younger than
    ///   `lock_blocks`.
    /// - [`AmmError::InsufficientShares`] if `burned` exceeds the holding.
    pub fn debit(
        &mut self,
        pool_id: PoolId,
        owner: &Address,
        burned: Shares,
        height: u64,
        lock_blocks: u64,
    ) -> crate::error::Result<()> {
        let key = (pool_id, owner.clone());
        let position = self
            .positions
            .get_mut(&key)
            .ok_or(AmmError::PositionNotFound(pool_id))?;
        let unlocked_at = position.unlocked_at(lock_blocks);
        if height < unlocked_at {
            return Err(AmmError::LiquidityLocked(unlocked_at));
        }
        if burned > position.shares {
            return Err(AmmError::InsufficientShares {
                requested: burned.as_amount(),
                held: position.shares.as_amount(),
            });
        }
        position.shares = position.shares.safe_sub(&burned)?;
        if position.shares.is_zero() {
            self.positions.remove(&key);
        }
        Ok(())
    }

    /// Positions in `pool_id`, in owner order.
    #[must_use]
    pub fn for_pool(&self, pool_id: PoolId) -> impl Iterator<Item = &LiquidityPosition> {
        let start = (pool_id, Address::new(String::new()));
        self.positions
            .range((Bound::Included(start), Bound::Unbounded))
            .take_while(move |((id, _), _)| *id == pool_id)
            .map(|(_, position)| position)
    }

    /// Sum of all shares held in `pool_id`.
    #[must_use]
    pub fn shares_in_pool(&self, pool_id: PoolId) -> u128 {
        self.for_pool(pool_id)
            .fold(0u128, |acc, p| acc.saturating_add(p.shares.get()))
    }
}

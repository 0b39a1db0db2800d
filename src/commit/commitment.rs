//! A single pending swap commitment.

use serde::{Deserialize, Serialize};

use super::CommitmentHash;
use crate::config::EngineParams;
use crate::domain::{Address, Amount, BasisPoints, Denom, PoolId, Rounding};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;

/// A swap committed by hash, waiting for its reveal.
///
/// The reveal is accepted for heights in
/// `[reveal_height, expiry_height]`; afterwards the deposit is forfeited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCommitment {
    hash: CommitmentHash,
    trader: Address,
    pool_id: PoolId,
    commit_height: u64,
    reveal_height: u64,
    expiry_height: u64,
    deposit: Amount,
    deposit_denom: Denom,
}

impl SwapCommitment {
    /// Records a commitment made at `height`, with the window and
    /// deposit taken from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the window ends past `u64::MAX`.
    pub fn new(
        hash: CommitmentHash,
        trader: Address,
        pool_id: PoolId,
        height: u64,
        params: &EngineParams,
    ) -> crate::error::Result<Self> {
        let reveal_height = height
            .checked_add(params.commit_reveal_delay_blocks)
            .ok_or(AmmError::Overflow("reveal height"))?;
        let expiry_height = height
            .checked_add(params.commit_expiry_blocks)
            .ok_or(AmmError::Overflow("commitment expiry height"))?;
        Ok(Self {
            hash,
            trader,
            pool_id,
            commit_height: height,
            reveal_height,
            expiry_height,
            deposit: params.commit_deposit,
            deposit_denom: params.commit_deposit_denom.clone(),
        })
    }

    #[must_use]
    pub const fn hash(&self) -> CommitmentHash {
        self.hash
    }

    #[must_use]
    pub const fn trader(&self) -> &Address {
        &self.trader
    }

    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    #[must_use]
    pub const fn commit_height(&self) -> u64 {
        self.commit_height
    }

    /// First height at which the swap may be revealed.
    #[must_use]
    pub const fn reveal_height(&self) -> u64 {
        self.reveal_height
    }

    /// Last height at which the swap may be revealed.
    #[must_use]
    pub const fn expiry_height(&self) -> u64 {
        self.expiry_height
    }

    #[must_use]
    pub const fn deposit(&self) -> Amount {
        self.deposit
    }

    #[must_use]
    pub const fn deposit_denom(&self) -> &Denom {
        &self.deposit_denom
    }

    /// Returns `true` once `height` is past the reveal window.
    #[must_use]
    pub const fn is_expired_at(&self, height: u64) -> bool {
        height > self.expiry_height
    }

    /// Fails unless `height` lies inside the reveal window.
    ///
    /// # Errors
    ///
    /// [`AmmError::RevealTooEarly`] or [`AmmError::CommitmentExpired`].
    pub fn ensure_revealable(&self, height: u64) -> crate::error::Result<()> {
        if height < self.reveal_height {
            return Err(AmmError::RevealTooEarly {
                earliest: self.reveal_height,
                height,
            });
        }
        if self.is_expired_at(height) {
            return Err(AmmError::CommitmentExpired {
                expiry: self.expiry_height,
                height,
            });
        }
        Ok(())
    }

    /// Splits the deposit of a cancelled commitment into the refund and
    /// the fee. The refund rounds down.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidParams`] for a fee above 100%.
    pub fn cancellation_split(&self, fee: BasisPoints) -> crate::error::Result<(Amount, Amount)> {
        let kept = fee
            .complement()
            .ok_or(AmmError::InvalidParams("cancellation fee must not exceed 100%"))?;
        let refund = kept.apply(self.deposit, Rounding::Down)?;
        let charged = self.deposit.safe_sub(&refund)?;
        Ok((refund, charged))
    }
}

//! Commit-reveal protection for large swaps.
//!
//! A swap whose input exceeds `commit_reveal_threshold` of the pool's
//! smaller reserve cannot be submitted in the clear while commit-reveal is
//! enabled. The trader first commits the SHA-256 digest of a
//! [`SwapIntent`] together with a deposit, then reveals the intent between
//! `commit_reveal_delay_blocks` and `commit_expiry_blocks` later:
//!
//! | Outcome | Deposit |
//! |---------|---------|
//! | Revealed in the window | refunded in full |
//! | Cancelled by the trader | refunded less `commit_cancel_fee` |
//! | Expired | forfeited to the fee collector |

mod book;
mod commitment;
mod hash;

pub use book::CommitmentBook;
pub use commitment::SwapCommitment;
pub use hash::{CommitmentHash, SwapIntent};

use crate::config::EngineParams;
use crate::domain::{Amount, Rounding};
use crate::pools::Pool;

/// Largest input `pool` accepts without a commitment:
/// `floor(min(reserve_a, reserve_b) × commit_reveal_threshold / 10 000)`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) if the
/// scaling overflows.
pub fn commit_threshold(pool: &Pool, params: &EngineParams) -> crate::error::Result<Amount> {
    let smaller = pool.reserve_a().min(pool.reserve_b());
    params.commit_reveal_threshold.apply(smaller, Rounding::Down)
}

/// Returns `true` if a swap of `amount_in` into `pool` must be committed
/// first under `params`.
///
/// # Errors
///
/// As [`commit_threshold`].
pub fn requires_commit(pool: &Pool, amount_in: Amount, params: &EngineParams) -> crate::error::Result<bool> {
    if !params.enable_commit_reveal {
        return Ok(false);
    }
    Ok(amount_in > commit_threshold(pool, params)?)
}

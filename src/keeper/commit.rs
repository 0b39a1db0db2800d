//! Commit-reveal entry points for large swaps.

use tracing::info;

use super::Engine;
use super::msgs::{CommitReceipt, MsgCommitSwap, MsgRevealSwap};
use super::swap::{check_deadline, check_denom_out};
use super::tx::{SwapLeg, Tx};
use crate::commit::{CommitmentHash, SwapCommitment, SwapIntent, requires_commit};
use crate::domain::{Address, Amount, Page, PoolId, SwapQuote, resolve_limit};
use crate::error::AmmError;
use crate::traits::{Bank, BlockClock, ParamSource};

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Records a swap commitment and escrows `commit_deposit` from the
    /// trader.
    ///
    /// # Errors
    ///
    /// `CommitRevealDisabled`, `PoolNotFound`, `DuplicateCommitment` or
    /// `InsufficientFunds` for the deposit.
    pub fn commit_swap(&mut self, msg: MsgCommitSwap) -> crate::error::Result<CommitReceipt> {
        if !self.params.enable_commit_reveal {
            return Err(AmmError::CommitRevealDisabled);
        }
        self.atomic("commit_swap", |tx| {
            tx.state.pools.get(msg.pool_id)?;
            let commitment = SwapCommitment::new(
                msg.commitment_hash,
                msg.trader.clone(),
                msg.pool_id,
                tx.block.height,
                tx.params,
            )?;
            tx.bank.move_funds(
                &msg.trader,
                &Address::commit_escrow(),
                commitment.deposit_denom(),
                commitment.deposit(),
            )?;
            let receipt = CommitReceipt {
                commitment_hash: commitment.hash(),
                reveal_height: commitment.reveal_height(),
                expiry_height: commitment.expiry_height(),
            };
            tx.state.commitments.insert(commitment)?;
            info!(
                trader = %msg.trader,
                pool_id = %msg.pool_id,
                hash = %receipt.commitment_hash,
                reveal_height = receipt.reveal_height,
                expiry_height = receipt.expiry_height,
                "swap committed"
            );
            Ok(receipt)
        })
    }

    /// Reveals a committed swap inside its window, refunds the deposit and
    /// executes the swap without the commit-reveal threshold.
    ///
    /// The commitment is looked up by the hash of the revealed fields, so
    /// any field that differs from the committed one yields
    /// `CommitmentNotFound`.
    ///
    /// # Errors
    ///
    /// - `ZeroAmount`, `DeadlineExceeded`, `CommitmentNotFound`.
    /// - `RevealTooEarly` or `CommitmentExpired` outside the window.
    /// - Any error of [`swap`](Self::swap) except `CommitRequired`.
    ///
    /// On error the commitment and its deposit stay in place.
    pub fn reveal_swap(&mut self, msg: MsgRevealSwap) -> crate::error::Result<SwapQuote> {
        if msg.amount_in.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        check_deadline(msg.deadline, self.block.time)?;
        let hash = SwapIntent {
            trader: &msg.trader,
            pool_id: msg.pool_id,
            denom_in: &msg.denom_in,
            denom_out: &msg.denom_out,
            amount_in: msg.amount_in,
            min_amount_out: msg.min_amount_out,
            salt: &msg.salt,
        }
        .commitment_hash();
        self.atomic("reveal_swap", |tx| {
            let commitment = tx.state.commitments.get(&hash)?;
            if commitment.trader() != &msg.trader {
                return Err(AmmError::NotCommitmentOwner(hash));
            }
            if commitment.pool_id() != msg.pool_id {
                return Err(AmmError::CommitmentMismatch("pool id differs from commitment"));
            }
            commitment.ensure_revealable(tx.block.height)?;
            let commitment = tx.state.commitments.remove(&hash)?;
            tx.bank.move_funds(
                &Address::commit_escrow(),
                &msg.trader,
                commitment.deposit_denom(),
                commitment.deposit(),
            )?;

            let pair = tx.state.pools.get(msg.pool_id)?.pair();
            check_denom_out(pair.other(&msg.denom_in)?, &msg.denom_out)?;
            let quote = tx.swap_leg(SwapLeg {
                pool_id: msg.pool_id,
                denom_in: &msg.denom_in,
                amount_in: msg.amount_in,
                payer: &msg.trader,
                recipient: &msg.trader,
                min_out: msg.min_amount_out,
                gated: false,
            })?;
            info!(
                trader = %msg.trader,
                pool_id = %msg.pool_id,
                hash = %hash,
                commit_height = commitment.commit_height(),
                amount_out = %quote.amount_out(),
                "swap revealed"
            );
            Ok(quote)
        })
    }

    /// Withdraws a pending commitment. The trader gets the deposit back
    /// less `commit_cancel_fee`, which goes to the fee collector.
    ///
    /// Returns the refund.
    ///
    /// # Errors
    ///
    /// `CommitmentNotFound` or `NotCommitmentOwner`.
    pub fn cancel_swap_commitment(
        &mut self,
        trader: &Address,
        hash: &CommitmentHash,
    ) -> crate::error::Result<Amount> {
        self.atomic("cancel_swap_commitment", |tx| {
            if tx.state.commitments.get(hash)?.trader() != trader {
                return Err(AmmError::NotCommitmentOwner(*hash));
            }
            let commitment = tx.state.commitments.remove(hash)?;
            let (refund, fee) = commitment.cancellation_split(tx.params.commit_cancel_fee)?;
            let (escrow, denom) = (Address::commit_escrow(), commitment.deposit_denom());
            tx.bank.move_funds(&escrow, trader, denom, refund)?;
            tx.bank
                .move_funds(&escrow, &Address::fee_collector(), denom, fee)?;
            info!(trader = %trader, hash = %hash, refund = %refund, fee = %fee, "swap commitment cancelled");
            Ok(refund)
        })
    }

    /// Returns the pending commitment stored under `hash`.
    ///
    /// # Errors
    ///
    /// Returns `CommitmentNotFound`.
    pub fn get_swap_commitment(&self, hash: &CommitmentHash) -> crate::error::Result<&SwapCommitment> {
        self.state.commitments.get(hash)
    }

    /// Pending commitments of `trader` in hash order after `cursor`.
    ///
    /// # Errors
    ///
    /// Returns `PageLimitExceeded` if `limit` exceeds `max_page_size`.
    pub fn list_swap_commitments(
        &self,
        trader: &Address,
        cursor: Option<CommitmentHash>,
        limit: u32,
    ) -> crate::error::Result<Page<SwapCommitment, CommitmentHash>> {
        let limit = resolve_limit(limit, self.params.max_page_size)?;
        Ok(self.state.commitments.page_of(trader, cursor, limit))
    }

    /// Returns `true` if a direct swap of `amount_in` into `pool_id` would
    /// be rejected with `CommitRequired`.
    ///
    /// # Errors
    ///
    /// Returns `PoolNotFound`.
    pub fn requires_commit_reveal(&self, pool_id: PoolId, amount_in: Amount) -> crate::error::Result<bool> {
        requires_commit(self.state.pools.get(pool_id)?, amount_in, &self.params)
    }
}

impl<B: Bank> Tx<'_, B> {
    /// Drops a commitment whose window closed and forfeits its deposit to
    /// the fee collector.
    pub(super) fn expire_commitment(&mut self, hash: &CommitmentHash) -> crate::error::Result<Amount> {
        let commitment = self.state.commitments.remove(hash)?;
        self.bank.move_funds(
            &Address::commit_escrow(),
            &Address::fee_collector(),
            commitment.deposit_denom(),
            commitment.deposit(),
        )?;
        info!(
            trader = %commitment.trader(),
            hash = %hash,
            expiry_height = commitment.expiry_height(),
            forfeited = %commitment.deposit(),
            "swap commitment expired"
        );
        Ok(commitment.deposit())
    }
}

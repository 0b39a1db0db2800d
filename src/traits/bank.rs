//! Account balance collaborator.
//!
//! [`Bank`] is the only way the engine moves tokens. The host chain's
//! account module implements it; the engine never holds balances itself
//! and only ever moves funds between user accounts and its two module
//! escrows ([`Address::pool_escrow`], [`Address::order_escrow`]).
//!
//! # Atomicity
//!
//! A single [`move_funds`](Bank::move_funds) call must be all-or-nothing:
//! on error no balance changes. Multi-transfer atomicity is the engine's
//! job: it journals transfers in a buffered overlay and only replays them
//! against the real bank once the whole operation has succeeded.

use crate::domain::{Address, Amount, Denom};

/// Token balance store consumed by the engine.
pub trait Bank {
    /// Returns the balance of `denom` held by `owner`; zero when absent.
    fn balance(&self, owner: &Address, denom: &Denom) -> Amount;

    /// Moves `amount` of `denom` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientFunds`](crate::error::AmmError::InsufficientFunds)
    ///   if `from` holds less than `amount`.
    /// - [`AmmError::Overflow`](crate::error::AmmError::Overflow) if the
    ///   recipient balance would overflow.
    fn move_funds(
        &mut self,
        from: &Address,
        to: &Address,
        denom: &Denom,
        amount: Amount,
    ) -> crate::error::Result<()>;
}

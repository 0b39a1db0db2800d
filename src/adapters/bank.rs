//! Ordered in-memory balance store.

use std::collections::BTreeMap;

use crate::domain::{Address, Amount, Denom};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;
use crate::traits::Bank;

/// A [`Bank`] backed by an ordered map, for tests and simulations.
///
/// Zero balances are removed so that two banks holding the same
/// non-zero balances compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryBank {
    balances: BTreeMap<(Address, Denom), Amount>,
}

impl InMemoryBank {
    /// Creates an empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` of `denom` to `owner` out of thin air.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the balance would overflow.
    pub fn mint(&mut self, owner: &Address, denom: &Denom, amount: Amount) -> crate::error::Result<()> {
        let balance = self.balance(owner, denom).safe_add(&amount)?;
        self.set(owner, denom, balance);
        Ok(())
    }

    /// Sum of `denom` across all accounts.
    #[must_use]
    pub fn total_supply(&self, denom: &Denom) -> u128 {
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .fold(0u128, |acc, (_, amount)| acc.saturating_add(amount.get()))
    }

    fn set(&mut self, owner: &Address, denom: &Denom, amount: Amount) {
        let key = (owner.clone(), denom.clone());
        if amount.is_zero() {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key, amount);
        }
    }
}

impl Bank for InMemoryBank {
    fn balance(&self, owner: &Address, denom: &Denom) -> Amount {
        self.balances
            .get(&(owner.clone(), denom.clone()))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn move_funds(
        &mut self,
        from: &Address,
        to: &Address,
        denom: &Denom,
        amount: Amount,
    ) -> crate::error::Result<()> {
        if amount.is_zero() || from == to {
            return Ok(());
        }
        let available = self.balance(from, denom);
        let debited = available
            .checked_sub(&amount)
            .ok_or_else(|| AmmError::InsufficientFunds {
                denom: denom.to_string(),
                available,
                required: amount,
            })?;
        let credited = self.balance(to, denom).safe_add(&amount)?;
        self.set(from, denom, debited);
        self.set(to, denom, credited);
        Ok(())
    }
}

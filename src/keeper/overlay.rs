//! Buffered bank overlay.

use std::collections::BTreeMap;

use tracing::error;

use crate::domain::{Address, Amount, Denom};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;
use crate::traits::Bank;

/// One recorded transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transfer {
    pub(crate) from: Address,
    pub(crate) to: Address,
    pub(crate) denom: Denom,
    pub(crate) amount: Amount,
}

/// A [`Bank`] view that reads through to an inner bank and buffers every
/// write.
///
/// Balances touched during the operation are cached; transfers are
/// journaled in order so they can be replayed once the operation commits.
/// Dropping the overlay discards everything.
#[derive(Debug)]
pub(crate) struct BufferedBank<'a, B: Bank> {
    inner: &'a B,
    balances: BTreeMap<(Address, Denom), Amount>,
    journal: Vec<Transfer>,
}

impl<'a, B: Bank> BufferedBank<'a, B> {
    pub(crate) fn new(inner: &'a B) -> Self {
        Self {
            inner,
            balances: BTreeMap::new(),
            journal: Vec::new(),
        }
    }

    /// Consumes the overlay and returns the journal.
    pub(crate) fn into_journal(self) -> Vec<Transfer> {
        self.journal
    }
}

impl<B: Bank> Bank for BufferedBank<'_, B> {
    fn balance(&self, owner: &Address, denom: &Denom) -> Amount {
        self.balances
            .get(&(owner.clone(), denom.clone()))
            .copied()
            .unwrap_or_else(|| self.inner.balance(owner, denom))
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
        self.balances.insert((from.clone(), denom.clone()), debited);
        self.balances.insert((to.clone(), denom.clone()), credited);
        self.journal.push(Transfer {
            from: from.clone(),
            to: to.clone(),
            denom: denom.clone(),
            amount,
        });
        Ok(())
    }
}

/// Replays a journal against the real bank.
///
/// If a transfer fails, the ones already applied are reversed in
/// opposite order and the failure is returned.
pub(crate) fn replay<B: Bank>(bank: &mut B, journal: &[Transfer]) -> crate::error::Result<()> {
    for (applied, transfer) in journal.iter().enumerate() {
        if let Err(err) = bank.move_funds(&transfer.from, &transfer.to, &transfer.denom, transfer.amount)
        {
            for undo in journal[..applied].iter().rev() {
                if let Err(undo_err) = bank.move_funds(&undo.to, &undo.from, &undo.denom, undo.amount) {
                    error!(error = %undo_err, denom = %undo.denom, "transfer reversal failed");
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryBank;

    fn denom(s: &str) -> Denom {
        let Ok(d) = Denom::new(s) else {
            panic!("valid denom");
        };
        d
    }

    fn funded() -> (InMemoryBank, Address, Address, Denom) {
        let mut bank = InMemoryBank::new();
        let (alice, bob, atom) = (Address::new("alice"), Address::new("bob"), denom("atom"));
        assert!(bank.mint(&alice, &atom, Amount::new(100)).is_ok());
        (bank, alice, bob, atom)
    }

    #[test]
    fn writes_stay_buffered() {
        let (bank, alice, bob, atom) = funded();
        let mut overlay = BufferedBank::new(&bank);
        assert!(overlay.move_funds(&alice, &bob, &atom, Amount::new(30)).is_ok());
        assert_eq!(overlay.balance(&alice, &atom), Amount::new(70));
        assert_eq!(overlay.balance(&bob, &atom), Amount::new(30));
        let journal = overlay.into_journal();
        assert_eq!(journal.len(), 1);
        assert_eq!(bank.balance(&alice, &atom), Amount::new(100));
    }

    #[test]
    fn overlay_sees_its_own_debits() {
        let (bank, alice, bob, atom) = funded();
        let mut overlay = BufferedBank::new(&bank);
        assert!(overlay.move_funds(&alice, &bob, &atom, Amount::new(80)).is_ok());
        let Err(AmmError::InsufficientFunds { available, .. }) =
            overlay.move_funds(&alice, &bob, &atom, Amount::new(30))
        else {
            panic!("expected InsufficientFunds");
        };
        assert_eq!(available, Amount::new(20));
    }

    #[test]
    fn replay_applies_in_order() {
        let (mut bank, alice, bob, atom) = funded();
        let journal = {
            let mut overlay = BufferedBank::new(&bank);
            assert!(overlay.move_funds(&alice, &bob, &atom, Amount::new(60)).is_ok());
            assert!(overlay.move_funds(&bob, &alice, &atom, Amount::new(10)).is_ok());
            overlay.into_journal()
        };
        assert!(replay(&mut bank, &journal).is_ok());
        assert_eq!(bank.balance(&alice, &atom), Amount::new(50));
        assert_eq!(bank.balance(&bob, &atom), Amount::new(50));
    }

    #[test]
    fn failed_replay_reverses_applied_transfers() {
        let (mut bank, alice, bob, atom) = funded();
        let journal = vec![
            Transfer {
                from: alice.clone(),
                to: bob.clone(),
                denom: atom.clone(),
                amount: Amount::new(40),
            },
            Transfer {
                from: alice.clone(),
                to: bob.clone(),
                denom: atom.clone(),
                amount: Amount::new(500),
            },
        ];
        let before = bank.clone();
        assert!(replay(&mut bank, &journal).is_err());
        assert_eq!(bank, before);
    }
}

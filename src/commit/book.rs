//! Commitment storage with expiry and trader indexes.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use super::{CommitmentHash, SwapCommitment};
use crate::domain::{Address, Page};
use crate::error::AmmError;

/// Pending swap commitments keyed by hash.
///
/// Unlike orders, commitments leave the book entirely once revealed,
/// cancelled or expired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentBook {
    #[serde(with = "crate::domain::entries")]
    commitments: BTreeMap<CommitmentHash, SwapCommitment>,
    expiries: BTreeSet<(u64, CommitmentHash)>,
    by_trader: BTreeSet<(Address, CommitmentHash)>,
}

impl CommitmentBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new commitment.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DuplicateCommitment`] if the hash is pending.
    pub fn insert(&mut self, commitment: SwapCommitment) -> crate::error::Result<()> {
        let hash = commitment.hash();
        if self.commitments.contains_key(&hash) {
            return Err(AmmError::DuplicateCommitment(hash));
        }
        self.expiries.insert((commitment.expiry_height(), hash));
        self.by_trader.insert((commitment.trader().clone(), hash));
        self.commitments.insert(hash, commitment);
        Ok(())
    }

    /// Returns the commitment with `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::CommitmentNotFound`] if absent.
    pub fn get(&self, hash: &CommitmentHash) -> crate::error::Result<&SwapCommitment> {
        self.commitments
            .get(hash)
            .ok_or(AmmError::CommitmentNotFound(*hash))
    }

    /// Removes the commitment with `hash` from the book and its indexes.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::CommitmentNotFound`] if absent.
    pub fn remove(&mut self, hash: &CommitmentHash) -> crate::error::Result<SwapCommitment> {
        let commitment = self
            .commitments
            .remove(hash)
            .ok_or(AmmError::CommitmentNotFound(*hash))?;
        self.expiries.remove(&(commitment.expiry_height(), *hash));
        self.by_trader.remove(&(commitment.trader().clone(), *hash));
        Ok(commitment)
    }

    /// Up to `limit` commitments whose reveal window closed before
    /// `height`, earliest expiry first.
    #[must_use]
    pub fn expired(&self, height: u64, limit: usize) -> Vec<CommitmentHash> {
        let lowest = CommitmentHash::from_bytes([0; 32]);
        self.expiries
            .range(..(height, lowest))
            .take(limit)
            .map(|(_, hash)| *hash)
            .collect()
    }

    /// Commitments of `trader` in hash order after `cursor`, up to `limit`.
    #[must_use]
    pub fn page_of(
        &self,
        trader: &Address,
        cursor: Option<CommitmentHash>,
        limit: usize,
    ) -> Page<SwapCommitment, CommitmentHash> {
        let lowest = CommitmentHash::from_bytes([0; 32]);
        let start = match cursor {
            Some(hash) => Bound::Excluded((trader.clone(), hash)),
            None => Bound::Included((trader.clone(), lowest)),
        };
        let items = self
            .by_trader
            .range((start, Bound::Unbounded))
            .take_while(|(owner, _)| owner == trader)
            .take(limit.saturating_add(1))
            .filter_map(|(_, hash)| self.commitments.get(hash).map(|c| (*hash, c.clone())))
            .collect();
        Page::from_overfetch(items, limit)
    }

    /// Number of pending commitments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commitments.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commitments.is_empty()
    }
}

//! Keyed pool store with a pair index and a pause-deadline index.

use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use super::Pool;
use crate::breaker::BreakerStatus;
use crate::domain::{BlockContext, Denom, DenomPair, FeeTier, Page, PoolId};
use crate::error::AmmError;

/// Owner of every pool, keyed by id, with a unique index on the
/// canonical denom pair.
///
/// Registration claims the pair slot with a single
/// [`BTreeMap::entry`] insert-if-absent, so there is no window in which
/// two pools could be created for the same pair.
///
/// Paused pools are also indexed by `(paused_until, id)`, so block-end
/// recovery visits only pools whose pause has elapsed. The index may hold
/// stale entries for pools resumed early or paused again; consumers
/// re-check the breaker before acting on an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRegistry {
    pools: BTreeMap<PoolId, Pool>,
    #[serde(with = "crate::domain::entries")]
    by_pair: BTreeMap<DenomPair, PoolId>,
    #[serde(default)]
    pauses: BTreeSet<(u64, PoolId)>,
    last_id: u64,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty pool for `pair` and returns its id.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DuplicatePool`] if the pair already has a pool.
    /// - [`AmmError::Overflow`] if the id space is exhausted.
    pub fn register(
        &mut self,
        pair: DenomPair,
        fee_tier: FeeTier,
        block: BlockContext,
    ) -> crate::error::Result<PoolId> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or(AmmError::Overflow("pool id space exhausted"))?;
        let id = PoolId::new(next);
        match self.by_pair.entry(pair.clone()) {
            Entry::Occupied(existing) => Err(AmmError::DuplicatePool(*existing.get())),
            Entry::Vacant(slot) => {
                slot.insert(id);
                self.pools.insert(id, Pool::new(id, pair, fee_tier, block));
                self.last_id = next;
                Ok(id)
            }
        }
    }

    /// Returns the pool with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] if absent.
    pub fn get(&self, id: PoolId) -> crate::error::Result<&Pool> {
        self.pools.get(&id).ok_or(AmmError::PoolNotFound(id))
    }

    /// Returns the pool with `id` for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] if absent.
    pub fn get_mut(&mut self, id: PoolId) -> crate::error::Result<&mut Pool> {
        self.pools.get_mut(&id).ok_or(AmmError::PoolNotFound(id))
    }

    /// Replaces the stored pool with `pool`, indexing its pause deadline
    /// if the breaker is paused.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] if no pool has that id.
    pub fn store(&mut self, pool: Pool) -> crate::error::Result<()> {
        let id = pool.id();
        let slot = self.pools.get_mut(&id).ok_or(AmmError::PoolNotFound(id))?;
        let breaker = pool.breaker();
        if breaker.status() == BreakerStatus::Paused {
            self.pauses.insert((breaker.paused_until(), id));
        }
        *slot = pool;
        Ok(())
    }

    /// Removes and returns up to `limit` pools whose indexed pause deadline
    /// is at or before `now`, earliest deadline first.
    pub fn take_due_recoveries(&mut self, now: u64, limit: usize) -> Vec<PoolId> {
        let due: Vec<(u64, PoolId)> = self
            .pauses
            .range(..=(now, PoolId::new(u64::MAX)))
            .take(limit)
            .copied()
            .collect();
        for entry in &due {
            self.pauses.remove(entry);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Number of indexed pause deadlines, stale ones included.
    #[must_use]
    pub fn pending_recoveries(&self) -> usize {
        self.pauses.len()
    }

    /// Looks up the pool for two denoms in either order.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidDenom`] if the denoms are equal.
    /// - [`AmmError::PairNotFound`] if no pool exists for the pair.
    pub fn get_by_denoms(&self, a: &Denom, b: &Denom) -> crate::error::Result<&Pool> {
        let pair = DenomPair::new(a.clone(), b.clone())?;
        let id = self.by_pair.get(&pair).ok_or_else(|| {
            AmmError::PairNotFound(pair.first().to_string(), pair.second().to_string())
        })?;
        self.get(*id)
    }

    /// Returns the id of the pool for `pair`, if any.
    #[must_use]
    pub fn id_for_pair(&self, pair: &DenomPair) -> Option<PoolId> {
        self.by_pair.get(pair).copied()
    }

    /// Returns up to `limit` pools with ids strictly after `cursor`.
    #[must_use]
    pub fn page(&self, cursor: Option<PoolId>, limit: usize) -> Page<Pool> {
        let start = cursor.map_or(Bound::Unbounded, Bound::Excluded);
        let items = self
            .pools
            .range((start, Bound::Unbounded))
            .take(limit.saturating_add(1))
            .map(|(id, pool)| (id.get(), pool.clone()))
            .collect();
        Page::from_overfetch(items, limit)
    }

    /// Iterates pools in id order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    /// Iterates pool ids in id order.
    #[must_use]
    pub fn ids(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.pools.keys().copied()
    }

    /// Denoms reachable from `denom` in one hop, with the connecting pool,
    /// in denom order.
    #[must_use]
    pub fn neighbors(&self, denom: &Denom) -> Vec<(Denom, PoolId)> {
        let mut out: Vec<(Denom, PoolId)> = self
            .by_pair
            .iter()
            .filter_map(|(pair, id)| pair.other(denom).ok().map(|d| (d.clone(), *id)))
            .collect();
        out.sort();
        out
    }

    /// Number of registered pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns `true` if no pool is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

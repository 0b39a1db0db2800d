//! Authority-gated operations and breaker queries.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::Engine;
use crate::breaker::{BreakerStatus, TripReason};
use crate::config::EngineParams;
use crate::domain::{Address, Amount, PoolId};
use crate::traits::{Bank, BlockClock, ParamSource};

/// Circuit-breaker view of one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerState {
    /// Status at the current block time.
    pub status: BreakerStatus,
    /// End of the current or last pause; zero if never paused.
    pub paused_until: u64,
    /// Reason of the most recent trip.
    pub trigger_reason: Option<TripReason>,
    /// Number of trips so far.
    pub notification_count: u64,
}

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Lifts a pause before its deadline and restarts the price window at
    /// the current price.
    ///
    /// # Errors
    ///
    /// `Unauthorized` or `PoolNotFound`.
    pub fn resume(&mut self, caller: &Address, pool_id: PoolId) -> crate::error::Result<()> {
        self.atomic("resume", |tx| {
            tx.authorize(caller)?;
            let now = tx.block.time;
            let pool = tx.state.pools.get_mut(pool_id)?;
            let price = pool.price()?;
            pool.breaker_mut().resume(price, now);
            info!(pool_id = %pool_id, price = %price, "pool resumed");
            Ok(())
        })
    }

    /// Pauses a pool for `circuit_breaker_duration_secs`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` or `PoolNotFound`.
    pub fn emergency_pause(
        &mut self,
        caller: &Address,
        pool_id: PoolId,
        reason: String,
    ) -> crate::error::Result<()> {
        self.atomic("emergency_pause", |tx| {
            tx.authorize(caller)?;
            let (now, duration) = (tx.block.time, tx.params.circuit_breaker_duration_secs);
            let mut pool = tx.state.pools.get(pool_id)?.clone();
            pool.breaker_mut()
                .trip(TripReason::Emergency { reason }, now, duration);
            let paused_until = pool.breaker().paused_until();
            tx.state.pools.store(pool)?;
            info!(pool_id = %pool_id, paused_until, "emergency pause");
            Ok(())
        })
    }

    /// Pays the accrued protocol fees of `pool_id` to `recipient`.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `PoolNotFound` or `InsufficientFunds` if the escrow
    /// no longer holds the fees.
    pub fn withdraw_protocol_fees(
        &mut self,
        caller: &Address,
        pool_id: PoolId,
        recipient: &Address,
    ) -> crate::error::Result<(Amount, Amount)> {
        self.atomic("withdraw_protocol_fees", |tx| {
            tx.authorize(caller)?;
            tx.withdraw_protocol_fees(pool_id, recipient)
        })
    }

    /// Breaker status, deadline, last reason and trip count of `pool_id`.
    ///
    /// # Errors
    ///
    /// Returns `PoolNotFound`.
    pub fn circuit_breaker_state(&self, pool_id: PoolId) -> crate::error::Result<BreakerState> {
        let breaker = self.state.pools.get(pool_id)?.breaker();
        Ok(BreakerState {
            status: breaker.status_at(self.block.time),
            paused_until: breaker.paused_until(),
            trigger_reason: breaker.trigger_reason().cloned(),
            notification_count: breaker.notification_count(),
        })
    }

    /// Parameters in force for the current block.
    #[must_use]
    pub const fn params(&self) -> &EngineParams {
        &self.params
    }
}

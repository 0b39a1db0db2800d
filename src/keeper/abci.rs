//! Block boundary hooks.
//!
//! `begin_block` snapshots the clock and parameters for the block.
//! `end_block` then runs, in order:
//!
//! 1. expiry of up to `max_orders_per_block` lapsed orders, refunding
//!    their escrow;
//! 2. one matching pass over up to `max_orders_per_block` open orders,
//!    resuming after the order the previous block stopped at;
//! 3. breaker recovery for up to `max_recoveries_per_block` pools whose
//!    pause has elapsed, read off the registry's deadline index so
//!    unpaused pools are never visited;
//! 4. expiry of up to `max_orders_per_block` swap commitments whose reveal
//!    window closed, forfeiting their deposits to the fee collector.
//!
//! Each expiry and each fill commits on its own, so a failing order or
//! commitment never rolls back the others.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Engine;
use crate::commit::CommitmentHash;
use crate::domain::{Amount, OrderId, OrderStatus, PoolId};
use crate::traits::{Bank, BlockClock, ParamSource};

/// One order fill executed during `end_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFill {
    /// Filled order.
    pub order_id: OrderId,
    /// Pool the fill traded against.
    pub pool_id: PoolId,
    /// Escrow spent by this fill.
    pub amount_in: Amount,
    /// Amount paid to the owner.
    pub amount_out: Amount,
    /// Order status after the fill.
    pub status: OrderStatus,
}

/// What `end_block` did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndBlockReport {
    /// Orders swept as expired.
    pub expired: Vec<OrderId>,
    /// Fills executed by the matching pass.
    pub fills: Vec<OrderFill>,
    /// Pools whose pause elapsed this block.
    pub recovered: Vec<PoolId>,
    /// Swap commitments whose deposit was forfeited.
    #[serde(default)]
    pub expired_commitments: Vec<CommitmentHash>,
}

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Starts a block: reads the clock and refreshes the parameter
    /// snapshot. An invalid parameter set is ignored and the previous
    /// snapshot stays in force.
    pub fn begin_block(&mut self) {
        self.block = self.clock.now();
        let params = self.param_source.params();
        match params.validate() {
            Ok(()) => self.params = params,
            Err(err) => warn!(
                height = self.block.height,
                error = %err,
                "invalid parameters ignored, keeping previous set"
            ),
        }
        debug!(height = self.block.height, time = self.block.time, "block started");
    }

    /// Ends a block: expires orders, matches orders, recovers breakers,
    /// expires swap commitments.
    pub fn end_block(&mut self) -> EndBlockReport {
        let limit = usize::try_from(self.params.max_orders_per_block).unwrap_or(usize::MAX);
        let mut report = EndBlockReport::default();

        for order_id in self.state.orders.expired_ids(self.block.height, limit) {
            let expired = self.atomic("expire_order", |tx| {
                tx.close_order(order_id, OrderStatus::Expired, None)
            });
            if expired.is_ok() {
                report.expired.push(order_id);
            }
        }

        let batch = self.state.orders.next_match_batch(limit);
        for order_id in &batch {
            if let Ok(Some(fill)) = self.atomic("fill_order", |tx| tx.fill_order(*order_id)) {
                report.fills.push(fill);
            }
        }
        if let Some(last) = batch.last() {
            self.state.orders.set_match_cursor(Some(*last));
        }

        let now = self.block.time;
        let cap = usize::try_from(self.params.max_recoveries_per_block).unwrap_or(usize::MAX);
        for pool_id in self.state.pools.take_due_recoveries(now, cap) {
            let Ok(pool) = self.state.pools.get_mut(pool_id) else {
                continue;
            };
            let price = match pool.price() {
                Ok(price) => price,
                Err(err) => {
                    warn!(pool_id = %pool_id, error = %err, "price unavailable, recovery skipped");
                    continue;
                }
            };
            if pool.breaker_mut().recover_if_elapsed(price, now) {
                info!(pool_id = %pool_id, "circuit breaker recovered");
                report.recovered.push(pool_id);
            }
        }

        for hash in self.state.commitments.expired(self.block.height, limit) {
            if self
                .atomic("expire_commitment", |tx| tx.expire_commitment(&hash))
                .is_ok()
            {
                report.expired_commitments.push(hash);
            }
        }

        info!(
            height = self.block.height,
            expired = report.expired.len(),
            fills = report.fills.len(),
            recovered = report.recovered.len(),
            expired_commitments = report.expired_commitments.len(),
            "block ended"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::super::MsgPlaceOrder;
    use super::super::testing::{TestEngine, bob, denom, engine, engine_with, gov, next_block, pool};
    use super::*;
    use crate::adapters::{InMemoryBank, ManualClock};
    use crate::config::EngineParams;
    use crate::domain::{Address, Price, Side};

    fn sell(engine: &mut TestEngine, id: PoolId, amount: u128, limit: &str, expiration_offset: u64) -> OrderId {
        let Ok(limit_price) = limit.parse::<Price>() else {
            panic!("valid price");
        };
        let Ok(order_id) = engine.place_limit_order(MsgPlaceOrder {
            owner: bob(),
            pool_id: id,
            side: Side::Sell,
            amount_in: Amount::new(amount),
            limit_price,
            expiration_offset,
        }) else {
            panic!("order placed");
        };
        order_id
    }

    // -- Matching -----------------------------------------------------------

    #[test]
    fn satisfiable_order_fills_once() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        let order = sell(&mut engine, id, 1_000, "1.9", 0);
        let osmo_before = engine.bank().balance(&bob(), &denom("osmo"));

        let report = next_block(&mut engine, 6);
        assert_eq!(
            report.fills,
            vec![OrderFill {
                order_id: order,
                pool_id: id,
                amount_in: Amount::new(1_000),
                amount_out: Amount::new(1_992),
                status: OrderStatus::Filled,
            }]
        );
        assert_eq!(
            engine.bank().balance(&bob(), &denom("osmo")).get(),
            osmo_before.get() + 1_992
        );
        assert!(engine.bank().balance(&Address::order_escrow(), &denom("atom")).is_zero());

        let report = next_block(&mut engine, 6);
        assert!(report.fills.is_empty());
        assert_eq!(engine.state().orders().open_count(), 0);
    }

    #[test]
    fn unsatisfiable_order_rests() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        let order = sell(&mut engine, id, 1_000, "2.5", 0);
        let report = next_block(&mut engine, 6);
        assert!(report.fills.is_empty());
        let Ok(resting) = engine.get_order(order) else {
            panic!("expected Ok");
        };
        assert_eq!(resting.status(), OrderStatus::Open);
        assert_eq!(engine.state().orders().match_cursor(), Some(order));
    }

    #[test]
    fn oversized_order_fills_partially() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        let order = sell(&mut engine, id, 300_000, "1", 0);
        let report = next_block(&mut engine, 6);
        assert_eq!(report.fills.len(), 1);
        assert_eq!(report.fills[0].amount_in, Amount::new(75_000));
        assert_eq!(report.fills[0].status, OrderStatus::Open);
        let Ok(resting) = engine.get_order(order) else {
            panic!("expected Ok");
        };
        assert_eq!(resting.remaining(), Amount::new(225_000));
    }

    // -- Expiry -------------------------------------------------------------

    #[test]
    fn lapsed_order_refunded() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        let before = engine.bank().balance(&bob(), &denom("atom"));
        let order = sell(&mut engine, id, 500, "3", 2);

        assert!(next_block(&mut engine, 6).expired.is_empty());
        assert!(next_block(&mut engine, 6).expired.is_empty());
        let report = next_block(&mut engine, 6);
        assert_eq!(report.expired, vec![order]);
        assert_eq!(engine.bank().balance(&bob(), &denom("atom")), before);
        let Ok(closed) = engine.get_order(order) else {
            panic!("expected Ok");
        };
        assert_eq!(closed.status(), OrderStatus::Expired);
    }

    #[test]
    fn expiry_bounded_per_block() {
        let params = EngineParams {
            max_orders_per_block: 2,
            ..EngineParams::default()
        };
        let mut engine = engine_with(params);
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        for _ in 0..3 {
            sell(&mut engine, id, 100, "3", 1);
        }
        next_block(&mut engine, 6);
        assert_eq!(next_block(&mut engine, 6).expired.len(), 2);
        assert_eq!(next_block(&mut engine, 6).expired.len(), 1);
    }

    // -- Recovery -----------------------------------------------------------

    #[test]
    fn recovery_drains_due_pauses_in_capped_batches() {
        let params = EngineParams {
            max_recoveries_per_block: 2,
            ..EngineParams::default()
        };
        let mut engine = engine_with(params);
        let ids = vec![
            pool(&mut engine, "atom", "osmo", 1_000_000, 1_000_000),
            pool(&mut engine, "atom", "usdc", 1_000_000, 1_000_000),
            pool(&mut engine, "osmo", "usdc", 1_000_000, 1_000_000),
        ];
        for id in &ids {
            assert!(engine.emergency_pause(&gov(), *id, "drill".into()).is_ok());
        }
        assert_eq!(engine.state().pools().pending_recoveries(), 3);

        assert!(next_block(&mut engine, 60).recovered.is_empty());
        assert_eq!(engine.state().pools().pending_recoveries(), 3);
        assert_eq!(next_block(&mut engine, 3_600).recovered, ids[..2].to_vec());
        assert_eq!(next_block(&mut engine, 6).recovered, vec![ids[2]]);
        assert_eq!(engine.state().pools().pending_recoveries(), 0);
    }

    #[test]
    fn active_pools_are_not_visited() {
        let mut engine = engine();
        let calm = pool(&mut engine, "atom", "osmo", 1_000_000, 1_000_000);
        let paused = pool(&mut engine, "atom", "usdc", 1_000_000, 1_000_000);
        assert!(engine.emergency_pause(&gov(), paused, "drill".into()).is_ok());
        assert_eq!(engine.state().pools().pending_recoveries(), 1);
        let report = next_block(&mut engine, 3_600);
        assert_eq!(report.recovered, vec![paused]);
        assert!(!report.recovered.contains(&calm));
    }

    #[test]
    fn early_resume_leaves_nothing_to_recover() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 1_000_000);
        assert!(engine.emergency_pause(&gov(), id, "drill".into()).is_ok());
        assert!(engine.resume(&gov(), id).is_ok());
        let report = next_block(&mut engine, 3_600);
        assert!(report.recovered.is_empty());
        assert_eq!(engine.state().pools().pending_recoveries(), 0);
    }

    // -- Parameters ---------------------------------------------------------

    #[test]
    fn params_refresh_at_block_start() {
        let mut engine = engine();
        let good = EngineParams {
            circuit_breaker_duration_secs: 60,
            ..EngineParams::default()
        };
        assert!(engine.param_source_mut().set(good).is_ok());
        assert_eq!(engine.params().circuit_breaker_duration_secs, 3_600);
        next_block(&mut engine, 6);
        assert_eq!(engine.params().circuit_breaker_duration_secs, 60);
    }

    /// Source that hands out whatever it holds, valid or not.
    struct RawParams(EngineParams);

    impl ParamSource for RawParams {
        fn params(&self) -> EngineParams {
            self.0.clone()
        }
    }

    #[test]
    fn invalid_params_keep_previous_snapshot() {
        let Ok(mut engine) = Engine::new(
            InMemoryBank::new(),
            ManualClock::new(1, 0),
            RawParams(EngineParams::default()),
        ) else {
            panic!("valid params");
        };
        engine.param_source_mut().0.max_page_size = 0;
        engine.clock_mut().advance(6);
        engine.begin_block();
        assert_eq!(engine.block().height, 2);
        assert_eq!(engine.params().max_page_size, 100);
    }
}

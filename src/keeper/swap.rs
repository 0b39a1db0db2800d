//! Single-pool swaps.

use tracing::debug;

use super::Engine;
use super::msgs::{MsgSwap, MsgSwapWithSlippage};
use super::tx::SwapLeg;
use crate::domain::{Amount, Denom, PoolId, SwapQuote};
use crate::error::AmmError;
use crate::traits::{Bank, BlockClock, ParamSource};

/// Fails once the block time is past a non-zero deadline.
pub(super) fn check_deadline(deadline: u64, now: u64) -> crate::error::Result<()> {
    if deadline != 0 && now > deadline {
        return Err(AmmError::DeadlineExceeded { deadline, now });
    }
    Ok(())
}

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Exact-in swap against one pool.
    ///
    /// # Errors
    ///
    /// - Validation: `ZeroAmount`, `InvalidDenom`.
    /// - State: `PoolNotFound`, `PoolPaused`.
    /// - Economic: `DeadlineExceeded`, `SwapTooLarge`, `PriceImpactTooHigh`,
    ///   `InsufficientLiquidity`, `InvariantViolation`, `SlippageExceeded`,
    ///   `InsufficientFunds`.
    ///
    /// On error nothing changes.
    pub fn swap(&mut self, msg: MsgSwap) -> crate::error::Result<SwapQuote> {
        if msg.amount_in.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        check_deadline(msg.deadline, self.block.time)?;
        self.atomic("swap", |tx| {
            let pair = tx.state.pools.get(msg.pool_id)?.pair();
            check_denom_out(pair.other(&msg.denom_in)?, &msg.denom_out)?;
            tx.swap_leg(SwapLeg {
                pool_id: msg.pool_id,
                denom_in: &msg.denom_in,
                amount_in: msg.amount_in,
                payer: &msg.trader,
                recipient: &msg.trader,
                min_out: msg.min_amount_out,
                gated: true,
            })
        })
    }

    /// Swap whose minimum output is derived from a slippage tolerance:
    /// `floor(simulated × (10 000 − max_slippage) / 10 000)`, with a
    /// deadline `deadline_secs` after the current block time.
    ///
    /// # Errors
    ///
    /// As [`swap`](Self::swap), plus `InvalidAmount` for a tolerance
    /// above 100%.
    pub fn swap_with_slippage(&mut self, msg: MsgSwapWithSlippage) -> crate::error::Result<SwapQuote> {
        let simulated = self.simulate_swap(msg.pool_id, &msg.denom_in, msg.amount_in, &msg.denom_out)?;
        let min_amount_out = simulated.min_out_with_slippage(msg.max_slippage)?;
        let deadline = self.block.time.saturating_add(msg.deadline_secs);
        self.swap(MsgSwap {
            trader: msg.trader,
            pool_id: msg.pool_id,
            denom_in: msg.denom_in,
            amount_in: msg.amount_in,
            denom_out: msg.denom_out,
            min_amount_out,
            deadline,
        })
    }

    /// Quotes a swap without touching any state.
    ///
    /// Runs the same validation and pricing as [`swap`](Self::swap), so
    /// its output equals what `swap` would pay on the same state.
    ///
    /// # Errors
    ///
    /// As [`swap`](Self::swap), minus the deadline, invariant, slippage
    /// and funds checks.
    pub fn simulate_swap(
        &self,
        pool_id: PoolId,
        denom_in: &Denom,
        amount_in: Amount,
        denom_out: &Denom,
    ) -> crate::error::Result<SwapQuote> {
        let pool = self.state.pools.get(pool_id)?;
        pool.breaker().ensure_active(pool_id, self.block.time)?;
        check_denom_out(pool.pair().other(denom_in)?, denom_out)?;
        let quote = pool.quote_exact_in(denom_in, amount_in, &self.params)?;
        debug!(pool_id = %pool_id, quote = %quote, "swap simulated");
        Ok(quote)
    }
}

pub(super) fn check_denom_out(expected: &Denom, requested: &Denom) -> crate::error::Result<()> {
    if expected != requested {
        return Err(AmmError::InvalidDenom(format!(
            "pool pays out {expected}, not {requested}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::super::testing::{TestEngine, START_TIME, alice, bob, denom, engine, pool};
    use super::*;
    use crate::domain::{Address, BasisPoints};

    fn swap_msg(id: PoolId, amount_in: u128, min_out: u128) -> MsgSwap {
        MsgSwap {
            trader: bob(),
            pool_id: id,
            denom_in: denom("atom"),
            amount_in: Amount::new(amount_in),
            denom_out: denom("osmo"),
            min_amount_out: Amount::new(min_out),
            deadline: 0,
        }
    }

    fn reference_pool() -> (TestEngine, PoolId) {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        (engine, id)
    }

    // -- Pricing ------------------------------------------------------------

    #[test]
    fn reference_swap_pays_1992() {
        let (mut engine, id) = reference_pool();
        let Ok(simulated) = engine.simulate_swap(id, &denom("atom"), Amount::new(1_000), &denom("osmo"))
        else {
            panic!("expected Ok");
        };
        let osmo_before = engine.bank().balance(&bob(), &denom("osmo"));
        let Ok(executed) = engine.swap(swap_msg(id, 1_000, 0)) else {
            panic!("expected Ok");
        };
        assert_eq!(executed.amount_out(), Amount::new(1_992));
        assert_eq!(executed, simulated);
        assert_eq!(
            engine.bank().balance(&bob(), &denom("osmo")),
            Amount::new(osmo_before.get() + 1_992)
        );
        let Ok(pool) = engine.get_pool(id) else {
            panic!("expected Ok");
        };
        // fee 3, protocol share floor(3 × 0.1667) = 0, so all 1 000 stay.
        assert_eq!(pool.reserve_a(), Amount::new(1_001_000));
        assert_eq!(pool.reserve_b(), Amount::new(1_998_008));
    }

    #[test]
    fn escrow_tracks_reserves_plus_protocol_fees() {
        let (mut engine, id) = reference_pool();
        assert!(engine.swap(swap_msg(id, 60_000, 0)).is_ok());
        let Ok(pool) = engine.get_pool(id) else {
            panic!("expected Ok");
        };
        let (protocol_a, _) = pool.protocol_fees();
        assert_eq!(protocol_a, Amount::new(30));
        assert_eq!(
            engine.bank().balance(&Address::pool_escrow(), &denom("atom")),
            Amount::new(pool.reserve_a().get() + protocol_a.get())
        );
    }

    // -- Rejections ---------------------------------------------------------

    #[test]
    fn slippage_leaves_state_untouched() {
        let (mut engine, id) = reference_pool();
        let state = engine.state().clone();
        let bank = engine.bank().clone();
        assert_eq!(
            engine.swap(swap_msg(id, 1_000, 1_993)),
            Err(AmmError::SlippageExceeded {
                actual: Amount::new(1_992),
                minimum: Amount::new(1_993),
            })
        );
        assert_eq!(engine.state(), &state);
        assert_eq!(engine.bank(), &bank);
    }

    #[test]
    fn deadline_and_zero_amount() {
        let (mut engine, id) = reference_pool();
        let mut late = swap_msg(id, 1_000, 0);
        late.deadline = START_TIME - 1;
        assert_eq!(
            engine.swap(late),
            Err(AmmError::DeadlineExceeded {
                deadline: START_TIME - 1,
                now: START_TIME
            })
        );
        assert_eq!(engine.swap(swap_msg(id, 0, 0)), Err(AmmError::ZeroAmount));
    }

    #[test]
    fn caps_reject_large_swaps() {
        let (mut engine, id) = reference_pool();
        assert!(matches!(
            engine.swap(swap_msg(id, 100_001, 0)),
            Err(AmmError::SwapTooLarge { max_bps: 1_000, .. })
        ));
    }

    #[test]
    fn wrong_denoms_rejected() {
        let (mut engine, id) = reference_pool();
        let mut msg = swap_msg(id, 1_000, 0);
        msg.denom_out = denom("usdc");
        assert!(matches!(engine.swap(msg), Err(AmmError::InvalidDenom(_))));
        let mut msg = swap_msg(id, 1_000, 0);
        msg.denom_in = denom("usdc");
        assert!(matches!(engine.swap(msg), Err(AmmError::InvalidDenom(_))));
    }

    #[test]
    fn unfunded_trader_rolls_back() {
        let (mut engine, id) = reference_pool();
        let mut msg = swap_msg(id, 1_000, 0);
        msg.trader = Address::new("carol");
        let state = engine.state().clone();
        assert!(matches!(engine.swap(msg), Err(AmmError::InsufficientFunds { .. })));
        assert_eq!(engine.state(), &state);
    }

    // -- Slippage tolerance -------------------------------------------------

    #[test]
    fn slippage_tolerance_derives_minimum() {
        let (mut engine, id) = reference_pool();
        let Ok(quote) = engine.swap_with_slippage(MsgSwapWithSlippage {
            trader: alice(),
            pool_id: id,
            denom_in: denom("atom"),
            amount_in: Amount::new(1_000),
            denom_out: denom("osmo"),
            max_slippage: BasisPoints::new(50),
            deadline_secs: 60,
        }) else {
            panic!("expected Ok");
        };
        assert_eq!(quote.amount_out(), Amount::new(1_992));
    }
}

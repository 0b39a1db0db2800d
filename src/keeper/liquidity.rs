//! Liquidity provision.

use super::Engine;
use super::msgs::{LiquidityReceipt, MsgAddLiquidity, MsgAddLiquidityBalanced, MsgRemoveLiquidity};
use crate::domain::{Address, PoolId};
use crate::error::AmmError;
use crate::liquidity::{LiquidityPosition, balanced_amount_b};
use crate::traits::{Bank, BlockClock, ParamSource};

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Deposits both tokens and mints shares.
    ///
    /// A live pool mints `min(a × T / Ra, b × T / Rb)` and requires the
    /// deposit ratio to match the pool within `ratio_tolerance`; an empty
    /// pool mints `√(a × b)`.
    ///
    /// # Errors
    ///
    /// `ZeroAmount`, `PoolNotFound`, `PoolPaused`, `RatioMismatch`,
    /// `InsufficientLiquidity` (nothing minted), `InvariantViolation` or
    /// `InsufficientFunds`.
    pub fn add_liquidity(&mut self, msg: MsgAddLiquidity) -> crate::error::Result<LiquidityReceipt> {
        self.atomic("add_liquidity", |tx| {
            tx.add_liquidity(msg.pool_id, &msg.provider, msg.amount_a, msg.amount_b)
        })
    }

    /// Deposits `amount_a` and the matching `ceil(a × Rb / Ra)` of token B.
    ///
    /// # Errors
    ///
    /// As [`add_liquidity`](Self::add_liquidity); an empty pool fails with
    /// `InsufficientLiquidity` since it has no ratio to match.
    pub fn add_liquidity_balanced(
        &mut self,
        msg: MsgAddLiquidityBalanced,
    ) -> crate::error::Result<LiquidityReceipt> {
        self.atomic("add_liquidity_balanced", |tx| {
            let pool = tx.state.pools.get(msg.pool_id)?;
            let amount_b = balanced_amount_b(msg.amount_a, pool.reserve_a(), pool.reserve_b())?;
            tx.add_liquidity(msg.pool_id, &msg.provider, msg.amount_a, amount_b)
        })
    }

    /// Burns shares and pays out `floor(shares × R / T)` of each reserve.
    ///
    /// # Errors
    ///
    /// `ZeroAmount`, `PoolNotFound`, `PoolPaused`, `PositionNotFound`,
    /// `LiquidityLocked` (deposit younger than `lp_lock_blocks`),
    /// `InsufficientShares` or `InvariantViolation`.
    pub fn remove_liquidity(
        &mut self,
        msg: MsgRemoveLiquidity,
    ) -> crate::error::Result<LiquidityReceipt> {
        self.atomic("remove_liquidity", |tx| {
            tx.remove_liquidity(msg.pool_id, &msg.provider, msg.shares)
        })
    }

    /// Returns the LP position of `owner` in `pool_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PositionNotFound`] if `owner` holds no shares.
    pub fn get_liquidity_position(
        &self,
        pool_id: PoolId,
        owner: &Address,
    ) -> crate::error::Result<&LiquidityPosition> {
        self.state
            .positions
            .get(pool_id, owner)
            .ok_or(AmmError::PositionNotFound(pool_id))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::super::testing::{TestEngine, alice, bob, denom, engine, next_block, pool};
    use super::*;
    use crate::domain::{Amount, Shares};

    fn add(
        engine: &mut TestEngine,
        provider: Address,
        id: PoolId,
        a: u128,
        b: u128,
    ) -> crate::error::Result<LiquidityReceipt> {
        engine.add_liquidity(MsgAddLiquidity {
            provider,
            pool_id: id,
            amount_a: Amount::new(a),
            amount_b: Amount::new(b),
        })
    }

    fn remove(
        engine: &mut TestEngine,
        provider: Address,
        id: PoolId,
        shares: u128,
    ) -> crate::error::Result<LiquidityReceipt> {
        engine.remove_liquidity(MsgRemoveLiquidity {
            provider,
            pool_id: id,
            shares: Shares::new(shares),
        })
    }

    // -- Add ----------------------------------------------------------------

    #[test]
    fn proportional_mint() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        let Ok(receipt) = add(&mut engine, bob(), id, 100_000, 200_000) else {
            panic!("expected Ok");
        };
        // T = √(1e6 × 2e6) = 1 414 213; a × T / Ra = 141 421.
        assert_eq!(receipt.shares, Shares::new(141_421));
        let Ok(position) = engine.get_liquidity_position(id, &bob()) else {
            panic!("expected Ok");
        };
        assert_eq!(position.shares(), receipt.shares);
        assert_eq!(position.last_deposit_height(), 1);
    }

    #[test]
    fn off_ratio_deposit_rejected() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        let before = engine.bank().clone();
        assert_eq!(
            add(&mut engine, bob(), id, 100_000, 100_000),
            Err(AmmError::RatioMismatch)
        );
        assert_eq!(engine.bank(), &before);
        assert!(engine.get_liquidity_position(id, &bob()).is_err());
    }

    #[test]
    fn balanced_deposit_rounds_b_up() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 3_000_000, 1_000_000);
        let Ok(receipt) = engine.add_liquidity_balanced(MsgAddLiquidityBalanced {
            provider: bob(),
            pool_id: id,
            amount_a: Amount::new(10_000),
        }) else {
            panic!("expected Ok");
        };
        // 10 000 × 1e6 / 3e6 = 3 333.3…
        assert_eq!(receipt.amount_b, Amount::new(3_334));
    }

    #[test]
    fn unknown_pool() {
        let mut engine = engine();
        assert_eq!(
            add(&mut engine, bob(), PoolId::new(4), 1, 1),
            Err(AmmError::PoolNotFound(PoolId::new(4)))
        );
    }

    // -- Remove -------------------------------------------------------------

    #[test]
    fn lock_blocks_same_block_withdrawal() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 1_000_000);
        let Ok(receipt) = add(&mut engine, bob(), id, 10_000, 10_000) else {
            panic!("expected Ok");
        };
        assert_eq!(
            remove(&mut engine, bob(), id, receipt.shares.get()),
            Err(AmmError::LiquidityLocked(2))
        );
        next_block(&mut engine, 6);
        assert!(remove(&mut engine, bob(), id, receipt.shares.get()).is_ok());
        assert!(engine.get_liquidity_position(id, &bob()).is_err());
    }

    #[test]
    fn round_trip_returns_deposit_within_dust() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        let (atom, osmo) = (denom("atom"), denom("osmo"));
        let start = (engine.bank().balance(&bob(), &atom), engine.bank().balance(&bob(), &osmo));
        let Ok(added) = add(&mut engine, bob(), id, 50_000, 100_000) else {
            panic!("expected Ok");
        };
        next_block(&mut engine, 6);
        let Ok(removed) = remove(&mut engine, bob(), id, added.shares.get()) else {
            panic!("expected Ok");
        };
        assert!(removed.amount_a <= added.amount_a);
        assert!(removed.amount_b <= added.amount_b);
        assert!(added.amount_a.get() - removed.amount_a.get() <= 1);
        assert!(added.amount_b.get() - removed.amount_b.get() <= 1);
        let end = (engine.bank().balance(&bob(), &atom), engine.bank().balance(&bob(), &osmo));
        assert!(end.0 <= start.0 && end.1 <= start.1);
    }

    #[test]
    fn over_withdrawal_and_strangers() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 1_000_000);
        next_block(&mut engine, 6);
        assert!(matches!(
            remove(&mut engine, alice(), id, 2_000_000),
            Err(AmmError::InsufficientShares { .. })
        ));
        assert_eq!(
            remove(&mut engine, bob(), id, 1),
            Err(AmmError::PositionNotFound(id))
        );
        assert_eq!(remove(&mut engine, alice(), id, 0), Err(AmmError::ZeroAmount));
    }

    #[test]
    fn majority_exit_past_a_dust_position() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_003);
        let Ok(dust) = add(&mut engine, bob(), id, 3, 6) else {
            panic!("expected Ok");
        };
        assert_eq!(dust.shares, Shares::new(4));
        next_block(&mut engine, 6);
        let Ok(exit) = remove(&mut engine, alice(), id, 1_414_214) else {
            panic!("expected Ok");
        };
        assert_eq!(exit.amount_a, Amount::new(1_000_000));
        assert_eq!(exit.amount_b, Amount::new(2_000_003));
        let Ok(left) = engine.get_pool(id) else {
            panic!("expected Ok");
        };
        assert_eq!(
            (left.reserve_a(), left.reserve_b(), left.total_shares()),
            (Amount::new(3), Amount::new(6), Shares::new(4))
        );
        assert!(engine.get_liquidity_position(id, &alice()).is_err());
        assert!(remove(&mut engine, bob(), id, 4).is_ok());
    }

    #[test]
    fn full_exit_drains_pool_and_reseeds() {
        let mut engine = engine();
        let id = pool(&mut engine, "atom", "osmo", 1_000_000, 1_000_000);
        next_block(&mut engine, 6);
        assert!(remove(&mut engine, alice(), id, 1_000_000).is_ok());
        let Ok(drained) = engine.get_pool(id) else {
            panic!("expected Ok");
        };
        assert!(drained.reserve_a().is_zero() && drained.total_shares().is_zero());
        let Ok(reseeded) = add(&mut engine, bob(), id, 4_000, 9_000) else {
            panic!("expected Ok");
        };
        assert_eq!(reseeded.shares, Shares::new(6_000));
    }
}

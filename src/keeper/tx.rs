//! Scratch transaction and the state transitions that run inside it.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::EngineState;
use super::abci::OrderFill;
use super::msgs::{LiquidityReceipt, MsgCreatePool, MsgPlaceOrder};
use super::overlay::{BufferedBank, Transfer};
use crate::breaker::TripReason;
use crate::commit::{commit_threshold, requires_commit};
use crate::config::EngineParams;
use crate::domain::{
    Address, Amount, BlockContext, Denom, DenomPair, OrderId, OrderStatus, PoolId, Price,
    Shares, SwapQuote,
};
use crate::error::AmmError;
use crate::guard::{InvariantGuard, Verdict};
use crate::liquidity::{bootstrap_shares, check_ratio, proportional_shares, redemption};
use crate::orders::{LimitOrder, NewOrder};
use crate::pools::Pool;
use crate::router::{Route, RouteQuote};
use crate::traits::Bank;

/// One exact-in swap through one pool.
pub(super) struct SwapLeg<'l> {
    pub(super) pool_id: PoolId,
    pub(super) denom_in: &'l Denom,
    pub(super) amount_in: Amount,
    pub(super) payer: &'l Address,
    pub(super) recipient: &'l Address,
    pub(super) min_out: Amount,
    /// Subject to the commit-reveal threshold. Order fills and revealed
    /// swaps are not.
    pub(super) gated: bool,
}

/// Scratch copy of the engine for one atomic operation.
pub(super) struct Tx<'a, B: Bank> {
    pub(super) state: EngineState,
    pub(super) bank: BufferedBank<'a, B>,
    pub(super) block: BlockContext,
    pub(super) params: &'a EngineParams,
    locks: BTreeSet<PoolId>,
}

impl<'a, B: Bank> Tx<'a, B> {
    pub(super) fn new(
        state: EngineState,
        bank: &'a B,
        block: BlockContext,
        params: &'a EngineParams,
    ) -> Self {
        Self {
            state,
            bank: BufferedBank::new(bank),
            block,
            params,
            locks: BTreeSet::new(),
        }
    }

    /// Releases the scratch state and the transfer journal.
    pub(super) fn finish(self) -> (EngineState, Vec<Transfer>) {
        (self.state, self.bank.into_journal())
    }

    /// Runs `f` holding the execution lock of `pool_id`.
    fn locked<T>(
        &mut self,
        pool_id: PoolId,
        f: impl FnOnce(&mut Self) -> crate::error::Result<T>,
    ) -> crate::error::Result<T> {
        if !self.locks.insert(pool_id) {
            return Err(AmmError::Reentrancy(format!("pool {pool_id}")));
        }
        let outcome = f(self);
        self.locks.remove(&pool_id);
        outcome
    }

    // -- Pools --------------------------------------------------------------

    /// Moves the seed deposit into escrow, then registers and seeds the pool.
    pub(super) fn create_pool(&mut self, msg: &MsgCreatePool) -> crate::error::Result<LiquidityReceipt> {
        if msg.amount_a.is_zero() || msg.amount_b.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        let pair = DenomPair::new(msg.denom_a.clone(), msg.denom_b.clone())?;
        let (amount_a, amount_b) = if pair.first() == &msg.denom_a {
            (msg.amount_a, msg.amount_b)
        } else {
            (msg.amount_b, msg.amount_a)
        };
        if let Some(existing) = self.state.pools.id_for_pair(&pair) {
            return Err(AmmError::DuplicatePool(existing));
        }
        let fee_tier = msg.fee_tier.unwrap_or(self.params.default_fee);
        let minted = bootstrap_shares(amount_a, amount_b, self.params.min_initial_shares)?;

        let escrow = Address::pool_escrow();
        self.bank.move_funds(&msg.creator, &escrow, pair.first(), amount_a)?;
        self.bank.move_funds(&msg.creator, &escrow, pair.second(), amount_b)?;

        let pool_id = self.state.pools.register(pair, fee_tier, self.block)?;
        let pool = self.state.pools.get_mut(pool_id)?;
        pool.deposit(amount_a, amount_b, minted)?;
        let price = pool.price()?;
        self.state
            .positions
            .credit(pool_id, &msg.creator, minted, self.block.height)?;
        info!(
            pool_id = %pool_id,
            fee_bps = fee_tier.basis_points().get(),
            price = %price,
            shares = %minted,
            "pool created"
        );
        Ok(LiquidityReceipt {
            pool_id,
            shares: minted,
            amount_a,
            amount_b,
        })
    }

    // -- Liquidity ----------------------------------------------------------

    /// Deposits both tokens and mints shares.
    pub(super) fn add_liquidity(
        &mut self,
        pool_id: PoolId,
        provider: &Address,
        amount_a: Amount,
        amount_b: Amount,
    ) -> crate::error::Result<LiquidityReceipt> {
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        self.locked(pool_id, |tx| {
            let (now, params) = (tx.block.time, tx.params);
            let pool = tx.state.pools.get(pool_id)?;
            pool.breaker().ensure_active(pool_id, now)?;
            let pre = pool.snapshot();
            let minted = if pre.total_shares.is_zero() {
                bootstrap_shares(amount_a, amount_b, params.min_initial_shares)?
            } else {
                check_ratio(
                    amount_a,
                    amount_b,
                    pre.reserve_a,
                    pre.reserve_b,
                    params.ratio_tolerance,
                )?;
                proportional_shares(
                    amount_a,
                    amount_b,
                    pre.reserve_a,
                    pre.reserve_b,
                    pre.total_shares,
                )?
            };
            let price_before = pool.price()?;
            let mut next = pool.clone();
            next.deposit(amount_a, amount_b, minted)?;
            let verdict = InvariantGuard::from_params(params).check_liquidity(&pre, &next.snapshot())?;

            let escrow = Address::pool_escrow();
            tx.bank
                .move_funds(provider, &escrow, next.pair().first(), amount_a)?;
            tx.bank
                .move_funds(provider, &escrow, next.pair().second(), amount_b)?;
            tx.state
                .positions
                .credit(pool_id, provider, minted, tx.block.height)?;
            absorb_verdict(&mut next, verdict, price_before, now, params);
            tx.state.pools.store(next)?;
            info!(pool_id = %pool_id, provider = %provider, shares = %minted, "liquidity added");
            Ok(LiquidityReceipt {
                pool_id,
                shares: minted,
                amount_a,
                amount_b,
            })
        })
    }

    /// Burns shares and pays out the proportional reserves.
    pub(super) fn remove_liquidity(
        &mut self,
        pool_id: PoolId,
        provider: &Address,
        shares: Shares,
    ) -> crate::error::Result<LiquidityReceipt> {
        if shares.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        self.locked(pool_id, |tx| {
            let (now, params) = (tx.block.time, tx.params);
            let pool = tx.state.pools.get(pool_id)?;
            pool.breaker().ensure_active(pool_id, now)?;
            tx.state.positions.debit(
                pool_id,
                provider,
                shares,
                tx.block.height,
                params.lp_lock_blocks,
            )?;
            let pre = pool.snapshot();
            let (amount_a, amount_b) =
                redemption(shares, pre.reserve_a, pre.reserve_b, pre.total_shares)?;
            let price_before = pool.price()?;
            let mut next = pool.clone();
            next.withdraw(amount_a, amount_b, shares)?;
            let verdict = InvariantGuard::from_params(params).check_liquidity(&pre, &next.snapshot())?;

            let escrow = Address::pool_escrow();
            tx.bank
                .move_funds(&escrow, provider, next.pair().first(), amount_a)?;
            tx.bank
                .move_funds(&escrow, provider, next.pair().second(), amount_b)?;
            absorb_verdict(&mut next, verdict, price_before, now, params);
            tx.state.pools.store(next)?;
            info!(pool_id = %pool_id, provider = %provider, shares = %shares, "liquidity removed");
            Ok(LiquidityReceipt {
                pool_id,
                shares,
                amount_a,
                amount_b,
            })
        })
    }

    // -- Swaps --------------------------------------------------------------

    /// Executes one swap leg: commit-reveal gate, quote, invariant check,
    /// slippage check, settlement, then breaker evaluation on the committed
    /// price.
    pub(super) fn swap_leg(&mut self, leg: SwapLeg<'_>) -> crate::error::Result<SwapQuote> {
        self.locked(leg.pool_id, |tx| {
            let (now, params) = (tx.block.time, tx.params);
            let pool = tx.state.pools.get(leg.pool_id)?;
            pool.breaker().ensure_active(leg.pool_id, now)?;
            if leg.gated && requires_commit(pool, leg.amount_in, params)? {
                return Err(AmmError::CommitRequired {
                    amount_in: leg.amount_in,
                    threshold: commit_threshold(pool, params)?,
                });
            }
            let quote = pool.quote_exact_in(leg.denom_in, leg.amount_in, params)?;
            let price_before = pool.price()?;
            let mut next = pool.clone();
            next.apply_swap(leg.denom_in, &quote)?;
            let verdict = InvariantGuard::from_params(params).check_swap(&pool.snapshot(), &next.snapshot())?;
            if quote.amount_out() < leg.min_out {
                return Err(AmmError::SlippageExceeded {
                    actual: quote.amount_out(),
                    minimum: leg.min_out,
                });
            }

            let denom_out = next.pair().other(leg.denom_in)?.clone();
            let escrow = Address::pool_escrow();
            tx.bank
                .move_funds(leg.payer, &escrow, leg.denom_in, quote.amount_in())?;
            tx.bank
                .move_funds(&escrow, leg.recipient, &denom_out, quote.amount_out())?;

            absorb_verdict(&mut next, verdict, price_before, now, params);
            let price_after = next.price()?;
            if let Some(reason) = next
                .breaker_mut()
                .observe_price(price_before, price_after, now, params)
            {
                log_trip(leg.pool_id, &reason, next.breaker().paused_until());
            }
            tx.state.pools.store(next)?;
            info!(
                pool_id = %leg.pool_id,
                denom_in = %leg.denom_in,
                amount_in = %quote.amount_in(),
                denom_out = %denom_out,
                amount_out = %quote.amount_out(),
                "swap executed"
            );
            Ok(quote)
        })
    }

    /// Executes every hop of `route` in order. Intermediate outputs are
    /// paid to `recipient`, which funds the next hop.
    pub(super) fn execute_route(
        &mut self,
        route: &Route,
        amount_in: Amount,
        payer: &Address,
        recipient: &Address,
        min_amount_out: Amount,
    ) -> crate::error::Result<RouteQuote> {
        let mut amount = amount_in;
        let mut hop_quotes = Vec::with_capacity(route.len());
        for (index, hop) in route.hops().iter().enumerate() {
            let quote = self.swap_leg(SwapLeg {
                pool_id: hop.pool_id,
                denom_in: &hop.denom_in,
                amount_in: amount,
                payer: if index == 0 { payer } else { recipient },
                recipient,
                min_out: Amount::ZERO,
                gated: true,
            })?;
            amount = quote.amount_out();
            hop_quotes.push(quote);
        }
        if amount < min_amount_out {
            return Err(AmmError::SlippageExceeded {
                actual: amount,
                minimum: min_amount_out,
            });
        }
        RouteQuote::from_hops(route.clone(), amount_in, hop_quotes)
    }

    // -- Orders -------------------------------------------------------------

    /// Escrows the input and rests a new order.
    pub(super) fn place_order(&mut self, msg: &MsgPlaceOrder) -> crate::error::Result<OrderId> {
        if msg.amount_in.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        if msg.limit_price.is_zero() {
            return Err(AmmError::InvalidPrice("limit price must be positive"));
        }
        let pair = self.state.pools.get(msg.pool_id)?.pair();
        let (denom_in, denom_out) = if msg.side.spends_first() {
            (pair.first().clone(), pair.second().clone())
        } else {
            (pair.second().clone(), pair.first().clone())
        };
        self.bank
            .move_funds(&msg.owner, &Address::order_escrow(), &denom_in, msg.amount_in)?;
        let order_id = self.state.orders.place(NewOrder {
            owner: msg.owner.clone(),
            pool_id: msg.pool_id,
            side: msg.side,
            denom_in,
            denom_out,
            amount_in: msg.amount_in,
            limit_price: msg.limit_price,
            created_height: self.block.height,
            expiration_offset: msg.expiration_offset,
        })?;
        info!(
            order_id = %order_id,
            pool_id = %msg.pool_id,
            side = %msg.side,
            amount_in = %msg.amount_in,
            limit = %msg.limit_price,
            "limit order placed"
        );
        Ok(order_id)
    }

    /// Closes an open order and refunds its unfilled escrow to the owner.
    ///
    /// With `caller` set, only that owner may close it.
    pub(super) fn close_order(
        &mut self,
        order_id: OrderId,
        status: OrderStatus,
        caller: Option<&Address>,
    ) -> crate::error::Result<Amount> {
        let order = self.state.orders.get(order_id)?;
        if caller.is_some_and(|c| c != order.owner()) {
            return Err(AmmError::NotOwner(order_id));
        }
        let (owner, denom) = (order.owner().clone(), order.denom_in().clone());
        let refund = self.state.orders.close(order_id, status)?;
        self.bank
            .move_funds(&Address::order_escrow(), &owner, &denom, refund)?;
        info!(order_id = %order_id, status = %status, refund = %refund, "limit order closed");
        Ok(refund)
    }

    /// Tries to fill `order_id` against its pool at the current price.
    ///
    /// Returns `None` when the order is not fillable this block.
    pub(super) fn fill_order(&mut self, order_id: OrderId) -> crate::error::Result<Option<OrderFill>> {
        let order = self.state.orders.get(order_id)?.clone();
        order.ensure_open()?;
        if order.is_expired_at(self.block.height) {
            return Ok(None);
        }
        let pool = self.state.pools.get(order.pool_id())?;
        if pool.breaker().is_paused_at(self.block.time) {
            debug!(order_id = %order_id, pool_id = %order.pool_id(), "pool paused, order skipped");
            return Ok(None);
        }
        if !order.is_satisfiable(pool.price()?) {
            return Ok(None);
        }
        let Some((amount, min_out)) = fill_size(pool, &order, self.params)? else {
            debug!(order_id = %order_id, "no fill size honours the limit");
            return Ok(None);
        };

        let escrow = Address::order_escrow();
        let quote = self.swap_leg(SwapLeg {
            pool_id: order.pool_id(),
            denom_in: order.denom_in(),
            amount_in: amount,
            payer: &escrow,
            recipient: order.owner(),
            min_out,
            gated: false,
        })?;
        let status = self
            .state
            .orders
            .record_fill(order_id, amount, quote.amount_out())?;
        info!(
            order_id = %order_id,
            amount_in = %amount,
            amount_out = %quote.amount_out(),
            status = %status,
            "limit order filled"
        );
        Ok(Some(OrderFill {
            order_id,
            pool_id: order.pool_id(),
            amount_in: amount,
            amount_out: quote.amount_out(),
            status,
        }))
    }

    // -- Governance ---------------------------------------------------------

    /// Fails unless `caller` is the governance authority.
    pub(super) fn authorize(&self, caller: &Address) -> crate::error::Result<()> {
        if *caller != self.params.authority {
            return Err(AmmError::Unauthorized("caller is not the governance authority"));
        }
        Ok(())
    }

    /// Pays the accrued protocol fees of `pool_id` out of escrow.
    pub(super) fn withdraw_protocol_fees(
        &mut self,
        pool_id: PoolId,
        recipient: &Address,
    ) -> crate::error::Result<(Amount, Amount)> {
        let pool = self.state.pools.get_mut(pool_id)?;
        let (fee_a, fee_b) = pool.take_protocol_fees();
        let (denom_a, denom_b) = (pool.pair().first().clone(), pool.pair().second().clone());
        let escrow = Address::pool_escrow();
        self.bank.move_funds(&escrow, recipient, &denom_a, fee_a)?;
        self.bank.move_funds(&escrow, recipient, &denom_b, fee_b)?;
        info!(pool_id = %pool_id, fee_a = %fee_a, fee_b = %fee_b, "protocol fees withdrawn");
        Ok((fee_a, fee_b))
    }
}

/// Largest input, starting from the full remainder and halving, whose
/// quote both passes the pool caps and honours the order's limit.
fn fill_size(
    pool: &Pool,
    order: &LimitOrder,
    params: &EngineParams,
) -> crate::error::Result<Option<(Amount, Amount)>> {
    let mut amount = order.remaining();
    while !amount.is_zero() {
        match pool.quote_exact_in(order.denom_in(), amount, params) {
            Ok(quote) => {
                let min_out = order.min_out_for(amount)?;
                if quote.amount_out() >= min_out {
                    return Ok(Some((amount, min_out)));
                }
            }
            Err(AmmError::SwapTooLarge { .. } | AmmError::PriceImpactTooHigh { .. }) => {}
            Err(AmmError::InsufficientLiquidity | AmmError::InvalidAmount(_)) => return Ok(None),
            Err(err) => return Err(err),
        }
        amount = Amount::new(amount.get() / 2);
    }
    Ok(None)
}

/// Feeds a near-miss verdict to the pool's breaker.
fn absorb_verdict(pool: &mut Pool, verdict: Verdict, price_before: Price, now: u64, params: &EngineParams) {
    if verdict != Verdict::NearMiss {
        return;
    }
    let pool_id = pool.id();
    if let Some(reason) = pool.breaker_mut().record_near_miss(price_before, now, params) {
        log_trip(pool_id, &reason, pool.breaker().paused_until());
    }
}

fn log_trip(pool_id: PoolId, reason: &TripReason, until: u64) {
    info!(pool_id = %pool_id, reason = %reason, paused_until = until, "circuit breaker tripped");
}

//! Multi-hop swaps.

use tracing::debug;

use super::Engine;
use super::msgs::{MsgMultiHopSwap, MsgQuickSwap};
use super::swap::check_deadline;
use crate::domain::{Amount, BasisPoints, Denom};
use crate::error::AmmError;
use crate::router::{self, ArbitrageOpportunity, Route, RouteQuote};
use crate::traits::{Bank, BlockClock, ParamSource};

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Swaps along the best direct or two-hop route.
    ///
    /// The route is chosen on the pre-swap state; every hop then runs
    /// through the regular swap path inside one atomic unit.
    ///
    /// # Errors
    ///
    /// - [`AmmError::NoRoute`] if no candidate simulates successfully,
    ///   e.g. because every connecting pool is paused.
    /// - Any single-swap error raised while executing a hop.
    /// - [`AmmError::SlippageExceeded`] if the final output is below
    ///   `min_amount_out`.
    pub fn quick_swap(&mut self, msg: MsgQuickSwap) -> crate::error::Result<RouteQuote> {
        if msg.amount_in.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        let best = self.find_best_route(&msg.denom_in, msg.amount_in, &msg.denom_out)?;
        self.atomic("quick_swap", |tx| {
            tx.execute_route(
                &best.route,
                msg.amount_in,
                &msg.trader,
                &msg.trader,
                msg.min_amount_out,
            )
        })
    }

    /// Swaps along an explicit denom path of up to `max_route_hops` hops.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidRoute`] / [`AmmError::PairNotFound`] for a bad path.
    /// - [`AmmError::DeadlineExceeded`].
    /// - Any single-swap error raised by a hop; earlier hops are rolled back.
    /// - [`AmmError::SlippageExceeded`] on the final output.
    pub fn multi_hop_swap(&mut self, msg: MsgMultiHopSwap) -> crate::error::Result<RouteQuote> {
        if msg.amount_in.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        check_deadline(msg.deadline, self.block.time)?;
        let route = Route::from_denoms(&self.state.pools, &msg.path, self.params.max_route_hops)?;
        self.atomic("multi_hop_swap", |tx| {
            tx.execute_route(
                &route,
                msg.amount_in,
                &msg.trader,
                &msg.trader,
                msg.min_amount_out,
            )
        })
    }

    /// Quotes an explicit path without touching any state.
    ///
    /// # Errors
    ///
    /// As [`multi_hop_swap`](Self::multi_hop_swap), minus the deadline,
    /// slippage and funds checks.
    pub fn simulate_multi_hop(
        &self,
        path: &[Denom],
        amount_in: Amount,
    ) -> crate::error::Result<RouteQuote> {
        let route = Route::from_denoms(&self.state.pools, path, self.params.max_route_hops)?;
        let quote = router::simulate(&self.state.pools, &route, amount_in, &self.params, self.block.time)?;
        debug!(route = %route, amount_out = %quote.amount_out, "route simulated");
        Ok(quote)
    }

    /// The route [`quick_swap`](Self::quick_swap) would take.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidRoute`] if both denoms are equal.
    /// - [`AmmError::NoRoute`] if no candidate simulates successfully.
    pub fn find_best_route(
        &self,
        denom_in: &Denom,
        amount_in: Amount,
        denom_out: &Denom,
    ) -> crate::error::Result<RouteQuote> {
        router::best_route(
            &self.state.pools,
            denom_in,
            amount_in,
            denom_out,
            &self.params,
            self.block.time,
        )
    }

    /// Triangular cycles whose simulated round trip gains at least
    /// `min_profit`.
    #[must_use]
    pub fn get_arbitrage_opportunities(&self, min_profit: BasisPoints) -> Vec<ArbitrageOpportunity> {
        router::find_arbitrage(&self.state.pools, min_profit, &self.params, self.block.time)
    }
}

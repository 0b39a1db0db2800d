//! Multi-hop routing.
//!
//! Routes are sequences of pools; simulation walks them with each pool's
//! pure quote, so a simulated route returns exactly what execution would
//! on the same state. Pools on one route are distinct, which keeps that
//! guarantee without touching pool state.
//!
//! Route selection for `QuickSwap` considers the direct pool and every
//! two-hop path through a connecting denom, and picks by:
//!
//! 1. lowest compound price impact,
//! 2. then largest output,
//! 3. then the lexicographically smallest denom path.

mod route;

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineParams;
use crate::domain::{Amount, BasisPoints, Denom, MAX_BPS, SwapQuote};
use crate::error::AmmError;
use crate::pools::PoolRegistry;

pub use route::{Hop, Route};

/// Result of simulating a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuote {
    /// The simulated route.
    pub route: Route,
    /// Input to the first hop.
    pub amount_in: Amount,
    /// Output of the last hop.
    pub amount_out: Amount,
    /// Per-hop quotes, in order.
    pub hop_quotes: Vec<SwapQuote>,
    /// Compound price impact: `1 − Π(1 − impactᵢ)`.
    pub price_impact: BasisPoints,
}

/// A profitable cycle found by [`find_arbitrage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Cycle starting and ending in the same denom.
    pub route: Route,
    /// Sample input.
    pub amount_in: Amount,
    /// Simulated output of the round trip.
    pub amount_out: Amount,
    /// `(amount_out − amount_in) / amount_in` in basis points.
    pub profit_bps: u32,
}

/// Simulates `route` from the current pool states.
///
/// Each hop applies the same checks as a direct swap, pause included.
///
/// # Errors
///
/// The first hop error: [`AmmError::PoolPaused`], [`AmmError::SwapTooLarge`],
/// [`AmmError::PriceImpactTooHigh`], [`AmmError::InsufficientLiquidity`], …
pub fn simulate(
    registry: &PoolRegistry,
    route: &Route,
    amount_in: Amount,
    params: &EngineParams,
    now: u64,
) -> crate::error::Result<RouteQuote> {
    let mut amount = amount_in;
    let mut hop_quotes = Vec::with_capacity(route.len());
    for hop in route.hops() {
        let pool = registry.get(hop.pool_id)?;
        pool.breaker().ensure_active(hop.pool_id, now)?;
        let quote = pool.quote_exact_in(&hop.denom_in, amount, params)?;
        amount = quote.amount_out();
        hop_quotes.push(quote);
    }
    RouteQuote::from_hops(route.clone(), amount_in, hop_quotes)
}

impl RouteQuote {
    /// Assembles a route result from per-hop quotes, computing the
    /// compound impact.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidRoute`] if `hop_quotes` is empty.
    pub fn from_hops(
        route: Route,
        amount_in: Amount,
        hop_quotes: Vec<SwapQuote>,
    ) -> crate::error::Result<Self> {
        let amount_out = hop_quotes
            .last()
            .map(SwapQuote::amount_out)
            .ok_or(AmmError::InvalidRoute("route has no hops"))?;
        Ok(Self {
            route,
            amount_in,
            amount_out,
            price_impact: compound_impact(&hop_quotes),
            hop_quotes,
        })
    }
}

/// `1 − Π(1 − impactᵢ)`, each factor rounded down so the compound
/// impact never understates.
#[must_use]
pub fn compound_impact(quotes: &[SwapQuote]) -> BasisPoints {
    let keep = quotes.iter().fold(MAX_BPS, |keep, quote| {
        keep * (MAX_BPS - quote.price_impact().get().min(MAX_BPS)) / MAX_BPS
    });
    BasisPoints::new(MAX_BPS - keep)
}

/// The direct route (if a pool exists) and every two-hop route through
/// a connecting denom, in deterministic order.
#[must_use]
pub fn candidates(registry: &PoolRegistry, denom_in: &Denom, denom_out: &Denom) -> Vec<Route> {
    let mut routes = Vec::new();
    for (via, first_pool) in registry.neighbors(denom_in) {
        if via == *denom_out {
            routes.push(vec![Hop {
                pool_id: first_pool,
                denom_in: denom_in.clone(),
                denom_out: denom_out.clone(),
            }]);
            continue;
        }
        for (next, second_pool) in registry.neighbors(&via) {
            if next == *denom_out {
                routes.push(vec![
                    Hop {
                        pool_id: first_pool,
                        denom_in: denom_in.clone(),
                        denom_out: via.clone(),
                    },
                    Hop {
                        pool_id: second_pool,
                        denom_in: via.clone(),
                        denom_out: denom_out.clone(),
                    },
                ]);
            }
        }
    }
    routes
        .into_iter()
        .filter_map(|hops| Route::new(hops, 2).ok())
        .collect()
}

fn preference(a: &RouteQuote, b: &RouteQuote) -> Ordering {
    a.price_impact
        .cmp(&b.price_impact)
        .then_with(|| b.amount_out.cmp(&a.amount_out))
        .then_with(|| a.route.denoms().cmp(&b.route.denoms()))
}

/// Simulates every candidate and returns the preferred one.
///
/// Candidates that fail simulation are skipped.
///
/// # Errors
///
/// - [`AmmError::InvalidRoute`] if `denom_in == denom_out`.
/// - [`AmmError::NoRoute`] if no candidate simulates successfully.
pub fn best_route(
    registry: &PoolRegistry,
    denom_in: &Denom,
    amount_in: Amount,
    denom_out: &Denom,
    params: &EngineParams,
    now: u64,
) -> crate::error::Result<RouteQuote> {
    if denom_in == denom_out {
        return Err(AmmError::InvalidRoute("input and output denoms are equal"));
    }
    candidates(registry, denom_in, denom_out)
        .iter()
        .filter_map(|route| match simulate(registry, route, amount_in, params, now) {
            Ok(quote) => Some(quote),
            Err(err) => {
                debug!(route = %route, error = %err, "route candidate rejected");
                None
            }
        })
        .min_by(preference)
        .ok_or_else(|| AmmError::NoRoute(denom_in.to_string(), denom_out.to_string()))
}

/// Triangular cycles `A → B → C → A` over existing pools, each listed in
/// both directions and starting from its smallest denom.
#[must_use]
pub fn triangular_cycles(registry: &PoolRegistry) -> Vec<Route> {
    let mut starts: Vec<Denom> = registry
        .iter()
        .flat_map(|p| [p.pair().first().clone(), p.pair().second().clone()])
        .collect();
    starts.sort();
    starts.dedup();

    let mut cycles = Vec::new();
    for a in &starts {
        for (b, ab) in registry.neighbors(a) {
            if b <= *a {
                continue;
            }
            for (c, bc) in registry.neighbors(&b) {
                if c <= *a {
                    continue;
                }
                let closing = registry
                    .neighbors(&c)
                    .into_iter()
                    .find(|(d, _)| d == a)
                    .map(|(_, id)| id);
                let Some(ca) = closing else {
                    continue;
                };
                let hops = vec![
                    Hop {
                        pool_id: ab,
                        denom_in: a.clone(),
                        denom_out: b.clone(),
                    },
                    Hop {
                        pool_id: bc,
                        denom_in: b.clone(),
                        denom_out: c.clone(),
                    },
                    Hop {
                        pool_id: ca,
                        denom_in: c.clone(),
                        denom_out: a.clone(),
                    },
                ];
                if let Ok(route) = Route::new(hops, 3) {
                    cycles.push(route);
                }
            }
        }
    }
    cycles
}

/// Cycles whose simulated round trip gains at least `min_profit`.
///
/// Each cycle is sampled with 0.1% of the first pool's input reserve, so
/// the result reflects fees and slippage rather than spot prices alone.
/// Paused pools and failing simulations are skipped.
#[must_use]
pub fn find_arbitrage(
    registry: &PoolRegistry,
    min_profit: BasisPoints,
    params: &EngineParams,
    now: u64,
) -> Vec<ArbitrageOpportunity> {
    triangular_cycles(registry)
        .into_iter()
        .filter_map(|route| {
            let first = route.hops().first()?;
            let reserve = registry
                .get(first.pool_id)
                .and_then(|p| p.direction(&first.denom_in))
                .ok()?
                .reserve_in;
            let sample = Amount::new((reserve.get() / 1_000).max(1));
            let quote = simulate(registry, &route, sample, params, now).ok()?;
            let gain = quote.amount_out.get().checked_sub(sample.get())?;
            let profit_bps = u32::try_from(
                gain.saturating_mul(u128::from(MAX_BPS)) / sample.get(),
            )
            .unwrap_or(u32::MAX);
            (profit_bps >= min_profit.get()).then(|| ArbitrageOpportunity {
                route,
                amount_in: sample,
                amount_out: quote.amount_out,
                profit_bps,
            })
        })
        .collect()
}

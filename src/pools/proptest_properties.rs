//! Property-based tests using `proptest` for pool and engine invariants.
//!
//! Covers six properties:
//!
//! 1. **Swap reversibility**: round-trip A→B→A returns ≤ original.
//! 2. **Invariant preservation**: `k` never decreases across a swap.
//! 3. **Fee monotonicity**: larger input ⇒ larger or equal fee.
//! 4. **Price movement direction**: selling A lowers the B-per-A price.
//! 5. **Simulation fidelity**: `simulate_swap` equals the executed swap.
//! 6. **Liquidity conservation**: add then remove never profits, the
//!    positions always sum to the pool's share supply, and a small
//!    second position never blocks the seed provider's full exit.

use proptest::prelude::*;

use super::Pool;
use crate::config::EngineParams;
use crate::domain::{Address, Amount, BlockContext, Denom, DenomPair, FeeTier, PoolId, Shares};
use crate::keeper::testing::{alice, bob, denom, engine, next_block, pool as create_pool};
use crate::keeper::{MsgAddLiquidity, MsgRemoveLiquidity, MsgSwap};
use crate::liquidity::balanced_amount_b;
use crate::traits::Bank;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn atom() -> Denom {
    denom("atom")
}

fn osmo() -> Denom {
    denom("osmo")
}

fn make_pool(ra: u128, rb: u128) -> Pool {
    let Ok(pair) = DenomPair::new(atom(), osmo()) else {
        panic!("valid pair");
    };
    let mut pool = Pool::new(PoolId::new(1), pair, FeeTier::STANDARD, BlockContext::new(1, 0));
    if pool.deposit(Amount::new(ra), Amount::new(rb), Shares::new(1)).is_err() {
        panic!("seed deposit");
    }
    pool
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Reserve values in range [10_000, 10_000_000] to avoid extremes.
fn reserve_strategy() -> impl Strategy<Value = u128> {
    10_000u128..=10_000_000u128
}

/// Swap size as a fraction of the input reserve, in basis points [1, 1_000].
fn swap_fraction_strategy() -> impl Strategy<Value = u128> {
    1u128..=1_000u128
}

fn sized(reserve: u128, fraction_bps: u128) -> Amount {
    Amount::new((reserve * fraction_bps / 10_000).max(1))
}

// ---------------------------------------------------------------------------
// Property 1: Swap Reversibility
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_swap_reversibility(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        fraction in swap_fraction_strategy(),
    ) {
        let params = EngineParams::default();
        let mut pool = make_pool(ra, rb);
        let swap_in = sized(ra, fraction);

        // A → B
        let Ok(ab) = pool.quote_exact_in(&atom(), swap_in, &params) else {
            return Ok(());
        };
        prop_assert!(pool.apply_swap(&atom(), &ab).is_ok());

        // B → A
        let Ok(ba) = pool.quote_exact_in(&osmo(), ab.amount_out(), &params) else {
            return Ok(());
        };
        prop_assert!(
            ba.amount_out() <= swap_in,
            "round-trip should lose value: final={} > original={}",
            ba.amount_out(), swap_in
        );
    }
}

// ---------------------------------------------------------------------------
// Property 2: Invariant Preservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_k_never_decreases(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        fraction in swap_fraction_strategy(),
        a_to_b in any::<bool>(),
    ) {
        let params = EngineParams::default();
        let mut pool = make_pool(ra, rb);
        let (denom_in, reserve_in) = if a_to_b { (atom(), ra) } else { (osmo(), rb) };
        let Ok(quote) = pool.quote_exact_in(&denom_in, sized(reserve_in, fraction), &params) else {
            return Ok(());
        };
        let k_before = pool.product();
        prop_assert!(pool.apply_swap(&denom_in, &quote).is_ok());
        prop_assert!(
            pool.product() >= k_before,
            "k decreased: {} < {}",
            pool.product(), k_before
        );
    }
}

// ---------------------------------------------------------------------------
// Property 3: Fee Monotonicity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_fee_monotonic(
        reserve in reserve_strategy(),
        small in swap_fraction_strategy(),
        extra in 0u128..=500u128,
    ) {
        let params = EngineParams::default();
        let pool = make_pool(reserve, reserve);
        let large = (small + extra).min(1_000);
        let (Ok(q_small), Ok(q_large)) = (
            pool.quote_exact_in(&atom(), sized(reserve, small), &params),
            pool.quote_exact_in(&atom(), sized(reserve, large), &params),
        ) else {
            return Ok(());
        };
        prop_assert!(q_large.fee() >= q_small.fee());
        prop_assert!(q_large.amount_out() >= q_small.amount_out());
    }
}

// ---------------------------------------------------------------------------
// Property 4: Price Movement Direction
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_selling_a_lowers_price(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        fraction in swap_fraction_strategy(),
    ) {
        let params = EngineParams::default();
        let mut pool = make_pool(ra, rb);
        let Ok(before) = pool.price() else {
            return Ok(());
        };
        let Ok(quote) = pool.quote_exact_in(&atom(), sized(ra, fraction), &params) else {
            return Ok(());
        };
        prop_assert!(pool.apply_swap(&atom(), &quote).is_ok());
        let Ok(after) = pool.price() else {
            return Ok(());
        };
        prop_assert!(after <= before, "price rose: {} > {}", after, before);
    }
}

// ---------------------------------------------------------------------------
// Property 5: Simulation Fidelity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_simulation_matches_execution(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        fraction in swap_fraction_strategy(),
    ) {
        let mut engine = engine();
        let id = create_pool(&mut engine, "atom", "osmo", ra, rb);
        let amount_in = sized(ra, fraction);
        let Ok(simulated) = engine.simulate_swap(id, &atom(), amount_in, &osmo()) else {
            return Ok(());
        };
        let executed = engine.swap(MsgSwap {
            trader: bob(),
            pool_id: id,
            denom_in: atom(),
            amount_in,
            denom_out: osmo(),
            min_amount_out: simulated.amount_out(),
            deadline: 0,
        });
        prop_assert_eq!(executed, Ok(simulated));
    }
}

// ---------------------------------------------------------------------------
// Property 6: Liquidity Conservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_add_remove_never_profits(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        fraction in swap_fraction_strategy(),
    ) {
        let mut engine = engine();
        let id = create_pool(&mut engine, "atom", "osmo", ra, rb);
        let amount_a = sized(ra, fraction);
        let Ok(amount_b) = balanced_amount_b(amount_a, Amount::new(ra), Amount::new(rb)) else {
            return Ok(());
        };
        let Ok(added) = engine.add_liquidity(MsgAddLiquidity {
            provider: bob(),
            pool_id: id,
            amount_a,
            amount_b,
        }) else {
            return Ok(());
        };
        next_block(&mut engine, 6);
        let Ok(removed) = engine.remove_liquidity(MsgRemoveLiquidity {
            provider: bob(),
            pool_id: id,
            shares: added.shares,
        }) else {
            return Ok(());
        };
        prop_assert!(removed.amount_a <= added.amount_a);
        prop_assert!(removed.amount_b <= added.amount_b);
    }

    #[test]
    fn prop_seed_provider_exits_past_small_position(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        dust in 1u128..=1_000u128,
    ) {
        let mut engine = engine();
        let id = create_pool(&mut engine, "atom", "osmo", ra, rb);
        let Ok(dust_b) = balanced_amount_b(Amount::new(dust), Amount::new(ra), Amount::new(rb)) else {
            return Ok(());
        };
        let Ok(added) = engine.add_liquidity(MsgAddLiquidity {
            provider: bob(),
            pool_id: id,
            amount_a: Amount::new(dust),
            amount_b: dust_b,
        }) else {
            return Ok(());
        };
        next_block(&mut engine, 6);
        let Ok(seed) = engine.get_liquidity_position(id, &alice()).map(|p| p.shares()) else {
            panic!("seed position exists");
        };
        let exit = engine.remove_liquidity(MsgRemoveLiquidity {
            provider: alice(),
            pool_id: id,
            shares: seed,
        });
        prop_assert!(exit.is_ok(), "seed exit failed: {:?}", exit);
        let Ok(pool) = engine.get_pool(id) else {
            panic!("pool exists");
        };
        prop_assert_eq!(pool.total_shares(), added.shares);
        prop_assert!(!pool.reserve_a().is_zero() && !pool.reserve_b().is_zero());
    }

    #[test]
    fn prop_positions_sum_to_supply(
        ra in reserve_strategy(),
        deposits in proptest::collection::vec(swap_fraction_strategy(), 1..6),
    ) {
        let mut engine = engine();
        let id = create_pool(&mut engine, "atom", "osmo", ra, ra);
        for (i, fraction) in deposits.into_iter().enumerate() {
            let provider = if i % 2 == 0 { alice() } else { bob() };
            let amount = sized(ra, fraction);
            let _ = engine.add_liquidity(MsgAddLiquidity {
                provider,
                pool_id: id,
                amount_a: amount,
                amount_b: amount,
            });
        }
        let Ok(pool) = engine.get_pool(id) else {
            panic!("pool exists");
        };
        let held = engine.state().positions().shares_in_pool(id);
        prop_assert_eq!(held, pool.total_shares().get());
        let escrow = Address::pool_escrow();
        prop_assert_eq!(
            engine.bank().balance(&escrow, &atom()).get(),
            pool.reserve_a().get() + pool.protocol_fees().0.get()
        );
    }
}

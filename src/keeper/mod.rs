//! The exchange engine.
//!
//! [`Engine`] owns the pool registry, LP positions and the order book,
//! and drives them through the three collaborator traits. Every mutating
//! entry point runs as one atomic unit:
//!
//! 1. the current [`EngineState`] is cloned into a scratch transaction,
//!    together with a buffered view of the bank;
//! 2. the operation runs against the scratch copies, checks included;
//! 3. on success the buffered transfers are replayed against the real
//!    bank and the scratch state replaces the live one;
//! 4. on any error both copies are dropped, leaving state and balances
//!    exactly as they were.
//!
//! Multi-hop swaps and order fills compose several swap legs inside one
//! transaction, so a failure in a later leg rolls back the earlier ones.
//!
//! # Entry points
//!
//! | Area | Mutations | Queries |
//! |------|-----------|---------|
//! | Pools | `create_pool`, `create_pool_with_fee` | `get_pool`, `get_pool_by_tokens`, `list_pools`, `get_pool_stats` |
//! | Liquidity | `add_liquidity`, `add_liquidity_balanced`, `remove_liquidity` | `get_liquidity_position` |
//! | Swaps | `swap`, `swap_with_slippage` | `simulate_swap` |
//! | Routing | `quick_swap`, `multi_hop_swap` | `simulate_multi_hop`, `find_best_route`, `get_arbitrage_opportunities` |
//! | Orders | `place_limit_order`, `cancel_limit_order`, `cancel_all_limit_orders` | `get_order`, `list_orders_by_owner`, `order_book` |
//! | Commit-reveal | `commit_swap`, `reveal_swap`, `cancel_swap_commitment` | `get_swap_commitment`, `list_swap_commitments`, `requires_commit_reveal` |
//! | Governance | `resume`, `emergency_pause`, `withdraw_protocol_fees` | `circuit_breaker_state`, `params` |
//! | Block hooks | `begin_block`, `end_block` | |
//! | Packets | `on_recv_swap_packet` | `validate_swap_packet` |

mod abci;
mod commit;
mod governance;
mod liquidity;
mod msgs;
mod orders;
mod overlay;
mod packet;
mod pools;
mod routing;
mod swap;
mod tx;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::commit::CommitmentBook;
use crate::config::EngineParams;
use crate::domain::BlockContext;
use crate::liquidity::PositionBook;
use crate::orders::OrderBook;
use crate::pools::PoolRegistry;
use crate::traits::{Bank, BlockClock, ParamSource};

pub use abci::{EndBlockReport, OrderFill};
pub use governance::BreakerState;
pub use msgs::{
    CommitReceipt, LiquidityReceipt, MsgAddLiquidity, MsgAddLiquidityBalanced, MsgCommitSwap,
    MsgCreatePool, MsgMultiHopSwap, MsgPlaceOrder, MsgQuickSwap, MsgRemoveLiquidity,
    MsgRevealSwap, MsgSwap, MsgSwapWithSlippage,
};
pub use orders::OrderBookView;
pub use packet::{SWAP_PACKET_TYPE, SwapAcknowledgement, SwapPacket};
pub use pools::PoolStats;

use tx::Tx;

/// Everything the engine persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pools: PoolRegistry,
    positions: PositionBook,
    orders: OrderBook,
    #[serde(default)]
    commitments: CommitmentBook,
}

impl EngineState {
    /// Returns the pool registry.
    #[must_use]
    pub const fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    /// Returns the LP position book.
    #[must_use]
    pub const fn positions(&self) -> &PositionBook {
        &self.positions
    }

    /// Returns the limit order book.
    #[must_use]
    pub const fn orders(&self) -> &OrderBook {
        &self.orders
    }

    /// Returns the pending swap commitments.
    #[must_use]
    pub const fn commitments(&self) -> &CommitmentBook {
        &self.commitments
    }
}

/// Deterministic AMM state machine.
///
/// # Examples
///
/// ```
/// use hydra_dex::adapters::{InMemoryBank, ManualClock, StaticParams};
/// use hydra_dex::domain::{Address, Amount, Denom};
/// use hydra_dex::keeper::{Engine, MsgCreatePool};
///
/// let (Ok(atom), Ok(osmo)) = (Denom::new("atom"), Denom::new("osmo")) else {
///     return;
/// };
/// let alice = Address::new("alice");
/// let mut bank = InMemoryBank::new();
/// let _ = bank.mint(&alice, &atom, Amount::new(1_000_000));
/// let _ = bank.mint(&alice, &osmo, Amount::new(2_000_000));
///
/// let Ok(mut engine) = Engine::new(bank, ManualClock::new(1, 1_000), StaticParams::default())
/// else {
///     return;
/// };
/// let receipt = engine.create_pool(MsgCreatePool {
///     creator: alice,
///     denom_a: atom,
///     denom_b: osmo,
///     amount_a: Amount::new(1_000_000),
///     amount_b: Amount::new(2_000_000),
///     fee_tier: None,
/// });
/// assert!(receipt.is_ok());
/// ```
#[derive(Debug)]
pub struct Engine<B, C, P> {
    state: EngineState,
    bank: B,
    clock: C,
    param_source: P,
    block: BlockContext,
    params: EngineParams,
}

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Creates an engine with empty state, snapshotting the clock and
    /// parameters as if a block had just begun.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidParams`](crate::error::AmmError::InvalidParams)
    /// if the parameter source yields an invalid set.
    pub fn new(bank: B, clock: C, param_source: P) -> crate::error::Result<Self> {
        Self::with_state(EngineState::default(), bank, clock, param_source)
    }

    /// Creates an engine around previously exported state.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_state(
        state: EngineState,
        bank: B,
        clock: C,
        param_source: P,
    ) -> crate::error::Result<Self> {
        let params = param_source.params();
        params.validate()?;
        let block = clock.now();
        Ok(Self {
            state,
            bank,
            clock,
            param_source,
            block,
            params,
        })
    }

    /// Returns the persisted state.
    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    /// Returns the bank.
    #[must_use]
    pub const fn bank(&self) -> &B {
        &self.bank
    }

    /// Returns the bank for direct mutation by the host.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    /// Returns the clock for the host to advance.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Returns the parameter source for governance updates.
    pub fn param_source_mut(&mut self) -> &mut P {
        &mut self.param_source
    }

    /// Block coordinates of the current block.
    #[must_use]
    pub const fn block(&self) -> BlockContext {
        self.block
    }

    /// Runs `f` as one atomic unit.
    fn atomic<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut Tx<'_, B>) -> crate::error::Result<T>,
    ) -> crate::error::Result<T> {
        let mut tx = Tx::new(self.state.clone(), &self.bank, self.block, &self.params);
        let value = match f(&mut tx) {
            Ok(value) => value,
            Err(err) => {
                warn!(op, error = %err, "operation rejected");
                return Err(err);
            }
        };
        let (state, journal) = tx.finish();
        if let Err(err) = overlay::replay(&mut self.bank, &journal) {
            warn!(op, error = %err, "settlement failed, operation rolled back");
            return Err(err);
        }
        self.state = state;
        info!(op, transfers = journal.len(), height = self.block.height, "operation committed");
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod testing {
    use super::*;
    use crate::adapters::{InMemoryBank, ManualClock, StaticParams};
    use crate::domain::{Address, Amount, Denom, PoolId};

    pub(crate) type TestEngine = Engine<InMemoryBank, ManualClock, StaticParams>;

    pub(crate) const START_TIME: u64 = 1_700_000_000;

    pub(crate) fn denom(s: &str) -> Denom {
        let Ok(d) = Denom::new(s) else {
            panic!("valid denom");
        };
        d
    }

    pub(crate) fn alice() -> Address {
        Address::new("alice")
    }

    pub(crate) fn bob() -> Address {
        Address::new("bob")
    }

    pub(crate) fn gov() -> Address {
        Address::new("gov")
    }

    /// Engine whose accounts hold 10¹² of every test denom and the
    /// native denom.
    pub(crate) fn engine() -> TestEngine {
        engine_with(EngineParams::default())
    }

    pub(crate) fn engine_with(params: EngineParams) -> TestEngine {
        let mut bank = InMemoryBank::new();
        for owner in [alice(), bob()] {
            for d in ["atom", "osmo", "usdc", "juno", crate::domain::NATIVE_DENOM] {
                if bank.mint(&owner, &denom(d), Amount::new(1_000_000_000_000)).is_err() {
                    panic!("mint failed");
                }
            }
        }
        let Ok(engine) = Engine::new(
            bank,
            ManualClock::new(1, START_TIME),
            StaticParams::new(params),
        ) else {
            panic!("valid params");
        };
        engine
    }

    /// Creates a pool seeded by alice.
    pub(crate) fn pool(engine: &mut TestEngine, a: &str, b: &str, amount_a: u128, amount_b: u128) -> PoolId {
        let Ok(receipt) = engine.create_pool(MsgCreatePool {
            creator: alice(),
            denom_a: denom(a),
            denom_b: denom(b),
            amount_a: Amount::new(amount_a),
            amount_b: Amount::new(amount_b),
            fee_tier: None,
        }) else {
            panic!("pool created");
        };
        receipt.pool_id
    }

    /// Advances one block, `secs` seconds later, and runs both hooks.
    pub(crate) fn next_block(engine: &mut TestEngine, secs: u64) -> EndBlockReport {
        engine.clock_mut().advance(secs);
        engine.begin_block();
        engine.end_block()
    }
}

//! # Hydra DEX
//!
//! Deterministic exchange engine for a blockchain host: constant-product
//! pools, LP share accounting, exact-in swaps, multi-hop routing, resting
//! limit orders matched at block end, commit-reveal for large swaps, and
//! per-pool circuit breakers.
//!
//! The engine is a pure state machine. Token custody, block time and
//! governance parameters come from the host through three traits
//! ([`Bank`](traits::Bank), [`BlockClock`](traits::BlockClock),
//! [`ParamSource`](traits::ParamSource)); in-memory versions live in
//! [`adapters`].
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! hydra-dex = "0.1"
//! ```
//!
//! ## Create a pool and execute a swap
//!
//! ```rust
//! use hydra_dex::prelude::*;
//!
//! # fn main() -> hydra_dex::error::Result<()> {
//! let (atom, osmo) = (Denom::new("atom")?, Denom::new("osmo")?);
//! let (alice, bob) = (Address::new("alice"), Address::new("bob"));
//!
//! // 1. Fund two accounts
//! let mut bank = InMemoryBank::new();
//! bank.mint(&alice, &atom, Amount::new(1_000_000))?;
//! bank.mint(&alice, &osmo, Amount::new(2_000_000))?;
//! bank.mint(&bob, &atom, Amount::new(10_000))?;
//!
//! // 2. Start the engine at block 1
//! let mut engine = Engine::new(bank, ManualClock::new(1, 1_700_000_000), StaticParams::default())?;
//!
//! // 3. Seed a 1:2 pool
//! let receipt = engine.create_pool(MsgCreatePool {
//!     creator: alice,
//!     denom_a: atom.clone(),
//!     denom_b: osmo.clone(),
//!     amount_a: Amount::new(1_000_000),
//!     amount_b: Amount::new(2_000_000),
//!     fee_tier: None,
//! })?;
//!
//! // 4. Swap 1 000 atom for osmo (0.30% fee)
//! let quote = engine.swap(MsgSwap {
//!     trader: bob,
//!     pool_id: receipt.pool_id,
//!     denom_in: atom,
//!     amount_in: Amount::new(1_000),
//!     denom_out: osmo,
//!     min_amount_out: Amount::new(1_990),
//!     deadline: 0,
//! })?;
//!
//! assert_eq!(quote.amount_out(), Amount::new(1_992));
//! assert_eq!(quote.fee(), Amount::new(3));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │     Host      │  Bank + BlockClock + ParamSource
//! └──────┬───────┘
//!        │ Msg* / queries / begin_block / end_block
//!        ▼
//! ┌──────────────┐
//! │    Keeper     │  Engine: atomic units, routing, orders, governance
//! └──────┬───────┘
//!        │ pure transitions, checked by the guard and breaker
//!        ▼
//! ┌──────────────┐
//! │  Pools / LP   │  Pool, PoolRegistry, PositionBook, OrderBook,
//! │  / Orders     │  CommitmentBook
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │    Domain     │  Amount, Shares, Price, Denom, FeeTier, SwapQuote, …
//! └──────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`Price`](domain::Price), [`Denom`](domain::Denom), etc. |
//! | [`math`] | Checked arithmetic, explicit rounding, 256-bit helpers |
//! | [`config`] | [`EngineParams`](config::EngineParams), loaded from TOML |
//! | [`traits`] | Host collaborator seams |
//! | [`adapters`] | In-memory collaborators |
//! | [`pools`] | [`Pool`](pools::Pool) swap math and the [`PoolRegistry`](pools::PoolRegistry) |
//! | [`liquidity`] | Share minting and LP positions |
//! | [`guard`] | Constant-product band check |
//! | [`breaker`] | Per-pool circuit breaker |
//! | [`orders`] | Limit orders and the order book |
//! | [`commit`] | Commit-reveal protection for large swaps |
//! | [`router`] | Route discovery, simulation and arbitrage scan |
//! | [`keeper`] | The [`Engine`](keeper::Engine) and its entry points |
//! | [`error`] | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports |

pub mod adapters;
pub mod breaker;
pub mod commit;
pub mod config;
pub mod domain;
pub mod error;
pub mod guard;
pub mod keeper;
pub mod liquidity;
pub mod math;
pub mod orders;
pub mod pools;
pub mod prelude;
pub mod router;
pub mod traits;

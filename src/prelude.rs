//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use hydra_dex::prelude::*;
//! ```
//!
//! Brings the domain value types, the engine and its messages, the
//! collaborator traits with their in-memory adapters, and the error
//! types into scope.

pub use crate::domain::{
    Address, Amount, BasisPoints, Denom, DenomPair, FeeTier, OrderId, OrderStatus, PoolId,
    Price, Rounding, Shares, Side, SwapQuote,
};

pub use crate::traits::{Bank, BlockClock, ParamSource};

pub use crate::adapters::{InMemoryBank, ManualClock, StaticParams};

pub use crate::config::EngineParams;

pub use crate::keeper::{
    CommitReceipt, Engine, EndBlockReport, MsgAddLiquidity, MsgAddLiquidityBalanced,
    MsgCommitSwap, MsgCreatePool, MsgMultiHopSwap, MsgPlaceOrder, MsgQuickSwap,
    MsgRemoveLiquidity, MsgRevealSwap, MsgSwap, MsgSwapWithSlippage,
};

pub use crate::commit::{CommitmentHash, SwapIntent};

pub use crate::router::{Route, RouteQuote};

pub use crate::error::{AmmError, Result};

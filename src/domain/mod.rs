//! Fundamental domain value types used throughout the engine.
//!
//! This module contains the value types that model the exchange domain:
//! denominations, amounts, shares, prices, fees, identifiers and quotes.
//! Types that carry an invariant use newtypes with validated constructors.

mod address;
mod amount;
mod basis_points;
mod block;
mod denom;
mod denom_pair;
pub(crate) mod entries;
mod fee_tier;
mod ids;
mod order;
mod page;
mod price;
mod rounding;
mod shares;
mod swap_quote;

pub use address::{Address, COMMIT_ESCROW, FEE_COLLECTOR, ORDER_ESCROW, POOL_ESCROW};
pub use amount::Amount;
pub use basis_points::{BasisPoints, MAX_BPS};
pub use block::BlockContext;
pub use denom::{Denom, MAX_DENOM_LEN, NATIVE_DENOM};
pub use denom_pair::DenomPair;
pub use fee_tier::{FeeSplit, FeeTier};
pub use ids::{OrderId, PoolId};
pub use order::{OrderStatus, Side};
pub use page::{Page, resolve_limit};
pub use price::Price;
pub use rounding::Rounding;
pub use shares::Shares;
pub use swap_quote::SwapQuote;

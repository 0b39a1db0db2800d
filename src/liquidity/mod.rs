//! Liquidity-provider accounting.
//!
//! [`PositionBook`] tracks who holds which shares; the functions in this
//! module compute how many shares a deposit mints and what a burn pays
//! out. The engine combines both with the invariant guard and the bank.

mod math;
mod position;

pub use math::{balanced_amount_b, bootstrap_shares, check_ratio, proportional_shares, redemption};
pub use position::{LiquidityPosition, PositionBook};

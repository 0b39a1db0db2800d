//! Resting limit orders.
//!
//! Orders escrow their input at placement and are matched against the
//! pool at block end, at the pool price rather than the limit price.
//!
//! Prices are quoted as token B per token A:
//!
//! | Side | Spends | Fills when |
//! |------|--------|------------|
//! | [`Side::Sell`](crate::domain::Side::Sell) | token A | pool price ≥ limit |
//! | [`Side::Buy`](crate::domain::Side::Buy) | token B | pool price ≤ limit |

mod book;
mod order;

pub use book::OrderBook;
pub use order::{LimitOrder, NewOrder};

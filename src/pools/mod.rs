//! Constant-product pools and the registry that owns them.
//!
//! | Type | Role |
//! |------|------|
//! | [`Pool`] | Reserves, shares, fees, breaker state and swap math |
//! | [`PoolRegistry`] | Id-keyed store with a unique pair index |
//!
//! Pool methods are pure state transitions. Token movement, invariant
//! checks and atomicity are the engine's responsibility.

mod pool;
mod registry;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;

pub use pool::{Direction, Pool, price_impact};
pub use registry::PoolRegistry;

//! Engine configuration.
//!
//! [`EngineParams`] is the single block-scoped snapshot of every
//! governance-tunable value. It loads from TOML and is validated before
//! the engine accepts it.

mod params;

pub use params::{EngineParams, MAX_ROUTE_HOPS};

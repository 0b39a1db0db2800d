//! Block clock collaborator.

use crate::domain::BlockContext;

/// Deterministic source of block height and time.
///
/// Every replica must observe the same values for the same block, so
/// implementations read consensus data, never the wall clock.
pub trait BlockClock {
    /// Returns the current block coordinates.
    fn now(&self) -> BlockContext;
}

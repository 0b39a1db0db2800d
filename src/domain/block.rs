//! Block height and time as seen by one operation.

use serde::{Deserialize, Serialize};

/// Deterministic block coordinates, snapshotted once per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockContext {
    /// Block height.
    pub height: u64,
    /// Block time in unix seconds.
    pub time: u64,
}

impl BlockContext {
    /// Creates a block context.
    #[must_use]
    pub const fn new(height: u64, time: u64) -> Self {
        Self { height, time }
    }
}

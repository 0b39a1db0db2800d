//! Manually advanced block clock.

use crate::domain::BlockContext;
use crate::traits::BlockClock;

/// A [`BlockClock`] the caller advances explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    current: BlockContext,
}

impl ManualClock {
    /// Starts the clock at the given height and unix time.
    #[must_use]
    pub const fn new(height: u64, time: u64) -> Self {
        Self {
            current: BlockContext::new(height, time),
        }
    }

    /// Moves to the next block, `secs` seconds later.
    pub fn advance(&mut self, secs: u64) {
        self.current.height = self.current.height.saturating_add(1);
        self.current.time = self.current.time.saturating_add(secs);
    }

    /// Jumps to an explicit block.
    pub fn set(&mut self, height: u64, time: u64) {
        self.current = BlockContext::new(height, time);
    }
}

impl BlockClock for ManualClock {
    fn now(&self) -> BlockContext {
        self.current
    }
}

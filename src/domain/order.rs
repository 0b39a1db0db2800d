//! Limit-order side and lifecycle status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Direction of a limit order relative to the pool's token A.
///
/// Prices are quoted as token B per token A, so a `Sell` spends token A
/// and waits for the price to rise to its limit; a `Buy` spends token B
/// and waits for the price to fall to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Spend token B to acquire token A.
    Buy,
    /// Spend token A to acquire token B.
    Sell,
}

impl Side {
    /// Returns `true` if the order spends the pool's first denom.
    #[must_use]
    pub const fn spends_first(&self) -> bool {
        matches!(self, Self::Sell)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        })
    }
}

/// Lifecycle of a limit order.
///
/// `Open` is the only non-terminal status. Transitions are
/// `Open → {Filled, Cancelled, Expired}` and never go back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Resting; may be partially filled.
    Open,
    /// Completely filled.
    Filled,
    /// Cancelled by its owner; remainder refunded.
    Cancelled,
    /// Swept after its expiration height; remainder refunded.
    Expired,
}

impl OrderStatus {
    /// Returns `true` for `Filled`, `Cancelled` and `Expired`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }

    /// Returns `true` if moving from `self` to `next` is permitted.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(self, Self::Open) && next.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Filled => "filled",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_one_way() {
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Filled));
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Expired));
        assert!(!OrderStatus::Open.can_transition_to(OrderStatus::Open));
        assert!(!OrderStatus::Filled.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Expired.can_transition_to(OrderStatus::Open));
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).ok();
        assert_eq!(json.as_deref(), Some("\"cancelled\""));
        assert_eq!(Side::Sell.to_string(), "sell");
        assert!(Side::Sell.spends_first());
    }
}

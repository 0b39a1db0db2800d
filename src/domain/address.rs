//! Account addresses and the engine's module accounts.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An account address as delivered by the transaction layer.
///
/// The engine never interprets the string; signature checks happen
/// upstream. The module accounts below are the only addresses the engine
/// itself moves funds into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

/// Escrow holding all pool reserves and accrued fees.
pub const POOL_ESCROW: &str = "module:dex/pool";

/// Escrow holding the unfilled input of resting limit orders.
pub const ORDER_ESCROW: &str = "module:dex/order";

/// Escrow holding swap commitment deposits.
pub const COMMIT_ESCROW: &str = "module:dex/commit";

/// Protocol treasury receiving forfeited deposits and cancellation fees.
pub const FEE_COLLECTOR: &str = "module:fee_collector";

impl Address {
    /// Wraps an address string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The pool escrow module account.
    #[must_use]
    pub fn pool_escrow() -> Self {
        Self::new(POOL_ESCROW)
    }

    /// The limit-order escrow module account.
    #[must_use]
    pub fn order_escrow() -> Self {
        Self::new(ORDER_ESCROW)
    }

    /// The commitment deposit escrow module account.
    #[must_use]
    pub fn commit_escrow() -> Self {
        Self::new(COMMIT_ESCROW)
    }

    /// The protocol fee collector module account.
    #[must_use]
    pub fn fee_collector() -> Self {
        Self::new(FEE_COLLECTOR)
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for an empty address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_accounts_are_distinct() {
        assert_ne!(Address::pool_escrow(), Address::order_escrow());
        assert_ne!(Address::commit_escrow(), Address::fee_collector());
        assert_ne!(Address::commit_escrow(), Address::order_escrow());
        assert_eq!(Address::pool_escrow().as_str(), POOL_ESCROW);
    }

    #[test]
    fn display_and_empty() {
        assert_eq!(Address::from("alice").to_string(), "alice");
        assert!(Address::new("").is_empty());
    }
}

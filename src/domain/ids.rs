//! Sequential identifiers for pools and limit orders.

use core::fmt;

use serde::{Deserialize, Serialize};

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn get(&self) -> u64 {
                self.0
            }

            /// Returns the identifier that follows this one, or `None` at `u64::MAX`.
            #[must_use]
            pub const fn next(&self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(v) => Some(Self(v)),
                    None => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

sequential_id!(
    /// Identifier of a liquidity pool. Assigned from 1 in creation order.
    PoolId
);

sequential_id!(
    /// Identifier of a limit order. Assigned from 1 in placement order.
    OrderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_value() {
        assert!(PoolId::new(1) < PoolId::new(2));
        assert_eq!(OrderId::new(7).get(), 7);
    }

    #[test]
    fn next_stops_at_max() {
        assert_eq!(PoolId::new(1).next(), Some(PoolId::new(2)));
        assert_eq!(OrderId::new(u64::MAX).next(), None);
    }

    #[test]
    fn serde_is_bare_number() {
        let json = serde_json::to_string(&PoolId::new(3)).ok();
        assert_eq!(json.as_deref(), Some("3"));
    }
}

//! LP share units.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Amount;

/// Fungible LP share units representing proportional pool ownership.
///
/// Distinct from [`Amount`] because shares are never a token balance:
/// they are only minted and burned by liquidity operations.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::Shares;
///
/// let a = Shares::new(1_000);
/// assert_eq!(a.checked_add(&Shares::new(500)), Some(Shares::new(1_500)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Shares(Amount);

impl Shares {
    /// No shares.
    pub const ZERO: Self = Self(Amount::ZERO);

    /// Creates shares from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(Amount::new(value))
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0.get()
    }

    /// Returns `true` if no shares are represented.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(&other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(&other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Reinterprets the share count as an [`Amount`] for reporting.
    #[must_use]
    pub const fn as_amount(&self) -> Amount {
        self.0
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_get() {
        assert_eq!(Shares::new(42).get(), 42);
        assert!(Shares::ZERO.is_zero());
        assert_eq!(Shares::default(), Shares::ZERO);
    }

    #[test]
    fn checked_ops() {
        assert_eq!(Shares::new(u128::MAX).checked_add(&Shares::new(1)), None);
        assert_eq!(Shares::new(1).checked_sub(&Shares::new(2)), None);
        assert_eq!(
            Shares::new(5).checked_sub(&Shares::new(2)),
            Some(Shares::new(3))
        );
    }

    #[test]
    fn serde_is_string() {
        let json = serde_json::to_string(&Shares::new(7)).ok();
        assert_eq!(json.as_deref(), Some("\"7\""));
    }
}

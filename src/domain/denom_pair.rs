//! Unordered pair of distinct denominations in canonical order.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Denom;
use crate::error::AmmError;

/// An unordered pair of distinct denoms, stored canonically sorted.
///
/// The canonical ordering guarantees `first() < second()`, so `(A, B)`
/// and `(B, A)` produce the same value. The pool registry indexes pools
/// by this type.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Denom, DenomPair};
///
/// let atom = Denom::new("uatom").expect("valid");
/// let osmo = Denom::new("uosmo").expect("valid");
///
/// let pair = DenomPair::new(osmo.clone(), atom.clone()).expect("distinct");
/// assert_eq!(pair.first(), &atom);
/// assert_eq!(pair.second(), &osmo);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DenomPair {
    first: Denom,
    second: Denom,
}

impl DenomPair {
    /// Creates a canonically ordered pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidDenom`] if both denoms are equal.
    pub fn new(a: Denom, b: Denom) -> crate::error::Result<Self> {
        match a.cmp(&b) {
            core::cmp::Ordering::Less => Ok(Self {
                first: a,
                second: b,
            }),
            core::cmp::Ordering::Greater => Ok(Self {
                first: b,
                second: a,
            }),
            core::cmp::Ordering::Equal => Err(AmmError::InvalidDenom(format!(
                "pair requires two distinct denoms, got {a} twice"
            ))),
        }
    }

    /// Returns the lexicographically smaller denom (token A).
    #[must_use]
    pub const fn first(&self) -> &Denom {
        &self.first
    }

    /// Returns the lexicographically larger denom (token B).
    #[must_use]
    pub const fn second(&self) -> &Denom {
        &self.second
    }

    /// Returns `true` if `denom` is part of this pair.
    #[must_use]
    pub fn contains(&self, denom: &Denom) -> bool {
        self.first == *denom || self.second == *denom
    }

    /// Returns the counterpart of `denom`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidDenom`] if `denom` is not in the pair.
    pub fn other(&self, denom: &Denom) -> crate::error::Result<&Denom> {
        if *denom == self.first {
            Ok(&self.second)
        } else if *denom == self.second {
            Ok(&self.first)
        } else {
            Err(AmmError::InvalidDenom(format!(
                "{denom} is not part of pair {self}"
            )))
        }
    }

    /// Returns `true` if swapping `denom_in` moves from token A to token B.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidDenom`] if `denom_in` is not in the pair.
    pub fn is_a_to_b(&self, denom_in: &Denom) -> crate::error::Result<bool> {
        if *denom_in == self.first {
            Ok(true)
        } else if *denom_in == self.second {
            Ok(false)
        } else {
            Err(AmmError::InvalidDenom(format!(
                "{denom_in} is not part of pair {self}"
            )))
        }
    }
}

impl fmt::Display for DenomPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

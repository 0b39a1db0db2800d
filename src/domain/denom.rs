//! Validated token denomination.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AmmError;

/// Maximum denomination length in bytes.
pub const MAX_DENOM_LEN: usize = 128;

/// Staking denom of the host chain; commitment deposits default to it.
pub const NATIVE_DENOM: &str = "stake";

/// A token denomination such as `uatom` or `ibc/27394FB0`.
///
/// Denoms are ASCII: the first character is a letter and the rest are
/// letters, digits, `/`, `-` or `_`, for a total of 1 to 128 bytes.
/// Ordering is byte-lexicographic, which is what makes
/// [`DenomPair`](super::DenomPair) canonical.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::Denom;
///
/// assert!(Denom::new("uatom").is_ok());
/// assert!(Denom::new("ibc/27394FB0").is_ok());
/// assert!(Denom::new("1bad").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Denom(String);

impl Denom {
    /// Creates a validated denomination.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidDenom`] if the string is empty, too long,
    /// starts with a non-letter, or contains a forbidden character.
    pub fn new(value: impl Into<String>) -> crate::error::Result<Self> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// The host chain's staking denom, [`NATIVE_DENOM`].
    #[must_use]
    pub fn native() -> Self {
        Self(NATIVE_DENOM.to_owned())
    }

    fn validate(value: &str) -> crate::error::Result<()> {
        let bytes = value.as_bytes();
        let Some(first) = bytes.first() else {
            return Err(AmmError::InvalidDenom("empty denom".into()));
        };
        if bytes.len() > MAX_DENOM_LEN {
            return Err(AmmError::InvalidDenom(format!(
                "denom longer than {MAX_DENOM_LEN} bytes"
            )));
        }
        if !first.is_ascii_alphabetic() {
            return Err(AmmError::InvalidDenom(format!(
                "{value}: must start with a letter"
            )));
        }
        if let Some(bad) = bytes
            .iter()
            .find(|b| !(b.is_ascii_alphanumeric() || matches!(b, b'/' | b'-' | b'_')))
        {
            return Err(AmmError::InvalidDenom(format!(
                "{value}: forbidden character {:?}",
                char::from(*bad)
            )));
        }
        Ok(())
    }

    /// Returns the denomination as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Denom {
    type Error = AmmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Denom {
    type Error = AmmError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Denom> for String {
    fn from(value: Denom) -> Self {
        value.0
    }
}

impl AsRef<str> for Denom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Denom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

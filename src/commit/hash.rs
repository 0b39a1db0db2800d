//! Commitment hashes and the swap intent they bind.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{Address, Amount, Denom, PoolId};
use crate::error::AmmError;

/// SHA-256 digest of a [`SwapIntent`].
///
/// Serializes and displays as 64 lowercase hex characters.
///
/// # Examples
///
/// ```
/// use hydra_dex::commit::CommitmentHash;
///
/// let hash = CommitmentHash::from_bytes([0xab; 32]);
/// let Ok(parsed) = hash.to_string().parse::<CommitmentHash>() else {
///     return;
/// };
/// assert_eq!(parsed, hash);
/// assert!("abcd".parse::<CommitmentHash>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitmentHash([u8; 32]);

impl CommitmentHash {
    /// Wraps a raw digest.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw digest.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for CommitmentHash {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| AmmError::CommitmentMismatch("hash must be 64 hex characters"))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for CommitmentHash {
    type Error = AmmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CommitmentHash> for String {
    fn from(value: CommitmentHash) -> Self {
        hex::encode(value.0)
    }
}

impl fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Everything a commitment hides until the reveal.
///
/// The digest covers, in order: the pool id as 8 big-endian bytes, both
/// denoms, both amounts as 16 big-endian bytes, the salt and the trader.
/// Variable-length fields carry a 4-byte big-endian length prefix, so no
/// two distinct intents share an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapIntent<'a> {
    /// Trader that will pay the input.
    pub trader: &'a Address,
    /// Pool to trade against.
    pub pool_id: PoolId,
    /// Denom paid.
    pub denom_in: &'a Denom,
    /// Denom received.
    pub denom_out: &'a Denom,
    /// Amount paid.
    pub amount_in: Amount,
    /// Least acceptable output.
    pub min_amount_out: Amount,
    /// Trader-chosen secret that makes the digest unguessable.
    pub salt: &'a [u8],
}

impl SwapIntent<'_> {
    /// Computes the commitment hash of this intent.
    #[must_use]
    pub fn commitment_hash(&self) -> CommitmentHash {
        let mut hasher = Sha256::new();
        hasher.update(self.pool_id.get().to_be_bytes());
        update_prefixed(&mut hasher, self.denom_in.as_str().as_bytes());
        update_prefixed(&mut hasher, self.denom_out.as_str().as_bytes());
        hasher.update(self.amount_in.get().to_be_bytes());
        hasher.update(self.min_amount_out.get().to_be_bytes());
        update_prefixed(&mut hasher, self.salt);
        update_prefixed(&mut hasher, self.trader.as_str().as_bytes());
        CommitmentHash(hasher.finalize().into())
    }
}

fn update_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
    hasher.update(bytes);
}

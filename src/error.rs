//! Unified error types for the exchange engine.
//!
//! All fallible operations across the crate return [`AmmError`] as their
//! error type. Every variant belongs to exactly one [`ErrorCategory`] so
//! that the transaction layer can decide how to surface a rejection
//! without matching on individual variants.

use core::fmt;

use thiserror::Error;

use crate::commit::CommitmentHash;
use crate::domain::{Amount, OrderId, OrderStatus, PoolId};

/// Coarse classification of an [`AmmError`].
///
/// # Examples
///
/// ```
/// use hydra_dex::error::{AmmError, ErrorCategory};
///
/// assert_eq!(AmmError::ZeroAmount.category(), ErrorCategory::Validation);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed input or amount.
    Validation,
    /// Missing pool, order, position or route.
    NotFound,
    /// Caller is not the owner or the governance authority.
    Permission,
    /// The operation is well-formed but economically unacceptable.
    Economic,
    /// The target is in a state that forbids the operation.
    State,
    /// A pagination or iteration cap was exceeded.
    Resource,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Permission => "permission",
            Self::Economic => "economic",
            Self::State => "state",
            Self::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Every error the engine can return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    // -- Validation ---------------------------------------------------------
    /// An amount that must be positive was zero.
    #[error("amount must be positive")]
    ZeroAmount,

    /// An amount is outside its permitted range.
    #[error("invalid amount: {0}")]
    InvalidAmount(&'static str),

    /// A denomination string is malformed or does not belong to the pool.
    #[error("invalid denom: {0}")]
    InvalidDenom(String),

    /// A price is zero or unrepresentable.
    #[error("invalid price: {0}")]
    InvalidPrice(&'static str),

    /// Engine parameters are inconsistent.
    #[error("invalid params: {0}")]
    InvalidParams(&'static str),

    /// A swap route is malformed.
    #[error("invalid route: {0}")]
    InvalidRoute(&'static str),

    /// A cross-chain payload failed semantic validation.
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    /// Arithmetic overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Arithmetic underflow.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A revealed swap does not match what its commitment recorded.
    #[error("commitment mismatch: {0}")]
    CommitmentMismatch(&'static str),

    // -- NotFound -----------------------------------------------------------
    /// No pool with this id.
    #[error("pool {0} not found")]
    PoolNotFound(PoolId),

    /// No pool for this token pair.
    #[error("no pool for pair {0}/{1}")]
    PairNotFound(String, String),

    /// No order with this id.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The provider holds no shares in the pool.
    #[error("no liquidity position in pool {0}")]
    PositionNotFound(PoolId),

    /// No route connects the two denoms.
    #[error("no route from {0} to {1}")]
    NoRoute(String, String),

    /// No swap commitment with this hash.
    #[error("swap commitment {0} not found")]
    CommitmentNotFound(CommitmentHash),

    // -- Permission ---------------------------------------------------------
    /// The caller does not own the order.
    #[error("caller does not own order {0}")]
    NotOwner(OrderId),

    /// The caller is not the governance authority.
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// The caller did not make the commitment.
    #[error("caller does not own swap commitment {0}")]
    NotCommitmentOwner(CommitmentHash),

    // -- Economic -----------------------------------------------------------
    /// The computed output is below the caller's minimum.
    #[error("slippage exceeded: output {actual} below minimum {minimum}")]
    SlippageExceeded {
        /// Output the swap would produce.
        actual: Amount,
        /// Minimum the caller accepted.
        minimum: Amount,
    },

    /// The post-operation product left the permitted band.
    #[error("invariant violation: k moved from {pre_k} to {post_k}")]
    InvariantViolation {
        /// Reference product (rescaled for share changes).
        pre_k: String,
        /// Product after the operation.
        post_k: String,
    },

    /// A deposit does not match the pool ratio.
    #[error("deposit ratio deviates from pool ratio beyond tolerance")]
    RatioMismatch,

    /// The block time is past the caller's deadline.
    #[error("deadline {deadline} exceeded at block time {now}")]
    DeadlineExceeded {
        /// Caller-supplied deadline (unix seconds).
        deadline: u64,
        /// Current block time (unix seconds).
        now: u64,
    },

    /// The provider tried to burn more shares than held.
    #[error("insufficient shares: requested {requested}, held {held}")]
    InsufficientShares {
        /// Shares requested.
        requested: Amount,
        /// Shares held.
        held: Amount,
    },

    /// The payer's balance cannot cover a transfer.
    #[error("insufficient funds: {denom} balance {available} below {required}")]
    InsufficientFunds {
        /// Denomination of the transfer.
        denom: String,
        /// Balance available.
        available: Amount,
        /// Amount required.
        required: Amount,
    },

    /// Reserves cannot satisfy the request.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// The swap input is too large relative to the reserve.
    #[error("swap of {amount_in} exceeds {max_bps}bp of reserve")]
    SwapTooLarge {
        /// Requested input.
        amount_in: Amount,
        /// Configured cap in basis points.
        max_bps: u32,
    },

    /// The swap would move the price too far.
    #[error("price impact {impact_bps}bp exceeds maximum {max_bps}bp")]
    PriceImpactTooHigh {
        /// Computed impact in basis points.
        impact_bps: u32,
        /// Configured cap in basis points.
        max_bps: u32,
    },

    /// The swap is large enough that it must be committed first.
    #[error("swap of {amount_in} exceeds commit-reveal threshold {threshold}")]
    CommitRequired {
        /// Requested input.
        amount_in: Amount,
        /// Largest input accepted without a commitment.
        threshold: Amount,
    },

    // -- State --------------------------------------------------------------
    /// The pool is paused by its circuit breaker.
    #[error("pool {pool} is paused until {until}")]
    PoolPaused {
        /// Paused pool.
        pool: PoolId,
        /// Unix time at which the pause lapses.
        until: u64,
    },

    /// The order has already been completely filled.
    #[error("order {0} is already filled")]
    AlreadyFilled(OrderId),

    /// The order is cancelled or expired.
    #[error("order {0} is {1}")]
    OrderClosed(OrderId, OrderStatus),

    /// A pool for this pair already exists.
    #[error("pool {0} already exists for this pair")]
    DuplicatePool(PoolId),

    /// Shares were deposited too recently to be withdrawn.
    #[error("liquidity locked until height {0}")]
    LiquidityLocked(u64),

    /// A nested operation tried to take a lock already held.
    #[error("reentrant call on {0}")]
    Reentrancy(String),

    /// Commit-reveal is switched off.
    #[error("commit-reveal is disabled")]
    CommitRevealDisabled,

    /// A commitment with this hash is already pending.
    #[error("swap commitment {0} already exists")]
    DuplicateCommitment(CommitmentHash),

    /// The reveal delay has not elapsed.
    #[error("reveal allowed from height {earliest}, current height {height}")]
    RevealTooEarly {
        /// First height at which the reveal is accepted.
        earliest: u64,
        /// Current height.
        height: u64,
    },

    /// The reveal window has closed.
    #[error("commitment expired at height {expiry}, current height {height}")]
    CommitmentExpired {
        /// Last height at which the reveal was accepted.
        expiry: u64,
        /// Current height.
        height: u64,
    },

    // -- Resource -----------------------------------------------------------
    /// A page request exceeded the hard cap.
    #[error("page limit {requested} exceeds maximum {max}")]
    PageLimitExceeded {
        /// Requested page size.
        requested: u32,
        /// Hard cap.
        max: u32,
    },
}

impl AmmError {
    /// Returns the taxonomy bucket this error belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ZeroAmount
            | Self::InvalidAmount(_)
            | Self::InvalidDenom(_)
            | Self::InvalidPrice(_)
            | Self::InvalidParams(_)
            | Self::InvalidRoute(_)
            | Self::InvalidPacket(_)
            | Self::Overflow(_)
            | Self::Underflow(_)
            | Self::DivisionByZero
            | Self::CommitmentMismatch(_) => ErrorCategory::Validation,
            Self::PoolNotFound(_)
            | Self::PairNotFound(..)
            | Self::OrderNotFound(_)
            | Self::PositionNotFound(_)
            | Self::NoRoute(..)
            | Self::CommitmentNotFound(_) => ErrorCategory::NotFound,
            Self::NotOwner(_) | Self::Unauthorized(_) | Self::NotCommitmentOwner(_) => {
                ErrorCategory::Permission
            }
            Self::SlippageExceeded { .. }
            | Self::InvariantViolation { .. }
            | Self::RatioMismatch
            | Self::DeadlineExceeded { .. }
            | Self::InsufficientShares { .. }
            | Self::InsufficientFunds { .. }
            | Self::InsufficientLiquidity
            | Self::SwapTooLarge { .. }
            | Self::PriceImpactTooHigh { .. }
            | Self::CommitRequired { .. } => ErrorCategory::Economic,
            Self::PoolPaused { .. }
            | Self::AlreadyFilled(_)
            | Self::OrderClosed(..)
            | Self::DuplicatePool(_)
            | Self::LiquidityLocked(_)
            | Self::Reentrancy(_)
            | Self::CommitRevealDisabled
            | Self::DuplicateCommitment(_)
            | Self::RevealTooEarly { .. }
            | Self::CommitmentExpired { .. } => ErrorCategory::State,
            Self::PageLimitExceeded { .. } => ErrorCategory::Resource,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, AmmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_bucket() {
        assert_eq!(AmmError::ZeroAmount.category(), ErrorCategory::Validation);
        assert_eq!(
            AmmError::Overflow("x").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            AmmError::InvalidDenom("?".into()).category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn not_found_bucket() {
        assert_eq!(
            AmmError::PoolNotFound(PoolId::new(1)).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            AmmError::NoRoute("a".into(), "b".into()).category(),
            ErrorCategory::NotFound
        );
    }

    #[test]
    fn permission_bucket() {
        assert_eq!(
            AmmError::NotOwner(OrderId::new(7)).category(),
            ErrorCategory::Permission
        );
    }

    #[test]
    fn economic_bucket() {
        let e = AmmError::SlippageExceeded {
            actual: Amount::new(1),
            minimum: Amount::new(2),
        };
        assert_eq!(e.category(), ErrorCategory::Economic);
        assert_eq!(AmmError::RatioMismatch.category(), ErrorCategory::Economic);
    }

    #[test]
    fn state_bucket() {
        let e = AmmError::PoolPaused {
            pool: PoolId::new(1),
            until: 10,
        };
        assert_eq!(e.category(), ErrorCategory::State);
        assert_eq!(
            AmmError::DuplicatePool(PoolId::new(1)).category(),
            ErrorCategory::State
        );
    }

    #[test]
    fn commit_reveal_buckets() {
        let hash = CommitmentHash::from_bytes([7; 32]);
        assert_eq!(
            AmmError::CommitRequired {
                amount_in: Amount::new(60),
                threshold: Amount::new(50),
            }
            .category(),
            ErrorCategory::Economic
        );
        assert_eq!(AmmError::CommitmentNotFound(hash).category(), ErrorCategory::NotFound);
        assert_eq!(AmmError::NotCommitmentOwner(hash).category(), ErrorCategory::Permission);
        assert_eq!(
            AmmError::RevealTooEarly {
                earliest: 3,
                height: 2
            }
            .category(),
            ErrorCategory::State
        );
        assert!(AmmError::DuplicateCommitment(hash).to_string().contains(&"07".repeat(32)));
    }

    #[test]
    fn resource_bucket() {
        let e = AmmError::PageLimitExceeded {
            requested: 500,
            max: 100,
        };
        assert_eq!(e.category(), ErrorCategory::Resource);
    }

    #[test]
    fn display_messages() {
        let e = AmmError::SlippageExceeded {
            actual: Amount::new(1_992),
            minimum: Amount::new(2_000),
        };
        assert_eq!(
            e.to_string(),
            "slippage exceeded: output 1992 below minimum 2000"
        );
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
    }
}

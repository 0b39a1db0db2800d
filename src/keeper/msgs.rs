//! Transaction messages and receipts.
//!
//! Each mutating entry point of [`Engine`](super::Engine) takes one of
//! these messages. They derive `serde` so a host can decode them straight
//! from transaction bytes.

use serde::{Deserialize, Serialize};

use crate::commit::CommitmentHash;
use crate::domain::{Address, Amount, BasisPoints, Denom, FeeTier, PoolId, Price, Shares, Side};

/// Creates a pool and seeds it with the creator's first deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreatePool {
    /// Account funding the pool.
    pub creator: Address,
    /// First denom, in any order.
    pub denom_a: Denom,
    /// Second denom.
    pub denom_b: Denom,
    /// Deposit of `denom_a`.
    pub amount_a: Amount,
    /// Deposit of `denom_b`.
    pub amount_b: Amount,
    /// Fee tier; the governance default when absent.
    #[serde(default)]
    pub fee_tier: Option<FeeTier>,
}

/// Deposits both tokens into a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAddLiquidity {
    /// Depositor.
    pub provider: Address,
    /// Target pool.
    pub pool_id: PoolId,
    /// Deposit of the pool's token A.
    pub amount_a: Amount,
    /// Deposit of the pool's token B.
    pub amount_b: Amount,
}

/// Deposits token A and the matching amount of token B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAddLiquidityBalanced {
    /// Depositor.
    pub provider: Address,
    /// Target pool.
    pub pool_id: PoolId,
    /// Deposit of the pool's token A.
    pub amount_a: Amount,
}

/// Burns LP shares for the underlying reserves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRemoveLiquidity {
    /// Share holder.
    pub provider: Address,
    /// Target pool.
    pub pool_id: PoolId,
    /// Shares to burn.
    pub shares: Shares,
}

/// Exact-in swap against one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSwap {
    /// Trader paying the input and receiving the output.
    pub trader: Address,
    /// Pool to trade against.
    pub pool_id: PoolId,
    /// Denom paid.
    pub denom_in: Denom,
    /// Amount paid.
    pub amount_in: Amount,
    /// Denom received.
    pub denom_out: Denom,
    /// Least acceptable output.
    pub min_amount_out: Amount,
    /// Unix time after which the swap is rejected; zero for none.
    #[serde(default)]
    pub deadline: u64,
}

/// Swap with a slippage tolerance instead of an absolute minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSwapWithSlippage {
    /// Trader.
    pub trader: Address,
    /// Pool to trade against.
    pub pool_id: PoolId,
    /// Denom paid.
    pub denom_in: Denom,
    /// Amount paid.
    pub amount_in: Amount,
    /// Denom received.
    pub denom_out: Denom,
    /// Accepted shortfall against the simulated output.
    pub max_slippage: BasisPoints,
    /// Seconds from the current block time until the deadline.
    pub deadline_secs: u64,
}

/// Swap along the best route the router can find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgQuickSwap {
    /// Trader.
    pub trader: Address,
    /// Denom paid.
    pub denom_in: Denom,
    /// Amount paid.
    pub amount_in: Amount,
    /// Denom received.
    pub denom_out: Denom,
    /// Least acceptable final output; zero accepts any.
    #[serde(default)]
    pub min_amount_out: Amount,
}

/// Swap along an explicit denom path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgMultiHopSwap {
    /// Trader.
    pub trader: Address,
    /// `[in, via…, out]`.
    pub path: Vec<Denom>,
    /// Amount paid into the first hop.
    pub amount_in: Amount,
    /// Least acceptable final output.
    pub min_amount_out: Amount,
    /// Unix time after which the swap is rejected; zero for none.
    #[serde(default)]
    pub deadline: u64,
}

/// Rests a limit order against a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgPlaceOrder {
    /// Owner; escrow is taken from this account.
    pub owner: Address,
    /// Pool the order trades against.
    pub pool_id: PoolId,
    /// `Sell` spends token A, `Buy` spends token B.
    pub side: Side,
    /// Escrowed input.
    pub amount_in: Amount,
    /// Limit, token B per token A.
    pub limit_price: Price,
    /// Lifetime in blocks; zero means good-till-cancelled.
    #[serde(default)]
    pub expiration_offset: u64,
}

/// Commits to a swap by hash, escrowing the commitment deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCommitSwap {
    /// Trader that will reveal the swap.
    pub trader: Address,
    /// Pool the swap will trade against.
    pub pool_id: PoolId,
    /// Digest of the hidden [`SwapIntent`](crate::commit::SwapIntent).
    pub commitment_hash: CommitmentHash,
}

/// Reveals a committed swap and executes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRevealSwap {
    /// Trader that made the commitment.
    pub trader: Address,
    /// Pool to trade against.
    pub pool_id: PoolId,
    /// Denom paid.
    pub denom_in: Denom,
    /// Amount paid.
    pub amount_in: Amount,
    /// Denom received.
    pub denom_out: Denom,
    /// Least acceptable output.
    pub min_amount_out: Amount,
    /// Salt the commitment was computed with, hex-encoded on the wire.
    #[serde(with = "hex::serde")]
    pub salt: Vec<u8>,
    /// Unix time after which the reveal is rejected; zero for none.
    #[serde(default)]
    pub deadline: u64,
}

/// Outcome of a swap commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// Digest the commitment is stored under.
    pub commitment_hash: CommitmentHash,
    /// First height at which the reveal is accepted.
    pub reveal_height: u64,
    /// Last height at which the reveal is accepted.
    pub expiry_height: u64,
}

/// Outcome of a liquidity operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReceipt {
    /// Pool affected.
    pub pool_id: PoolId,
    /// Shares minted or burned.
    pub shares: Shares,
    /// Token A deposited or withdrawn.
    pub amount_a: Amount,
    /// Token B deposited or withdrawn.
    pub amount_b: Amount,
}

//! A single resting limit order.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, Amount, Denom, OrderId, OrderStatus, PoolId, Price, Rounding, Side};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;

/// A limit order against one pool.
///
/// `amount_in` is escrowed at placement. Fills draw on the escrow and
/// credit the owner with `denom_out`; `filled` and `received` record the
/// running totals.
///
/// # Invariants
///
/// - `filled ≤ amount_in`.
/// - `status` only moves `Open → {Filled, Cancelled, Expired}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrder {
    id: OrderId,
    owner: Address,
    pool_id: PoolId,
    side: Side,
    denom_in: Denom,
    denom_out: Denom,
    amount_in: Amount,
    filled: Amount,
    received: Amount,
    limit_price: Price,
    created_height: u64,
    expires_at: Option<u64>,
    status: OrderStatus,
}

/// Parameters of a new order, as accepted by [`OrderBook::place`](super::OrderBook::place).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Order owner.
    pub owner: Address,
    /// Pool the order trades against.
    pub pool_id: PoolId,
    /// Direction.
    pub side: Side,
    /// Denom spent.
    pub denom_in: Denom,
    /// Denom received.
    pub denom_out: Denom,
    /// Escrowed amount.
    pub amount_in: Amount,
    /// Limit price, token B per token A.
    pub limit_price: Price,
    /// Placement height.
    pub created_height: u64,
    /// Blocks until expiry; zero means good-till-cancelled.
    pub expiration_offset: u64,
}

impl LimitOrder {
    pub(super) fn open(id: OrderId, new: NewOrder) -> Self {
        let expires_at = match new.expiration_offset {
            0 => None,
            offset => Some(new.created_height.saturating_add(offset)),
        };
        Self {
            id,
            owner: new.owner,
            pool_id: new.pool_id,
            side: new.side,
            denom_in: new.denom_in,
            denom_out: new.denom_out,
            amount_in: new.amount_in,
            filled: Amount::ZERO,
            received: Amount::ZERO,
            limit_price: new.limit_price,
            created_height: new.created_height,
            expires_at,
            status: OrderStatus::Open,
        }
    }

    /// Returns the order id.
    #[must_use]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the owner.
    #[must_use]
    pub const fn owner(&self) -> &Address {
        &self.owner
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Returns the side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Returns the denom spent.
    #[must_use]
    pub const fn denom_in(&self) -> &Denom {
        &self.denom_in
    }

    /// Returns the denom received.
    #[must_use]
    pub const fn denom_out(&self) -> &Denom {
        &self.denom_out
    }

    /// Returns the escrowed amount at placement.
    #[must_use]
    pub const fn amount_in(&self) -> Amount {
        self.amount_in
    }

    /// Returns the input consumed by fills so far.
    #[must_use]
    pub const fn filled(&self) -> Amount {
        self.filled
    }

    /// Returns the output credited to the owner so far.
    #[must_use]
    pub const fn received(&self) -> Amount {
        self.received
    }

    /// Returns the limit price.
    #[must_use]
    pub const fn limit_price(&self) -> Price {
        self.limit_price
    }

    /// Returns the placement height.
    #[must_use]
    pub const fn created_height(&self) -> u64 {
        self.created_height
    }

    /// Last height at which the order is live; `None` for good-till-cancelled.
    #[must_use]
    pub const fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Unfilled escrow.
    #[must_use]
    pub const fn remaining(&self) -> Amount {
        Amount::new(self.amount_in.get().saturating_sub(self.filled.get()))
    }

    /// Returns `true` once `height` is past the expiration height.
    #[must_use]
    pub const fn is_expired_at(&self, height: u64) -> bool {
        match self.expires_at {
            Some(last) => height > last,
            None => false,
        }
    }

    /// Returns `true` if the pool price has reached the limit:
    /// at or above it for sells, at or below it for buys.
    #[must_use]
    pub fn is_satisfiable(&self, pool_price: Price) -> bool {
        if pool_price.is_zero() {
            return false;
        }
        match self.side {
            Side::Sell => pool_price >= self.limit_price,
            Side::Buy => pool_price <= self.limit_price,
        }
    }

    /// Least output that honours the limit for an input of `amount`:
    /// `amount × limit` for sells, `amount / limit` for buys, rounded up.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DivisionByZero`] for a zero buy limit.
    /// - [`AmmError::Overflow`] if the result exceeds `u128`.
    pub fn min_out_for(&self, amount: Amount) -> crate::error::Result<Amount> {
        match self.side {
            Side::Sell => self.limit_price.mul_amount(amount, Rounding::Up),
            Side::Buy => self.limit_price.div_amount(amount, Rounding::Up),
        }
    }

    /// Records a fill; the order becomes `Filled` when nothing remains.
    ///
    /// # Errors
    ///
    /// - [`AmmError::OrderClosed`] / [`AmmError::AlreadyFilled`] if not open.
    /// - [`AmmError::InvalidAmount`] if `spent` exceeds the remainder.
    pub fn record_fill(&mut self, spent: Amount, received: Amount) -> crate::error::Result<()> {
        self.ensure_open()?;
        if spent > self.remaining() {
            return Err(AmmError::InvalidAmount("fill exceeds remaining escrow"));
        }
        self.filled = self.filled.safe_add(&spent)?;
        self.received = self.received.safe_add(&received)?;
        if self.remaining().is_zero() {
            self.status = OrderStatus::Filled;
        }
        Ok(())
    }

    /// Moves an open order to a terminal status.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyFilled`] if the order is filled.
    /// - [`AmmError::OrderClosed`] if it is cancelled or expired.
    /// - [`AmmError::InvalidParams`] if `next` is not terminal.
    pub fn close(&mut self, next: OrderStatus) -> crate::error::Result<()> {
        self.ensure_open()?;
        if !self.status.can_transition_to(next) {
            return Err(AmmError::InvalidParams("order can only close to a terminal status"));
        }
        self.status = next;
        Ok(())
    }

    /// Fails unless the order is open.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyFilled`] if the order is filled.
    /// - [`AmmError::OrderClosed`] if it is cancelled or expired.
    pub fn ensure_open(&self) -> crate::error::Result<()> {
        match self.status {
            OrderStatus::Open => Ok(()),
            OrderStatus::Filled => Err(AmmError::AlreadyFilled(self.id)),
            status => Err(AmmError::OrderClosed(self.id, status)),
        }
    }
}

//! Limit order entry points.

use serde::{Deserialize, Serialize};

use super::Engine;
use super::msgs::MsgPlaceOrder;
use crate::domain::{Address, Amount, OrderId, OrderStatus, Page, PoolId, Side, resolve_limit};
use crate::orders::LimitOrder;
use crate::traits::{Bank, BlockClock, ParamSource};

/// Open orders of one pool, grouped by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookView {
    /// Pool the orders rest on.
    pub pool_id: PoolId,
    /// Buy orders, highest limit first.
    pub buys: Vec<LimitOrder>,
    /// Sell orders, lowest limit first.
    pub sells: Vec<LimitOrder>,
}

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Escrows the input and rests a limit order.
    ///
    /// # Errors
    ///
    /// `ZeroAmount`, `InvalidPrice` (zero limit), `PoolNotFound` or
    /// `InsufficientFunds`.
    pub fn place_limit_order(&mut self, msg: MsgPlaceOrder) -> crate::error::Result<OrderId> {
        self.atomic("place_limit_order", |tx| tx.place_order(&msg))
    }

    /// Cancels an open order and refunds its unfilled escrow.
    ///
    /// # Errors
    ///
    /// `OrderNotFound`, `NotOwner`, `AlreadyFilled` or `OrderClosed`.
    pub fn cancel_limit_order(&mut self, order_id: OrderId, owner: &Address) -> crate::error::Result<Amount> {
        self.atomic("cancel_limit_order", |tx| {
            tx.close_order(order_id, OrderStatus::Cancelled, Some(owner))
        })
    }

    /// Cancels every open order of `owner` and returns their ids.
    ///
    /// # Errors
    ///
    /// Returns the first refund failure; no order is cancelled then.
    pub fn cancel_all_limit_orders(&mut self, owner: &Address) -> crate::error::Result<Vec<OrderId>> {
        self.atomic("cancel_all_limit_orders", |tx| {
            let ids = tx.state.orders.open_ids_of(owner);
            for id in &ids {
                tx.close_order(*id, OrderStatus::Cancelled, Some(owner))?;
            }
            Ok(ids)
        })
    }

    /// Returns the order with `id`, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound`.
    pub fn get_order(&self, id: OrderId) -> crate::error::Result<&LimitOrder> {
        self.state.orders.get(id)
    }

    /// Orders of `owner` in id order after `cursor`.
    ///
    /// # Errors
    ///
    /// Returns `PageLimitExceeded` if `limit` exceeds `max_page_size`.
    pub fn list_orders_by_owner(
        &self,
        owner: &Address,
        cursor: Option<OrderId>,
        limit: u32,
    ) -> crate::error::Result<Page<LimitOrder>> {
        let limit = resolve_limit(limit, self.params.max_page_size)?;
        Ok(self.state.orders.page_of(owner, cursor, limit))
    }

    /// Open orders resting on `pool_id`.
    ///
    /// # Errors
    ///
    /// Returns `PoolNotFound`.
    pub fn order_book(&self, pool_id: PoolId) -> crate::error::Result<OrderBookView> {
        self.state.pools.get(pool_id)?;
        let (mut buys, mut sells): (Vec<LimitOrder>, Vec<LimitOrder>) = self
            .state
            .orders
            .open_in_pool(pool_id)
            .cloned()
            .partition(|order| order.side() == Side::Buy);
        buys.sort_by(|a, b| b.limit_price().cmp(&a.limit_price()).then(a.id().cmp(&b.id())));
        sells.sort_by(|a, b| a.limit_price().cmp(&b.limit_price()).then(a.id().cmp(&b.id())));
        Ok(OrderBookView {
            pool_id,
            buys,
            sells,
        })
    }
}

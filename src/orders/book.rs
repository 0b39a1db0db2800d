//! Order storage with open, owner and expiry indexes.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use super::{LimitOrder, NewOrder};
use crate::domain::{Address, Amount, OrderId, OrderStatus, Page, PoolId};
use crate::error::AmmError;

/// Every limit order ever placed, plus the indexes matching needs.
///
/// Closed orders stay queryable; only the `open` and `expiries`
/// indexes forget them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    orders: BTreeMap<OrderId, LimitOrder>,
    open: BTreeSet<OrderId>,
    by_owner: BTreeMap<Address, BTreeSet<OrderId>>,
    expiries: BTreeSet<(u64, OrderId)>,
    last_id: u64,
    match_cursor: Option<OrderId>,
}

impl OrderBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new open order and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the id space is exhausted.
    pub fn place(&mut self, new: NewOrder) -> crate::error::Result<OrderId> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or(AmmError::Overflow("order id space exhausted"))?;
        let id = OrderId::new(next);
        let order = LimitOrder::open(id, new);
        if let Some(last) = order.expires_at() {
            self.expiries.insert((last, id));
        }
        self.by_owner
            .entry(order.owner().clone())
            .or_default()
            .insert(id);
        self.open.insert(id);
        self.orders.insert(id, order);
        self.last_id = next;
        Ok(id)
    }

    /// Returns the order with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::OrderNotFound`] if absent.
    pub fn get(&self, id: OrderId) -> crate::error::Result<&LimitOrder> {
        self.orders.get(&id).ok_or(AmmError::OrderNotFound(id))
    }

    /// Records a fill and drops the order from the live indexes once filled.
    ///
    /// # Errors
    ///
    /// Propagates [`LimitOrder::record_fill`] errors.
    pub fn record_fill(
        &mut self,
        id: OrderId,
        spent: Amount,
        received: Amount,
    ) -> crate::error::Result<OrderStatus> {
        let order = self.orders.get_mut(&id).ok_or(AmmError::OrderNotFound(id))?;
        order.record_fill(spent, received)?;
        let status = order.status();
        let expires_at = order.expires_at();
        if status.is_terminal() {
            self.forget_live(id, expires_at);
        }
        Ok(status)
    }

    /// Closes an open order and returns its unfilled escrow.
    ///
    /// # Errors
    ///
    /// Propagates [`LimitOrder::close`] errors.
    pub fn close(&mut self, id: OrderId, status: OrderStatus) -> crate::error::Result<Amount> {
        let order = self.orders.get_mut(&id).ok_or(AmmError::OrderNotFound(id))?;
        order.close(status)?;
        let refund = order.remaining();
        let expires_at = order.expires_at();
        self.forget_live(id, expires_at);
        Ok(refund)
    }

    fn forget_live(&mut self, id: OrderId, expires_at: Option<u64>) {
        self.open.remove(&id);
        if let Some(last) = expires_at {
            self.expiries.remove(&(last, id));
        }
    }

    /// Open orders of `owner`, in id order.
    #[must_use]
    pub fn open_ids_of(&self, owner: &Address) -> Vec<OrderId> {
        self.by_owner
            .get(owner)
            .map(|ids| ids.iter().copied().filter(|id| self.open.contains(id)).collect())
            .unwrap_or_default()
    }

    /// All orders of `owner` with ids after `cursor`, up to `limit`.
    #[must_use]
    pub fn page_of(&self, owner: &Address, cursor: Option<OrderId>, limit: usize) -> Page<LimitOrder> {
        let Some(ids) = self.by_owner.get(owner) else {
            return Page::from_overfetch(Vec::new(), limit);
        };
        let start = cursor.map_or(Bound::Unbounded, Bound::Excluded);
        let items = ids
            .range((start, Bound::Unbounded))
            .take(limit.saturating_add(1))
            .filter_map(|id| self.orders.get(id).map(|o| (id.get(), o.clone())))
            .collect();
        Page::from_overfetch(items, limit)
    }

    /// Open orders resting on `pool_id`, in id order.
    #[must_use]
    pub fn open_in_pool(&self, pool_id: PoolId) -> impl Iterator<Item = &LimitOrder> {
        self.open
            .iter()
            .filter_map(|id| self.orders.get(id))
            .filter(move |o| o.pool_id() == pool_id)
    }

    /// Up to `limit` open orders whose expiration height is below `height`,
    /// earliest first.
    #[must_use]
    pub fn expired_ids(&self, height: u64, limit: usize) -> Vec<OrderId> {
        self.expiries
            .range(..(height, OrderId::new(0)))
            .take(limit)
            .map(|(_, id)| *id)
            .collect()
    }

    /// Up to `limit` open orders in id order, starting after the persisted
    /// cursor and wrapping around once.
    #[must_use]
    pub fn next_match_batch(&self, limit: usize) -> Vec<OrderId> {
        let after = self.match_cursor.map_or(Bound::Unbounded, Bound::Excluded);
        let mut batch: Vec<OrderId> = self
            .open
            .range((after, Bound::Unbounded))
            .take(limit)
            .copied()
            .collect();
        if let Some(cursor) = self.match_cursor {
            let room = limit.saturating_sub(batch.len());
            batch.extend(self.open.range(..=cursor).take(room).copied());
        }
        batch
    }

    /// Persists the id the next batch starts after.
    pub fn set_match_cursor(&mut self, cursor: Option<OrderId>) {
        self.match_cursor = cursor;
    }

    /// Returns the persisted matching cursor.
    #[must_use]
    pub const fn match_cursor(&self) -> Option<OrderId> {
        self.match_cursor
    }

    /// Number of open orders.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Denom, Price, Side};

    fn denom(s: &str) -> Denom {
        let Ok(d) = Denom::new(s) else {
            panic!("valid denom");
        };
        d
    }

    fn new_order(owner: &str, expiration_offset: u64) -> NewOrder {
        NewOrder {
            owner: Address::new(owner),
            pool_id: PoolId::new(1),
            side: Side::Sell,
            denom_in: denom("atom"),
            denom_out: denom("osmo"),
            amount_in: Amount::new(1_000),
            limit_price: Price::ONE,
            created_height: 10,
            expiration_offset,
        }
    }

    fn place(book: &mut OrderBook, owner: &str, expiration_offset: u64) -> OrderId {
        let Ok(id) = book.place(new_order(owner, expiration_offset)) else {
            panic!("place ok");
        };
        id
    }

    // -- Lifecycle ----------------------------------------------------------

    #[test]
    fn fills_close_the_order() {
        let mut book = OrderBook::new();
        let id = place(&mut book, "alice", 0);
        assert_eq!(
            book.record_fill(id, Amount::new(400), Amount::new(390)).ok(),
            Some(OrderStatus::Open)
        );
        assert_eq!(
            book.record_fill(id, Amount::new(600), Amount::new(590)).ok(),
            Some(OrderStatus::Filled)
        );
        assert_eq!(book.open_count(), 0);
        let Ok(order) = book.get(id) else {
            panic!("order kept");
        };
        assert_eq!(order.received(), Amount::new(980));
        assert_eq!(
            book.record_fill(id, Amount::new(1), Amount::new(1)),
            Err(AmmError::AlreadyFilled(id))
        );
    }

    #[test]
    fn close_refunds_remainder_once() {
        let mut book = OrderBook::new();
        let id = place(&mut book, "alice", 0);
        assert!(book.record_fill(id, Amount::new(250), Amount::new(240)).is_ok());
        assert_eq!(book.close(id, OrderStatus::Cancelled).ok(), Some(Amount::new(750)));
        assert_eq!(
            book.close(id, OrderStatus::Cancelled),
            Err(AmmError::OrderClosed(id, OrderStatus::Cancelled))
        );
    }

    // -- Indexes ------------------------------------------------------------

    #[test]
    fn expiry_index() {
        let mut book = OrderBook::new();
        let gtc = place(&mut book, "alice", 0);
        let short = place(&mut book, "alice", 5);
        let long = place(&mut book, "bob", 50);
        // short lives through height 15
        assert!(book.expired_ids(15, 10).is_empty());
        assert_eq!(book.expired_ids(16, 10), vec![short]);
        assert_eq!(book.expired_ids(100, 10), vec![short, long]);
        let Ok(order) = book.get(gtc) else {
            panic!("order exists");
        };
        assert!(!order.is_expired_at(u64::MAX));
    }

    #[test]
    fn owner_views() {
        let mut book = OrderBook::new();
        let a1 = place(&mut book, "alice", 0);
        let _b1 = place(&mut book, "bob", 0);
        let a2 = place(&mut book, "alice", 0);
        assert!(book.close(a1, OrderStatus::Cancelled).is_ok());
        assert_eq!(book.open_ids_of(&Address::new("alice")), vec![a2]);
        let page = book.page_of(&Address::new("alice"), None, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_cursor, Some(a1.get()));
        let rest = book.page_of(&Address::new("alice"), Some(a1), 1);
        assert_eq!(rest.items[0].id(), a2);
        assert_eq!(rest.next_cursor, None);
    }

    #[test]
    fn match_batches_wrap_around() {
        let mut book = OrderBook::new();
        let ids: Vec<OrderId> = (0..5).map(|_| place(&mut book, "alice", 0)).collect();
        assert_eq!(book.next_match_batch(2), ids[0..2].to_vec());
        book.set_match_cursor(Some(ids[1]));
        assert_eq!(book.next_match_batch(2), ids[2..4].to_vec());
        book.set_match_cursor(Some(ids[3]));
        assert_eq!(book.next_match_batch(3), vec![ids[4], ids[0], ids[1]]);
        assert_eq!(book.next_match_batch(10).len(), 5);
    }
}

//! Bounded pagination for list queries.

use serde::{Deserialize, Serialize};

use crate::error::AmmError;

/// One page of a cursor-paginated listing.
///
/// `next_cursor` is the key to pass back to fetch the following page;
/// `None` means the listing is exhausted. Listings keyed by sequential
/// ids use the default `u64` cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T, K = u64> {
    /// Items in key order.
    pub items: Vec<T>,
    /// Exclusive start key for the next page.
    pub next_cursor: Option<K>,
}

impl<T, K: Clone> Page<T, K> {
    /// Builds a page from at most `limit + 1` items fetched in key order.
    ///
    /// The extra item, when present, only signals that more remain; the
    /// key of the last kept item becomes the cursor.
    #[must_use]
    pub fn from_overfetch(mut items: Vec<(K, T)>, limit: usize) -> Self {
        let next_cursor = if items.len() > limit {
            items.truncate(limit);
            items.last().map(|(key, _)| key.clone())
        } else {
            None
        };
        Self {
            items: items.into_iter().map(|(_, item)| item).collect(),
            next_cursor,
        }
    }
}

/// Resolves a requested page size against the hard cap.
///
/// A request of zero means "use the cap".
///
/// # Errors
///
/// Returns [`AmmError::PageLimitExceeded`] if `requested > max`.
pub fn resolve_limit(requested: u32, max: u32) -> crate::error::Result<usize> {
    if requested > max {
        return Err(AmmError::PageLimitExceeded { requested, max });
    }
    let limit = if requested == 0 { max } else { requested };
    usize::try_from(limit).map_err(|_| AmmError::Overflow("page limit exceeds usize"))
}

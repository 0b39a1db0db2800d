//! Per-pool circuit breaker.
//!
//! A breaker is `Active` or `Paused`. It trips on:
//!
//! - a price move beyond `price_deviation_threshold` relative to the
//!   reference price of the current rolling window, or
//! - `near_miss_limit` invariant near misses within one window, or
//! - an explicit emergency pause by the governance authority.
//!
//! A tripped breaker pauses the pool for `circuit_breaker_duration_secs`
//! and then recovers on its own; the authority may resume it earlier.
//!
//! ```text
//!            trip(reason)                 now >= paused_until
//!  Active ───────────────▶ Paused ─────────────────────────────▶ Active
//!     ▲                      │
//!     └──────── resume ──────┘
//! ```
//!
//! Recovery is observed lazily: [`CircuitBreaker::status_at`] reports
//! `Active` as soon as the deadline has passed, even before
//! [`CircuitBreaker::recover_if_elapsed`] writes the transition.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineParams;
use crate::domain::{PoolId, Price};
use crate::error::AmmError;

/// Whether a pool accepts swaps and liquidity changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerStatus {
    /// Normal operation.
    Active,
    /// Swaps and liquidity changes are rejected.
    Paused,
}

impl fmt::Display for BreakerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Paused => "paused",
        })
    }
}

/// Why a breaker tripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TripReason {
    /// The price moved too far from the window reference.
    PriceDeviation {
        /// Observed deviation in basis points.
        deviation_bps: u32,
    },
    /// Too many invariant evaluations landed close to a bound.
    NearMisses {
        /// Near misses counted in the window.
        count: u32,
    },
    /// Paused by the governance authority.
    Emergency {
        /// Free-form reason supplied by the authority.
        reason: String,
    },
}

impl fmt::Display for TripReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriceDeviation { deviation_bps } => {
                write!(f, "price deviation of {deviation_bps}bp")
            }
            Self::NearMisses { count } => write!(f, "{count} invariant near misses"),
            Self::Emergency { reason } => write!(f, "emergency pause: {reason}"),
        }
    }
}

/// Circuit-breaker state embedded in every pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreaker {
    status: BreakerStatus,
    paused_until: u64,
    trigger_reason: Option<TripReason>,
    notification_count: u64,
    reference_price: Price,
    window_start: u64,
    near_misses: u32,
}

impl CircuitBreaker {
    /// Creates an active breaker whose first window starts at `now`.
    #[must_use]
    pub const fn new(reference_price: Price, now: u64) -> Self {
        Self {
            status: BreakerStatus::Active,
            paused_until: 0,
            trigger_reason: None,
            notification_count: 0,
            reference_price,
            window_start: now,
            near_misses: 0,
        }
    }

    /// Effective status at block time `now`.
    #[must_use]
    pub const fn status_at(&self, now: u64) -> BreakerStatus {
        match self.status {
            BreakerStatus::Paused if now < self.paused_until => BreakerStatus::Paused,
            _ => BreakerStatus::Active,
        }
    }

    /// Returns `true` if the pool is paused at `now`.
    #[must_use]
    pub const fn is_paused_at(&self, now: u64) -> bool {
        matches!(self.status_at(now), BreakerStatus::Paused)
    }

    /// Fails with [`AmmError::PoolPaused`] while paused.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolPaused`] if the pause deadline lies after `now`.
    pub fn ensure_active(&self, pool: PoolId, now: u64) -> crate::error::Result<()> {
        if self.is_paused_at(now) {
            return Err(AmmError::PoolPaused {
                pool,
                until: self.paused_until,
            });
        }
        Ok(())
    }

    /// Stored status, without lazy recovery.
    #[must_use]
    pub const fn status(&self) -> BreakerStatus {
        self.status
    }

    /// Unix time at which the current pause lapses; zero when never paused.
    #[must_use]
    pub const fn paused_until(&self) -> u64 {
        self.paused_until
    }

    /// Reason of the most recent trip.
    #[must_use]
    pub const fn trigger_reason(&self) -> Option<&TripReason> {
        self.trigger_reason.as_ref()
    }

    /// Number of trips over the pool's lifetime.
    #[must_use]
    pub const fn notification_count(&self) -> u64 {
        self.notification_count
    }

    /// Reference price of the current window.
    #[must_use]
    pub const fn reference_price(&self) -> Price {
        self.reference_price
    }

    /// Start of the current window.
    #[must_use]
    pub const fn window_start(&self) -> u64 {
        self.window_start
    }

    /// Near misses counted in the current window.
    #[must_use]
    pub const fn near_misses(&self) -> u32 {
        self.near_misses
    }

    /// Starts a fresh window at `now` if the current one has elapsed.
    fn roll_window(&mut self, price_before: Price, now: u64, window_secs: u64) {
        if now >= self.window_start.saturating_add(window_secs) {
            self.reference_price = price_before;
            self.window_start = now;
            self.near_misses = 0;
        }
    }

    /// Records a committed price move and trips if it exceeds the threshold.
    ///
    /// `price_before` becomes the reference when a new window opens.
    /// Returns the trip reason if the breaker tripped.
    pub fn observe_price(
        &mut self,
        price_before: Price,
        price_after: Price,
        now: u64,
        params: &EngineParams,
    ) -> Option<TripReason> {
        self.roll_window(price_before, now, params.price_window_secs);
        if self.reference_price.is_zero() {
            self.reference_price = price_before;
        }
        let deviation_bps = price_after.deviation_bps(&self.reference_price);
        if deviation_bps > params.price_deviation_threshold.get() {
            let reason = TripReason::PriceDeviation { deviation_bps };
            self.trip(reason.clone(), now, params.circuit_breaker_duration_secs);
            return Some(reason);
        }
        None
    }

    /// Counts an invariant near miss and trips at the configured limit.
    pub fn record_near_miss(
        &mut self,
        price_before: Price,
        now: u64,
        params: &EngineParams,
    ) -> Option<TripReason> {
        self.roll_window(price_before, now, params.price_window_secs);
        self.near_misses = self.near_misses.saturating_add(1);
        if self.near_misses >= params.near_miss_limit {
            let reason = TripReason::NearMisses {
                count: self.near_misses,
            };
            self.trip(reason.clone(), now, params.circuit_breaker_duration_secs);
            return Some(reason);
        }
        None
    }

    /// Pauses until `now + duration_secs`.
    pub fn trip(&mut self, reason: TripReason, now: u64, duration_secs: u64) {
        self.status = BreakerStatus::Paused;
        self.paused_until = now.saturating_add(duration_secs);
        self.trigger_reason = Some(reason);
        self.notification_count = self.notification_count.saturating_add(1);
    }

    /// Returns to `Active` and opens a new window at the current price.
    pub fn resume(&mut self, current_price: Price, now: u64) {
        self.status = BreakerStatus::Active;
        self.paused_until = 0;
        self.reference_price = current_price;
        self.window_start = now;
        self.near_misses = 0;
    }

    /// Writes the lazy `Paused → Active` transition once the deadline passed.
    ///
    /// Returns `true` if a transition was written.
    pub fn recover_if_elapsed(&mut self, current_price: Price, now: u64) -> bool {
        if self.status == BreakerStatus::Paused && now >= self.paused_until {
            self.resume(current_price, now);
            return true;
        }
        false
    }
}

//! Governance-tunable engine parameters.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, Amount, BasisPoints, Denom, FeeTier, MAX_BPS};
use crate::error::AmmError;

/// Hard upper bound on the number of hops in one routed swap.
pub const MAX_ROUTE_HOPS: u32 = 5;

/// Every tunable of the engine, snapshotted once per block.
///
/// All fields have defaults, so a TOML document only needs to name the
/// values it overrides:
///
/// ```
/// use hydra_dex::config::EngineParams;
///
/// let Ok(params) = EngineParams::from_toml_str("max_orders_per_block = 10") else {
///     return;
/// };
/// assert_eq!(params.max_orders_per_block, 10);
/// assert_eq!(params.invariant_floor.get(), 9_990);
/// ```
///
/// # Validation
///
/// - `invariant_floor ≤ 100% ≤ invariant_ceiling`.
/// - Every percentage that caps a fraction of something is `≤ 100%`.
/// - Counters, windows and durations are positive.
/// - `authority` is non-empty.
/// - The commitment deposit is positive and the reveal window
///   `[commit + delay, commit + expiry]` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Lowest permitted post/pre product ratio (default 99.9%).
    pub invariant_floor: BasisPoints,
    /// Highest permitted post/pre product ratio (default 110%).
    pub invariant_ceiling: BasisPoints,
    /// Distance from either bound that counts as a near miss.
    pub near_miss_margin: BasisPoints,
    /// Near misses within one price window that pause the pool.
    pub near_miss_limit: u32,
    /// How long a tripped breaker keeps the pool paused.
    pub circuit_breaker_duration_secs: u64,
    /// Price move, relative to the window reference, that trips the breaker.
    pub price_deviation_threshold: BasisPoints,
    /// Length of the rolling reference-price window.
    pub price_window_secs: u64,
    /// Orders examined, and lapsed swap commitments swept, per `EndBlock`.
    pub max_orders_per_block: u32,
    /// Elapsed breaker pauses lifted per `EndBlock`.
    pub max_recoveries_per_block: u32,
    /// Hard cap on list query page sizes.
    pub max_page_size: u32,
    /// Permitted deviation of a deposit from the pool ratio.
    pub ratio_tolerance: BasisPoints,
    /// Largest swap input as a fraction of the input reserve.
    pub max_swap_size: BasisPoints,
    /// Largest permitted execution price impact.
    pub max_price_impact: BasisPoints,
    /// Fraction of each swap fee accrued to the protocol.
    pub protocol_fee_share: BasisPoints,
    /// Fee tier of pools created without an explicit one.
    pub default_fee: FeeTier,
    /// Blocks after a deposit during which the provider cannot withdraw.
    pub lp_lock_blocks: u64,
    /// Smallest share amount a bootstrap deposit may mint.
    pub min_initial_shares: u64,
    /// Longest explicit multi-hop path.
    pub max_route_hops: u32,
    /// Governance account allowed to resume, pause and withdraw fees.
    pub authority: Address,
    /// Requires large swaps to go through commit and reveal.
    pub enable_commit_reveal: bool,
    /// Swap input, as a fraction of the pool's smaller reserve, above
    /// which a commitment is required.
    pub commit_reveal_threshold: BasisPoints,
    /// Blocks after the commit before the swap may be revealed.
    pub commit_reveal_delay_blocks: u64,
    /// Blocks after the commit during which the reveal is accepted.
    pub commit_expiry_blocks: u64,
    /// Deposit escrowed with every commitment.
    pub commit_deposit: Amount,
    /// Denom of the commitment deposit.
    pub commit_deposit_denom: Denom,
    /// Share of the deposit kept when a commitment is cancelled.
    pub commit_cancel_fee: BasisPoints,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            invariant_floor: BasisPoints::new(9_990),
            invariant_ceiling: BasisPoints::new(11_000),
            near_miss_margin: BasisPoints::new(10),
            near_miss_limit: 3,
            circuit_breaker_duration_secs: 3_600,
            price_deviation_threshold: BasisPoints::new(2_500),
            price_window_secs: 3_600,
            max_orders_per_block: 100,
            max_recoveries_per_block: 100,
            max_page_size: 100,
            ratio_tolerance: BasisPoints::new(100),
            max_swap_size: BasisPoints::new(1_000),
            max_price_impact: BasisPoints::new(1_000),
            protocol_fee_share: BasisPoints::new(1_667),
            default_fee: FeeTier::STANDARD,
            lp_lock_blocks: 1,
            min_initial_shares: 1_000,
            max_route_hops: MAX_ROUTE_HOPS,
            authority: Address::new("gov"),
            enable_commit_reveal: false,
            commit_reveal_threshold: BasisPoints::new(500),
            commit_reveal_delay_blocks: 2,
            commit_expiry_blocks: 50,
            commit_deposit: Amount::new(1_000_000),
            commit_deposit_denom: Denom::native(),
            commit_cancel_fee: BasisPoints::new(1_000),
        }
    }
}

impl EngineParams {
    /// Parses parameters from TOML and validates them.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidParams`] if the document does not parse.
    /// - Any error from [`validate`](Self::validate).
    pub fn from_toml_str(input: &str) -> crate::error::Result<Self> {
        let params: Self =
            toml::from_str(input).map_err(|_| AmmError::InvalidParams("malformed TOML"))?;
        params.validate()?;
        Ok(params)
    }

    /// Serializes the parameters to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidParams`] if serialization fails.
    pub fn to_toml_string(&self) -> crate::error::Result<String> {
        toml::to_string(self).map_err(|_| AmmError::InvalidParams("unserializable params"))
    }

    /// Validates all parameter invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidParams`] naming the first violated rule.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.invariant_floor.get() == 0 || self.invariant_floor.get() > MAX_BPS {
            return Err(AmmError::InvalidParams("invariant floor must be in (0, 100%]"));
        }
        if self.invariant_ceiling.get() < MAX_BPS {
            return Err(AmmError::InvalidParams("invariant ceiling must be at least 100%"));
        }
        if self.near_miss_limit == 0 {
            return Err(AmmError::InvalidParams("near miss limit must be positive"));
        }
        if self.circuit_breaker_duration_secs == 0 {
            return Err(AmmError::InvalidParams("breaker duration must be positive"));
        }
        if self.price_deviation_threshold.get() == 0 {
            return Err(AmmError::InvalidParams("price deviation threshold must be positive"));
        }
        if self.price_window_secs == 0 {
            return Err(AmmError::InvalidParams("price window must be positive"));
        }
        if self.max_orders_per_block == 0 {
            return Err(AmmError::InvalidParams("max orders per block must be positive"));
        }
        if self.max_recoveries_per_block == 0 {
            return Err(AmmError::InvalidParams("max recoveries per block must be positive"));
        }
        if self.max_page_size == 0 {
            return Err(AmmError::InvalidParams("max page size must be positive"));
        }
        let fractions = [
            self.ratio_tolerance,
            self.max_swap_size,
            self.max_price_impact,
            self.protocol_fee_share,
        ];
        if fractions.iter().any(|bp| !bp.is_valid_percent()) {
            return Err(AmmError::InvalidParams("fractional caps must not exceed 100%"));
        }
        if self.max_swap_size.get() == 0 || self.max_price_impact.get() == 0 {
            return Err(AmmError::InvalidParams("swap caps must be positive"));
        }
        if self.max_route_hops == 0 || self.max_route_hops > MAX_ROUTE_HOPS {
            return Err(AmmError::InvalidParams("route hops must be in 1..=5"));
        }
        if self.authority.is_empty() {
            return Err(AmmError::InvalidParams("authority must be set"));
        }
        if self.commit_reveal_threshold.get() == 0 || !self.commit_reveal_threshold.is_valid_percent() {
            return Err(AmmError::InvalidParams("commit threshold must be in (0, 100%]"));
        }
        if self.commit_reveal_delay_blocks == 0 {
            return Err(AmmError::InvalidParams("reveal delay must be positive"));
        }
        if self.commit_expiry_blocks < self.commit_reveal_delay_blocks {
            return Err(AmmError::InvalidParams("commit expiry must not precede the reveal delay"));
        }
        if self.commit_deposit.is_zero() {
            return Err(AmmError::InvalidParams("commit deposit must be positive"));
        }
        if !self.commit_cancel_fee.is_valid_percent() {
            return Err(AmmError::InvalidParams("cancellation fee must not exceed 100%"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineParams::default().validate().is_ok());
    }

    #[test]
    fn toml_overrides_defaults() {
        let input = r#"
            circuit_breaker_duration_secs = 60
            default_fee = 100
            authority = "council"
        "#;
        let Ok(params) = EngineParams::from_toml_str(input) else {
            panic!("expected Ok");
        };
        assert_eq!(params.circuit_breaker_duration_secs, 60);
        assert_eq!(params.default_fee, FeeTier::HIGH);
        assert_eq!(params.authority, Address::new("council"));
        assert_eq!(params.max_page_size, 100);
    }

    #[test]
    fn toml_round_trip() {
        let params = EngineParams::default();
        let Ok(text) = params.to_toml_string() else {
            panic!("expected Ok");
        };
        assert_eq!(EngineParams::from_toml_str(&text).ok(), Some(params));
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(
            EngineParams::from_toml_str("max_page_size = \"many\""),
            Err(AmmError::InvalidParams(_))
        ));
    }

    #[test]
    fn fee_tier_above_cap_rejected() {
        assert!(EngineParams::from_toml_str("default_fee = 5000").is_err());
    }

    #[test]
    fn invalid_bounds_rejected() {
        let mut params = EngineParams::default();
        params.invariant_ceiling = BasisPoints::new(9_000);
        assert!(params.validate().is_err());

        let mut params = EngineParams::default();
        params.invariant_floor = BasisPoints::ZERO;
        assert!(params.validate().is_err());
    }

    #[test]
    fn commit_reveal_settings() {
        let input = r#"
            enable_commit_reveal = true
            commit_deposit = 5000
            commit_deposit_denom = "upaw"
        "#;
        let Ok(params) = EngineParams::from_toml_str(input) else {
            panic!("expected Ok");
        };
        assert!(params.enable_commit_reveal);
        assert_eq!(params.commit_deposit, Amount::new(5_000));
        assert_eq!(params.commit_deposit_denom.as_str(), "upaw");
        assert_eq!(params.commit_reveal_delay_blocks, 2);

        let mut params = EngineParams::default();
        params.commit_expiry_blocks = 1;
        assert!(params.validate().is_err());

        let mut params = EngineParams::default();
        params.commit_deposit = Amount::ZERO;
        assert!(params.validate().is_err());

        let mut params = EngineParams::default();
        params.commit_reveal_threshold = BasisPoints::ZERO;
        assert!(params.validate().is_err());
    }

    #[test]
    fn invalid_counters_rejected() {
        let mut params = EngineParams::default();
        params.max_orders_per_block = 0;
        assert!(params.validate().is_err());

        let mut params = EngineParams::default();
        params.max_route_hops = 6;
        assert!(params.validate().is_err());

        let mut params = EngineParams::default();
        params.max_recoveries_per_block = 0;
        assert!(params.validate().is_err());

        let mut params = EngineParams::default();
        params.protocol_fee_share = BasisPoints::new(10_001);
        assert!(params.validate().is_err());
    }
}

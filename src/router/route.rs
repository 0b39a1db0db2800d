//! Validated swap paths.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Denom, DenomPair, PoolId};
use crate::error::AmmError;
use crate::pools::PoolRegistry;

/// One pool traversal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hop {
    /// Pool swapped through.
    pub pool_id: PoolId,
    /// Denom paid into the pool.
    pub denom_in: Denom,
    /// Denom taken out of the pool.
    pub denom_out: Denom,
}

/// A contiguous, non-empty path of hops through distinct pools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    hops: Vec<Hop>,
}

impl Route {
    /// Validates and wraps a hop sequence.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidRoute`] if the path is empty, longer than
    /// `max_hops`, not contiguous, or visits a pool twice.
    pub fn new(hops: Vec<Hop>, max_hops: u32) -> crate::error::Result<Self> {
        if hops.is_empty() {
            return Err(AmmError::InvalidRoute("route has no hops"));
        }
        if hops.len() > usize::try_from(max_hops).unwrap_or(usize::MAX) {
            return Err(AmmError::InvalidRoute("route exceeds hop limit"));
        }
        if hops.windows(2).any(|w| w[0].denom_out != w[1].denom_in) {
            return Err(AmmError::InvalidRoute("hops are not contiguous"));
        }
        let mut pools: Vec<PoolId> = hops.iter().map(|h| h.pool_id).collect();
        pools.sort_unstable();
        if pools.windows(2).any(|w| w[0] == w[1]) {
            return Err(AmmError::InvalidRoute("route visits a pool twice"));
        }
        Ok(Self { hops })
    }

    /// Resolves a denom path (`[in, via…, out]`) to pools.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidRoute`] for paths shorter than two denoms and
    ///   the rules of [`new`](Self::new).
    /// - [`AmmError::InvalidDenom`] if two consecutive denoms are equal.
    /// - [`AmmError::PairNotFound`] if a leg has no pool.
    pub fn from_denoms(
        registry: &PoolRegistry,
        path: &[Denom],
        max_hops: u32,
    ) -> crate::error::Result<Self> {
        if path.len() < 2 {
            return Err(AmmError::InvalidRoute("path needs at least two denoms"));
        }
        let hops = path
            .windows(2)
            .map(|leg| {
                let pair = DenomPair::new(leg[0].clone(), leg[1].clone())?;
                let pool_id = registry.id_for_pair(&pair).ok_or_else(|| {
                    AmmError::PairNotFound(leg[0].to_string(), leg[1].to_string())
                })?;
                Ok(Hop {
                    pool_id,
                    denom_in: leg[0].clone(),
                    denom_out: leg[1].clone(),
                })
            })
            .collect::<crate::error::Result<Vec<_>>>()?;
        Self::new(hops, max_hops)
    }

    /// Returns the hops in order.
    #[must_use]
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Number of hops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Always `false`: routes have at least one hop.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Denoms visited, from input to output.
    #[must_use]
    pub fn denoms(&self) -> Vec<&Denom> {
        let mut out: Vec<&Denom> = self.hops.iter().map(|h| &h.denom_in).collect();
        if let Some(last) = self.hops.last() {
            out.push(&last.denom_out);
        }
        out
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let denoms: Vec<&str> = self.denoms().iter().map(|d| d.as_str()).collect();
        f.write_str(&denoms.join(" -> "))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{BlockContext, FeeTier};

    fn denom(s: &str) -> Denom {
        let Ok(d) = Denom::new(s) else {
            panic!("valid denom");
        };
        d
    }

    fn hop(pool: u64, from: &str, to: &str) -> Hop {
        Hop {
            pool_id: PoolId::new(pool),
            denom_in: denom(from),
            denom_out: denom(to),
        }
    }

    fn registry() -> PoolRegistry {
        let mut registry = PoolRegistry::new();
        for (a, b) in [("atom", "osmo"), ("osmo", "usdc")] {
            let Ok(pair) = DenomPair::new(denom(a), denom(b)) else {
                panic!("valid pair");
            };
            if registry.register(pair, FeeTier::STANDARD, BlockContext::new(1, 0)).is_err() {
                panic!("registered");
            }
        }
        registry
    }

    // -- Validation ---------------------------------------------------------

    #[test]
    fn contiguous_route_is_accepted() {
        let Ok(route) = Route::new(vec![hop(1, "atom", "osmo"), hop(2, "osmo", "usdc")], 2) else {
            panic!("expected Ok");
        };
        assert_eq!(route.len(), 2);
        assert!(!route.is_empty());
        assert_eq!(route.to_string(), "atom -> osmo -> usdc");
    }

    #[test]
    fn malformed_routes_are_rejected() {
        let cases = [
            (vec![], 3, "route has no hops"),
            (
                vec![hop(1, "atom", "osmo"), hop(2, "osmo", "usdc")],
                1,
                "route exceeds hop limit",
            ),
            (
                vec![hop(1, "atom", "osmo"), hop(2, "usdc", "juno")],
                3,
                "hops are not contiguous",
            ),
            (
                vec![hop(1, "atom", "osmo"), hop(1, "osmo", "atom")],
                3,
                "route visits a pool twice",
            ),
        ];
        for (hops, max, reason) in cases {
            assert_eq!(Route::new(hops, max), Err(AmmError::InvalidRoute(reason)));
        }
    }

    // -- Denom paths --------------------------------------------------------

    #[test]
    fn denom_path_resolves_pools() {
        let registry = registry();
        let path = [denom("usdc"), denom("osmo"), denom("atom")];
        let Ok(route) = Route::from_denoms(&registry, &path, 5) else {
            panic!("expected Ok");
        };
        let pools: Vec<PoolId> = route.hops().iter().map(|h| h.pool_id).collect();
        assert_eq!(pools, vec![PoolId::new(2), PoolId::new(1)]);
        assert_eq!(route.denoms(), path.iter().collect::<Vec<_>>());
    }

    #[test]
    fn denom_path_errors() {
        let registry = registry();
        assert_eq!(
            Route::from_denoms(&registry, &[denom("atom")], 5),
            Err(AmmError::InvalidRoute("path needs at least two denoms"))
        );
        assert_eq!(
            Route::from_denoms(&registry, &[denom("atom"), denom("usdc")], 5),
            Err(AmmError::PairNotFound("atom".into(), "usdc".into()))
        );
        assert!(matches!(
            Route::from_denoms(&registry, &[denom("atom"), denom("atom")], 5),
            Err(AmmError::InvalidDenom(_))
        ));
    }
}

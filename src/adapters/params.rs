//! Fixed in-memory parameter source.

use crate::config::EngineParams;
use crate::traits::ParamSource;

/// A [`ParamSource`] holding one parameter set until replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticParams {
    params: EngineParams,
}

impl StaticParams {
    /// Wraps a parameter set.
    #[must_use]
    pub const fn new(params: EngineParams) -> Self {
        Self { params }
    }

    /// Replaces the parameter set, as a governance proposal would.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidParams`](crate::error::AmmError::InvalidParams)
    /// if `params` fails validation; the previous set is kept.
    pub fn set(&mut self, params: EngineParams) -> crate::error::Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }
}

impl ParamSource for StaticParams {
    fn params(&self) -> EngineParams {
        self.params.clone()
    }
}

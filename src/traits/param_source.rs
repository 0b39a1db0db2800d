//! Governance parameter collaborator.

use crate::config::EngineParams;

/// Supplier of the governance parameter set.
///
/// The engine calls [`params`](ParamSource::params) once per block in
/// `begin_block` and uses that snapshot for every operation in the block,
/// so a governance update takes effect from the next block onward.
pub trait ParamSource {
    /// Returns the current parameter set.
    fn params(&self) -> EngineParams;
}

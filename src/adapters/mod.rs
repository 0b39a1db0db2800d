//! In-memory collaborator implementations.
//!
//! Deterministic stand-ins for the host chain, used by the test suites and
//! by offline simulations:
//!
//! | Trait | Adapter |
//! |-------|---------|
//! | [`Bank`](crate::traits::Bank) | [`InMemoryBank`] |
//! | [`BlockClock`](crate::traits::BlockClock) | [`ManualClock`] |
//! | [`ParamSource`](crate::traits::ParamSource) | [`StaticParams`] |

mod bank;
mod clock;
mod params;

pub use bank::InMemoryBank;
pub use clock::ManualClock;
pub use params::StaticParams;

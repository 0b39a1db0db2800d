//! Collaborator traits consumed by the engine.
//!
//! The engine is a pure state machine: tokens, time and governance live
//! outside it. These traits are the seams through which the host chain
//! supplies them:
//!
//! - [`Bank`]: atomic balance transfers and balance queries.
//! - [`BlockClock`]: deterministic block height and time.
//! - [`ParamSource`]: governance parameters, read once per block.
//!
//! In-memory implementations live in [`crate::adapters`].

mod bank;
mod clock;
mod param_source;

pub use bank::Bank;
pub use clock::BlockClock;
pub use param_source::ParamSource;

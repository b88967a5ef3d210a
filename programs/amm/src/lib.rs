//! Constant Product Market Maker (x·y=k)
//!
//! The manipulable price source: reserves of one base/quote pair, exact-input
//! swaps with the fee withheld from the input leg, and the instantaneous spot
//! price an oracle reads.

pub mod math;
pub mod state;

pub use math::*;
pub use state::*;

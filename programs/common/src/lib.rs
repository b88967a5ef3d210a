//! Shared types for the flashsim models
//!
//! Amounts are `U256` token units, prices are exact `Fraction`s and every
//! model reports failures through [`SimError`].

pub mod error;
pub mod fraction;
pub mod math;
pub mod types;

pub use error::*;
pub use fraction::*;
pub use math::*;
pub use types::*;

pub use primitive_types::U256;

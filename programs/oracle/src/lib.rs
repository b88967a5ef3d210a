//! Pool-backed price oracle with a deviation guard
//!
//! ## Reads
//!
//! - **read_unsafe**: instantaneous pool price, no guard, no state update
//! - **read_guarded**: pool price checked against the last accepted reading;
//!   rejected when it moved more than `max_deviation_bps`
//!
//! ## State
//!
//! ```text
//! OracleState:
//!   config.max_deviation_bps: u16   - Allowed move between guarded reads
//!   config.quotation: Quotation     - BasePerQuote (default) or QuotePerBase
//!   last_observed_price: Fraction   - Last accepted guarded reading (unset until first read)
//!   observations: u64               - Accepted guarded reads
//! ```

pub mod guard;
pub mod state;

pub use guard::{deviation_bps, within_deviation};
pub use state::{OracleConfig, OracleState};

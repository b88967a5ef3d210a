//! Collateralized lending ledger
//!
//! One position: base collateral in, quote debt out, valued through the
//! guarded oracle at borrow time.

pub mod position;
pub mod state;

pub use position::LedgerPosition;
pub use state::{Bank, BankConfig};

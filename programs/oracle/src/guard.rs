//! Deviation checks between consecutive prices

use flashsim_common::{Fraction, Result, U256};

/// Deviation of `current` from `reference` in basis points (rounded down)
pub fn deviation_bps(current: &Fraction, reference: &Fraction) -> Result<U256> {
    current.deviation_bps(reference)
}

/// Returns true if `current` is within `max_deviation_bps` of `reference`
///
/// The bound is inclusive: a move of exactly `max_deviation_bps` is accepted.
pub fn within_deviation(
    current: &Fraction,
    reference: &Fraction,
    max_deviation_bps: u16,
) -> Result<bool> {
    Ok(deviation_bps(current, reference)? <= U256::from(max_deviation_bps))
}

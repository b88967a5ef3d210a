//! Constant product AMM math (x·y=k)

use flashsim_common::{add_u256, apply_bps, mul_u256, sub_u256, Result, SimError, U256, BPS_SCALE};

/// Swap quote with the reserves the swap would leave behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    /// Input after the fee is withheld
    pub amount_in_after_fee: U256,

    /// Amount paid out of the output reserve
    pub amount_out: U256,

    /// Input reserve after the swap (full input, fee included)
    pub new_reserve_in: U256,

    /// Output reserve after the swap
    pub new_reserve_out: U256,
}

/// Calculate the output of an exact-input swap
///
/// With fee on input:
/// - Δin_net = Δin * (10000 - fee) / 10000
/// - Δout = r_out * Δin_net / (r_in + Δin_net)
/// - r_in' = r_in + Δin (the fee stays in the pool)
/// - r_out' = r_out - Δout
pub fn quote_exact_in(
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u16,
    amount_in: U256,
) -> Result<SwapQuote> {
    // Validate inputs
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_in.is_zero() {
        return Err(SimError::InsufficientLiquidity);
    }
    if u64::from(fee_bps) >= BPS_SCALE {
        return Err(SimError::InvalidParameter("fee_bps must be below 10000"));
    }

    // Apply fee to input
    let amount_in_after_fee = apply_bps(amount_in, (BPS_SCALE as u16) - fee_bps)?;

    let numerator = mul_u256(reserve_out, amount_in_after_fee)?;
    let denominator = add_u256(reserve_in, amount_in_after_fee)?;
    let amount_out = numerator / denominator;

    // Nothing out, or the whole reserve out, is not a swap
    if amount_out.is_zero() || amount_out >= reserve_out {
        return Err(SimError::InsufficientLiquidity);
    }

    Ok(SwapQuote {
        amount_in_after_fee,
        amount_out,
        new_reserve_in: add_u256(reserve_in, amount_in)?,
        new_reserve_out: sub_u256(reserve_out, amount_out)?,
    })
}

/// Output with the same formula but no fee (reference for fee accounting)
pub fn quote_exact_in_no_fee(reserve_in: U256, reserve_out: U256, amount_in: U256) -> Result<U256> {
    quote_exact_in(reserve_in, reserve_out, 0, amount_in).map(|q| q.amount_out)
}

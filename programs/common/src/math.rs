//! Checked arithmetic helpers - overflow is an error, never a wrap

use crate::error::{Result, SimError};
use num_bigint::{BigInt, BigUint, Sign};
use primitive_types::U256;

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u64 = 10_000;

/// 1e18, the unit of an 18-decimal token
pub fn wad() -> U256 {
    U256::exp10(18)
}

/// Whole tokens to 18-decimal units
pub fn ether(tokens: u64) -> U256 {
    U256::from(tokens) * wad()
}

/// Add U256, overflow is an error
pub fn add_u256(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(SimError::ArithmeticOverflow)
}

/// Subtract U256, underflow is an error
pub fn sub_u256(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b).ok_or(SimError::ArithmeticOverflow)
}

/// Multiply U256, overflow is an error
pub fn mul_u256(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(SimError::ArithmeticOverflow)
}

/// Divide U256 (zero divisor is an error)
pub fn div_u256(a: U256, b: U256) -> Result<U256> {
    if b.is_zero() {
        return Err(SimError::ArithmeticOverflow);
    }
    Ok(a / b)
}

/// amount * bps / 10_000, rounded down
pub fn apply_bps(amount: U256, bps: u16) -> Result<U256> {
    let scaled = mul_u256(amount, U256::from(bps))?;
    Ok(scaled / U256::from(BPS_SCALE))
}

/// Minimum of two U256
pub fn min_u256(a: U256, b: U256) -> U256 {
    if a < b { a } else { b }
}

pub fn to_biguint(value: U256) -> BigUint {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    BigUint::from_bytes_le(&bytes)
}

/// Narrow an exact value back to U256
pub fn to_u256(value: &BigUint) -> Result<U256> {
    let bytes = value.to_bytes_le();
    if bytes.len() > 32 {
        return Err(SimError::ArithmeticOverflow);
    }
    Ok(U256::from_little_endian(&bytes))
}

pub fn to_bigint(value: U256) -> BigInt {
    BigInt::from_biguint(Sign::Plus, to_biguint(value))
}

/// a - b as a signed value
pub fn signed_diff(a: &BigUint, b: &BigUint) -> BigInt {
    BigInt::from(a.clone()) - BigInt::from(b.clone())
}

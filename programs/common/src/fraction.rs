//! Exact rational prices
//!
//! Prices are kept as reduced `BigUint` ratios so that repeated reads and
//! comparisons never accumulate rounding drift. Rounding happens only when a
//! price is applied to an amount, and then always downwards.

use crate::error::{Result, SimError};
use crate::math::{to_biguint, to_u256, BPS_SCALE};
use core::fmt;
use num_bigint::{BigInt, BigUint, Sign};
use num_rational::Ratio;
use num_traits::Zero;
use primitive_types::U256;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fraction(Ratio<BigUint>);

impl Fraction {
    pub fn new(numer: U256, denom: U256) -> Result<Self> {
        Self::from_biguint(to_biguint(numer), to_biguint(denom))
    }

    pub fn from_biguint(numer: BigUint, denom: BigUint) -> Result<Self> {
        if denom.is_zero() {
            return Err(SimError::InvalidParameter("fraction denominator is zero"));
        }
        Ok(Self(Ratio::new(numer, denom)))
    }

    pub fn from_integer(value: U256) -> Self {
        Self(Ratio::from_integer(to_biguint(value)))
    }

    pub fn numer(&self) -> &BigUint {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigUint {
        self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.numer().is_zero()
    }

    /// 1 / self
    pub fn recip(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(SimError::InvalidParameter("reciprocal of zero price"));
        }
        Ok(Self(self.0.recip()))
    }

    /// |self - other|
    pub fn abs_diff(&self, other: &Fraction) -> Fraction {
        if self.0 >= other.0 {
            Self(&self.0 - &other.0)
        } else {
            Self(&other.0 - &self.0)
        }
    }

    /// floor(|self - reference| * 10_000 / reference)
    pub fn deviation_bps(&self, reference: &Fraction) -> Result<U256> {
        if reference.is_zero() {
            return Err(SimError::InvalidParameter("deviation against zero price"));
        }
        let scaled = self.abs_diff(reference).0 * BigUint::from(BPS_SCALE) / &reference.0;
        to_u256(&scaled.to_integer())
    }

    /// Percentage change from `reference` to `self`, truncated toward zero
    pub fn pct_change(&self, reference: &Fraction) -> Result<BigInt> {
        if reference.is_zero() {
            return Err(SimError::InvalidParameter("change against zero price"));
        }
        let magnitude = (self.abs_diff(reference).0 * BigUint::from(100u8) / &reference.0).to_integer();
        let sign = if self.0 >= reference.0 { Sign::Plus } else { Sign::Minus };
        Ok(BigInt::from_biguint(sign, magnitude))
    }

    /// floor(amount * self), exact
    pub fn mul_floor(&self, amount: U256) -> BigUint {
        to_biguint(amount) * self.0.numer() / self.0.denom()
    }

    /// floor(amount * self), narrowed to U256
    pub fn mul_floor_u256(&self, amount: U256) -> Result<U256> {
        to_u256(&self.mul_floor(amount))
    }

    /// Decimal rendering truncated to `decimals` places (trailing zeros trimmed)
    pub fn to_decimal_string(&self, decimals: u32) -> String {
        let unit = BigUint::from(10u8).pow(decimals);
        let scaled = self.0.numer() * &unit / self.0.denom();
        let whole = &scaled / &unit;
        let frac = &scaled % &unit;
        if frac.is_zero() || decimals == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string(18))
    }
}

//! Borrower position and its borrow limit

use flashsim_common::{add_u256, to_biguint, to_u256, Fraction, Result, SimError, U256, BPS_SCALE};
use num_bigint::BigUint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPosition {
    /// Deposited collateral (base units)
    pub collateral_amount: U256,

    /// Outstanding debt (quote units)
    pub borrowed_amount: U256,

    /// Share of collateral value that may be borrowed (e.g., 8000 = 80%)
    pub collateral_factor_bps: u16,
}

impl LedgerPosition {
    pub fn new(collateral_factor_bps: u16) -> Result<Self> {
        if u64::from(collateral_factor_bps) > BPS_SCALE {
            return Err(SimError::InvalidParameter("collateral_factor_bps above 10000"));
        }
        Ok(Self {
            collateral_amount: U256::zero(),
            borrowed_amount: U256::zero(),
            collateral_factor_bps,
        })
    }

    /// Gross borrow limit at a quote-per-base price, before existing debt
    ///
    /// floor(collateral * price * cf / 10000), computed exactly.
    pub fn borrow_limit_at(&self, price_qpb: &Fraction) -> BigUint {
        let numerator = to_biguint(self.collateral_amount)
            * price_qpb.numer()
            * BigUint::from(self.collateral_factor_bps);
        let denominator = price_qpb.denom() * BigUint::from(BPS_SCALE);
        numerator / denominator
    }

    /// Borrow limit minus existing debt, clamped at zero
    pub fn borrowable_at(&self, price_qpb: &Fraction) -> Result<U256> {
        let limit = self.borrow_limit_at(price_qpb);
        let debt = to_biguint(self.borrowed_amount);
        if limit <= debt {
            return Ok(U256::zero());
        }
        to_u256(&(limit - debt))
    }

    pub(crate) fn add_collateral(&mut self, amount: U256) -> Result<()> {
        self.collateral_amount = add_u256(self.collateral_amount, amount)?;
        Ok(())
    }

    pub(crate) fn add_debt(&mut self, amount: U256) -> Result<()> {
        self.borrowed_amount = add_u256(self.borrowed_amount, amount)?;
        Ok(())
    }
}

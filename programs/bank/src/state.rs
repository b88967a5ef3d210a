//! Bank state - collateral, debt, lendable cash and the reentrancy guard

use crate::position::LedgerPosition;
use flashsim_amm::PoolState;
use flashsim_common::{add_u256, ether, sub_u256, Fraction, Result, SimError, U256};
use flashsim_oracle::OracleState;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankConfig {
    /// Share of collateral value that may be borrowed (e.g., 8000 = 80%)
    pub collateral_factor_bps: u16,

    /// Quote the bank can lend out
    pub cash: U256,

    /// Reject nested borrows while one is in progress
    pub reentrancy_guard: bool,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            collateral_factor_bps: 8_000,
            cash: ether(500),
            reentrancy_guard: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    position: LedgerPosition,
    cash: U256,
    reentrancy_guard: bool,
    borrow_in_progress: bool,
}

impl Bank {
    pub fn new(config: BankConfig) -> Result<Self> {
        Ok(Self {
            position: LedgerPosition::new(config.collateral_factor_bps)?,
            cash: config.cash,
            reentrancy_guard: config.reentrancy_guard,
            borrow_in_progress: false,
        })
    }

    pub fn position(&self) -> &LedgerPosition {
        &self.position
    }

    pub fn cash(&self) -> U256 {
        self.cash
    }

    pub fn reentrancy_guard_enabled(&self) -> bool {
        self.reentrancy_guard
    }

    pub fn borrow_in_progress(&self) -> bool {
        self.borrow_in_progress
    }

    pub fn set_reentrancy_guard(&mut self, enabled: bool) {
        self.reentrancy_guard = enabled;
    }

    /// Add collateral; no oracle interaction
    pub fn deposit(&mut self, amount: U256) -> Result<()> {
        if amount.is_zero() {
            return Err(SimError::ZeroAmount);
        }
        self.position.add_collateral(amount)?;
        debug!(
            "bank: deposit {} -> collateral {}",
            amount, self.position.collateral_amount
        );
        Ok(())
    }

    /// Borrowable quote at an explicit quote-per-base price
    pub fn borrowable_at(&self, price_qpb: &Fraction) -> Result<U256> {
        self.position.borrowable_at(price_qpb)
    }

    /// Borrowable quote at the guarded oracle price
    ///
    /// The guarded read updates the oracle cache, so this takes it mutably.
    pub fn max_borrowable(&self, oracle: &mut OracleState, pool: &PoolState) -> Result<U256> {
        let price = oracle.read_guarded(pool)?;
        let price_qpb = oracle.quotation().to_quote_per_base(&price)?;
        self.borrowable_at(&price_qpb)
    }

    pub fn borrow(&mut self, oracle: &mut OracleState, pool: &PoolState, amount: U256) -> Result<()> {
        self.borrow_with_hook(oracle, pool, amount, |_, _, _| Ok(()))
    }

    /// Borrow with a receive callback
    ///
    /// The hook runs after the cash leaves the bank and before the debt is
    /// recorded. If it fails, the cash comes back and the error propagates.
    pub fn borrow_with_hook<F>(
        &mut self,
        oracle: &mut OracleState,
        pool: &PoolState,
        amount: U256,
        hook: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Bank, &mut OracleState, &PoolState) -> Result<()>,
    {
        if self.borrow_in_progress && self.reentrancy_guard {
            warn!("bank: nested borrow of {} rejected", amount);
            return Err(SimError::ReentrantCall);
        }
        if amount.is_zero() {
            return Err(SimError::ZeroAmount);
        }

        let outer = self.borrow_in_progress;
        self.borrow_in_progress = true;
        let result = self.borrow_locked(oracle, pool, amount, hook);
        self.borrow_in_progress = outer;
        result
    }

    fn borrow_locked<F>(
        &mut self,
        oracle: &mut OracleState,
        pool: &PoolState,
        amount: U256,
        hook: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Bank, &mut OracleState, &PoolState) -> Result<()>,
    {
        let available = self.max_borrowable(oracle, pool)?;
        if amount > available {
            return Err(SimError::ExceedsCollateralLimit {
                requested: amount,
                available,
            });
        }
        if amount > self.cash {
            return Err(SimError::InsufficientCash {
                requested: amount,
                available: self.cash,
            });
        }

        self.cash = sub_u256(self.cash, amount)?;

        if let Err(e) = hook(self, oracle, pool) {
            self.cash = add_u256(self.cash, amount)?;
            return Err(e);
        }

        self.position.add_debt(amount)?;
        debug!(
            "bank: borrow {} -> debt {} cash {}",
            amount, self.position.borrowed_amount, self.cash
        );
        Ok(())
    }
}

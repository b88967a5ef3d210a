//! Market bundle and the shared live handle

use flashsim_amm::PoolState;
use flashsim_bank::{Bank, BankConfig};
use flashsim_common::{ether, Result, U256};
use flashsim_oracle::{OracleConfig, OracleState};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Initial market parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketConfig {
    pub reserve_base: U256,
    pub reserve_quote: U256,
    pub fee_bps: u16,
    pub oracle: OracleConfig,
    pub bank: BankConfig,
}

impl Default for MarketConfig {
    /// 10M ALPHA / 1000 ETH at 0.3%, 50% guard, 80% collateral factor
    fn default() -> Self {
        Self {
            reserve_base: ether(10_000_000),
            reserve_quote: ether(1_000),
            fee_bps: 30,
            oracle: OracleConfig::default(),
            bank: BankConfig::default(),
        }
    }
}

/// Pool, oracle and bank of one base/quote pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    pub pool: PoolState,
    pub oracle: OracleState,
    pub bank: Bank,
}

impl Market {
    /// Build a market with the oracle already seeded from the pool
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let pool = PoolState::new(config.reserve_base, config.reserve_quote, config.fee_bps)?;
        let oracle = OracleState::seeded(config.oracle, &pool)?;
        let bank = Bank::new(config.bank)?;
        Ok(Self { pool, oracle, bank })
    }
}

/// Live market shared between attackers
///
/// Executions hold the lock for a whole run; simulations only hold it long
/// enough to clone.
#[derive(Debug, Clone)]
pub struct LiveMarket {
    inner: Arc<Mutex<Market>>,
}

impl LiveMarket {
    pub fn new(market: Market) -> Self {
        Self {
            inner: Arc::new(Mutex::new(market)),
        }
    }

    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        Market::new(config).map(Self::new)
    }

    /// Private copy of the current state
    pub fn snapshot(&self) -> Market {
        self.inner.lock().clone()
    }

    pub fn lock(&self) -> MutexGuard<'_, Market> {
        self.inner.lock()
    }
}

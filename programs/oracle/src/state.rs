//! Oracle state
//!
//! Reads a reference price from the pool and remembers the last reading that
//! passed the deviation guard. The guard compares each read only to that last
//! accepted reading, never to an older baseline.

use crate::guard::{deviation_bps, within_deviation};
use flashsim_amm::PoolState;
use flashsim_common::{Fraction, Quotation, Result, SimError, U256};
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleConfig {
    /// Largest accepted move between guarded reads (e.g., 5000 = 50%)
    pub max_deviation_bps: u16,

    /// Unit prices are reported in
    pub quotation: Quotation,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_deviation_bps: 5_000,
            quotation: Quotation::BasePerQuote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleState {
    config: OracleConfig,

    /// Last accepted guarded reading (None until the first guarded read)
    last_observed_price: Option<Fraction>,

    /// Accepted guarded reads
    observations: u64,
}

impl OracleState {
    /// Create an oracle that has not observed any price yet
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            last_observed_price: None,
            observations: 0,
        }
    }

    /// Create an oracle deployed against a live pool: the first guarded read
    /// happens immediately and seeds `last_observed_price`
    pub fn seeded(config: OracleConfig, pool: &PoolState) -> Result<Self> {
        let mut oracle = Self::new(config);
        oracle.read_guarded(pool)?;
        Ok(oracle)
    }

    pub fn config(&self) -> OracleConfig {
        self.config
    }

    pub fn quotation(&self) -> Quotation {
        self.config.quotation
    }

    pub fn max_deviation_bps(&self) -> u16 {
        self.config.max_deviation_bps
    }

    pub fn last_observed_price(&self) -> Option<&Fraction> {
        self.last_observed_price.as_ref()
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Instantaneous pool price; never fails, never updates state
    pub fn read_unsafe(&self, pool: &PoolState) -> Fraction {
        pool.price(self.config.quotation)
    }

    /// Deviation of the current pool price from the last accepted reading
    ///
    /// Returns None before the first guarded read.
    pub fn pending_deviation_bps(&self, pool: &PoolState) -> Result<Option<U256>> {
        match &self.last_observed_price {
            Some(last) => deviation_bps(&self.read_unsafe(pool), last).map(Some),
            None => Ok(None),
        }
    }

    /// Guarded read: reject if the price moved more than the bound since the
    /// last accepted reading, otherwise accept and remember it
    pub fn read_guarded(&mut self, pool: &PoolState) -> Result<Fraction> {
        let current = self.read_unsafe(pool);

        if let Some(last) = &self.last_observed_price {
            let deviation = deviation_bps(&current, last)?;
            if !within_deviation(&current, last, self.config.max_deviation_bps)? {
                warn!(
                    "oracle: rejected price {} ({} bps > {} bps)",
                    current, deviation, self.config.max_deviation_bps
                );
                return Err(SimError::DeviationExceeded {
                    deviation_bps: deviation,
                    max_deviation_bps: self.config.max_deviation_bps,
                });
            }
            debug!("oracle: accepted price {} ({} bps)", current, deviation);
        } else {
            debug!("oracle: seeded price {}", current);
        }

        self.last_observed_price = Some(current.clone());
        self.observations = self.observations.saturating_add(1);
        Ok(current)
    }
}

//! AMM pool state - constant product automated market maker

use crate::math::{quote_exact_in, SwapQuote};
use flashsim_common::{to_biguint, Fraction, Quotation, Result, SimError, SwapDirection, U256, BPS_SCALE};
use log::debug;
use num_bigint::BigUint;

/// Pool reserves and fee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    /// Base reserve (x in x·y=k), e.g. ALPHA
    reserve_base: U256,

    /// Quote reserve (y in x·y=k), e.g. ETH
    reserve_quote: U256,

    /// Fee in basis points (e.g., 30 = 0.3%)
    fee_bps: u16,
}

impl PoolState {
    /// Create new pool state
    pub fn new(reserve_base: U256, reserve_quote: U256, fee_bps: u16) -> Result<Self> {
        if reserve_base.is_zero() || reserve_quote.is_zero() {
            return Err(SimError::InvalidParameter("pool reserves must be non-zero"));
        }
        if u64::from(fee_bps) >= BPS_SCALE {
            return Err(SimError::InvalidParameter("fee_bps must be below 10000"));
        }
        Ok(Self {
            reserve_base,
            reserve_quote,
            fee_bps,
        })
    }

    pub fn reserve_base(&self) -> U256 {
        self.reserve_base
    }

    pub fn reserve_quote(&self) -> U256 {
        self.reserve_quote
    }

    pub fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    /// (reserve_in, reserve_out) for a direction
    pub fn reserves(&self, direction: SwapDirection) -> (U256, U256) {
        match direction {
            SwapDirection::BaseToQuote => (self.reserve_base, self.reserve_quote),
            SwapDirection::QuoteToBase => (self.reserve_quote, self.reserve_base),
        }
    }

    /// Full quote for a swap without touching reserves
    pub fn preview_swap(&self, amount_in: U256, direction: SwapDirection) -> Result<SwapQuote> {
        let (reserve_in, reserve_out) = self.reserves(direction);
        quote_exact_in(reserve_in, reserve_out, self.fee_bps, amount_in)
    }

    /// Output of a swap, no state mutation
    pub fn quote_swap(&self, amount_in: U256, direction: SwapDirection) -> Result<U256> {
        self.preview_swap(amount_in, direction).map(|q| q.amount_out)
    }

    /// Execute a swap: both reserves update or neither does
    pub fn swap(&mut self, amount_in: U256, direction: SwapDirection) -> Result<U256> {
        let quote = self.preview_swap(amount_in, direction)?;

        match direction {
            SwapDirection::BaseToQuote => {
                self.reserve_base = quote.new_reserve_in;
                self.reserve_quote = quote.new_reserve_out;
            }
            SwapDirection::QuoteToBase => {
                self.reserve_quote = quote.new_reserve_in;
                self.reserve_base = quote.new_reserve_out;
            }
        }

        debug!(
            "swap {:?}: in={} out={} reserves base={} quote={}",
            direction, amount_in, quote.amount_out, self.reserve_base, self.reserve_quote
        );

        Ok(quote.amount_out)
    }

    /// Spot price: p = reserve_quote / reserve_base (quote per base)
    pub fn spot_price(&self) -> Fraction {
        Fraction::from_biguint(to_biguint(self.reserve_quote), to_biguint(self.reserve_base))
            .unwrap_or_else(|_| Fraction::from_integer(U256::zero()))
    }

    /// Spot price in the requested quotation
    pub fn price(&self, quotation: Quotation) -> Fraction {
        match quotation {
            Quotation::QuotePerBase => self.spot_price(),
            Quotation::BasePerQuote => {
                Fraction::from_biguint(to_biguint(self.reserve_base), to_biguint(self.reserve_quote))
                    .unwrap_or_else(|_| Fraction::from_integer(U256::zero()))
            }
        }
    }

    /// Exact x·y
    pub fn invariant(&self) -> BigUint {
        to_biguint(self.reserve_base) * to_biguint(self.reserve_quote)
    }
}

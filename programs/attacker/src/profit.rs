//! Profitability calculator
//!
//! Pure over an [`AttackTrace`]. Holdings are valued in quote at the trace's
//! baseline price, so a run only shows profit if the attacker walks away with
//! more than it started with at the undisturbed price.

use crate::trace::AttackTrace;
use flashsim_common::{ether, signed_diff, to_bigint, to_biguint, SwapDirection, U256, BPS_SCALE};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    /// Flash loan premium (e.g., 9 = 0.09%)
    pub flash_loan_fee_bps: u16,

    /// Pool fee rate, reported only; swap outputs already net of it
    pub swap_fee_bps: u16,

    /// Gas, in quote units
    pub gas_cost_estimate: U256,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            flash_loan_fee_bps: 9,
            swap_fee_bps: 30,
            // 0.5 ETH
            gas_cost_estimate: ether(1) / U256::from(2u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfitBreakdown {
    pub gross: BigInt,
    pub flash_loan_fee: BigInt,
    pub gas_cost: BigInt,
    /// Quote-equivalent pool fees paid; not subtracted again
    pub swap_fees: BigInt,
    pub net: BigInt,
}

impl ProfitBreakdown {
    pub fn is_profitable(&self) -> bool {
        self.net > BigInt::zero()
    }

    /// Flash loan fee plus gas
    pub fn total_costs(&self) -> BigInt {
        &self.flash_loan_fee + &self.gas_cost
    }

    /// `net * 100 / total_costs`, truncated; None when the run cost nothing
    pub fn roi_pct(&self) -> Option<BigInt> {
        let costs = self.total_costs();
        if costs.is_zero() {
            return None;
        }
        Some(&self.net * BigInt::from(100) / costs)
    }
}

/// value(closing) - value(opening); zero for a run that never settled
pub fn gross_profit(trace: &AttackTrace) -> BigInt {
    match &trace.closing {
        Some(closing) => signed_diff(
            &closing.value_in_quote(&trace.baseline_price),
            &trace.opening.value_in_quote(&trace.baseline_price),
        ),
        None => BigInt::zero(),
    }
}

/// Pool fees across the trace's swaps, valued at the baseline price
fn swap_fees(trace: &AttackTrace, cost: &CostModel) -> BigUint {
    let fee_bps = BigUint::from(cost.swap_fee_bps);
    let scale = BigUint::from(BPS_SCALE);

    trace
        .events()
        .iter()
        .filter_map(|e| e.direction.map(|d| (d, e.amount_in)))
        .map(|(direction, amount_in)| {
            let fee = to_biguint(amount_in) * &fee_bps / &scale;
            match direction {
                SwapDirection::QuoteToBase => fee,
                SwapDirection::BaseToQuote => fee * trace.baseline_price.numer() / trace.baseline_price.denom(),
            }
        })
        .sum()
}

pub fn calculate_profit(trace: &AttackTrace, cost: &CostModel) -> ProfitBreakdown {
    let gross = gross_profit(trace);
    let flash_loan_fee = BigInt::from(
        to_biguint(trace.flash_loan) * BigUint::from(cost.flash_loan_fee_bps) / BigUint::from(BPS_SCALE),
    );
    let gas_cost = to_bigint(cost.gas_cost_estimate);
    let net = &gross - &flash_loan_fee - &gas_cost;

    ProfitBreakdown {
        gross,
        flash_loan_fee,
        gas_cost,
        swap_fees: BigInt::from(swap_fees(trace, cost)),
        net,
    }
}

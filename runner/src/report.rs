//! JSON line records
//!
//! Prices are rendered in the oracle quotation, amounts in whole tokens and
//! deviations in bps. Numbers go out as strings so nothing is lost to f64.

use flashsim_attacker::{
    AttackReport, AttackStats, GradualReport, ProfitBreakdown, RealisticAttackReport,
    ReentrancyReport, StepReading,
};
use flashsim_common::{to_biguint, Fraction, U256};
use num_bigint::{BigInt, BigUint, Sign};
use serde::Serialize;

fn amount(value: U256, decimals: u32) -> String {
    Fraction::from_biguint(to_biguint(value), BigUint::from(10u8).pow(decimals))
        .map(|f| f.to_decimal_string(decimals))
        .unwrap_or_else(|_| value.to_string())
}

fn signed_amount(value: &BigInt, decimals: u32) -> String {
    let magnitude = Fraction::from_biguint(
        value.magnitude().clone(),
        BigUint::from(10u8).pow(decimals),
    )
    .map(|f| f.to_decimal_string(decimals))
    .unwrap_or_else(|_| value.magnitude().to_string());

    match value.sign() {
        Sign::Minus => format!("-{}", magnitude),
        _ => magnitude,
    }
}

fn price(value: &Fraction) -> String {
    value.to_decimal_string(18)
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Attack {
        mode: &'static str,
        attack_amount: String,
        price_before: String,
        price_after: String,
        deviation_bps: String,
        estimated_profit: String,
        will_succeed: bool,
        failure: Option<String>,
    },
    Realistic {
        mode: &'static str,
        flash_loan: String,
        price_before: String,
        price_after: String,
        pct_increase: String,
        base_received: String,
        max_borrow_inflated: String,
        max_borrow_real: String,
        estimated_profit: String,
        will_succeed: bool,
        failure: Option<String>,
    },
    Gradual {
        baseline_price: String,
        readings: Vec<StepRecord>,
        rejected_at: Option<u32>,
        bypassed: bool,
        failure: Option<String>,
    },
    Reentrancy {
        reentrancy_guard: bool,
        borrow_limit: String,
        outer_borrow: String,
        nested_borrow: String,
        total_borrowed: String,
        nested_succeeded: bool,
        failure: Option<String>,
    },
    Profit {
        gross: String,
        flash_loan_fee: String,
        gas_cost: String,
        swap_fees: String,
        net: String,
        roi_pct: Option<String>,
        successful: bool,
    },
    Stats {
        flash_loan_used: String,
        base_received: String,
        collateral_deposited: String,
        quote_borrowed: String,
    },
}

#[derive(Debug, Serialize)]
pub struct StepRecord {
    step: u32,
    price: String,
    step_deviation_bps: String,
    cumulative_deviation_bps: String,
    accepted: bool,
}

impl From<&StepReading> for StepRecord {
    fn from(reading: &StepReading) -> Self {
        Self {
            step: reading.step,
            price: price(&reading.price),
            step_deviation_bps: reading.step_deviation_bps.to_string(),
            cumulative_deviation_bps: reading.cumulative_deviation_bps.to_string(),
            accepted: reading.accepted,
        }
    }
}

impl Record {
    pub fn attack(mode: &'static str, attack_amount: U256, report: &AttackReport, decimals: u32) -> Self {
        Record::Attack {
            mode,
            attack_amount: amount(attack_amount, decimals),
            price_before: price(&report.price_before),
            price_after: price(&report.price_after),
            deviation_bps: report.deviation_bps.to_string(),
            estimated_profit: signed_amount(&report.estimated_profit, decimals),
            will_succeed: report.will_succeed,
            failure: report.failure.as_ref().map(|e| e.to_string()),
        }
    }

    pub fn realistic(
        mode: &'static str,
        flash_loan: U256,
        report: &RealisticAttackReport,
        decimals: u32,
    ) -> Self {
        Record::Realistic {
            mode,
            flash_loan: amount(flash_loan, decimals),
            price_before: price(&report.price_before),
            price_after: price(&report.price_after),
            pct_increase: report.pct_increase.to_string(),
            base_received: amount(report.base_received, decimals),
            max_borrow_inflated: amount(report.max_borrow_inflated, decimals),
            max_borrow_real: amount(report.max_borrow_real, decimals),
            estimated_profit: signed_amount(&report.estimated_profit, decimals),
            will_succeed: report.will_succeed,
            failure: report.failure.as_ref().map(|e| e.to_string()),
        }
    }

    pub fn gradual(report: &GradualReport) -> Self {
        Record::Gradual {
            baseline_price: price(&report.baseline_price),
            readings: report.readings.iter().map(StepRecord::from).collect(),
            rejected_at: report.rejected_at,
            bypassed: report.bypassed,
            failure: report.failure.as_ref().map(|e| e.to_string()),
        }
    }

    pub fn reentrancy(reentrancy_guard: bool, report: &ReentrancyReport, decimals: u32) -> Self {
        Record::Reentrancy {
            reentrancy_guard,
            borrow_limit: amount(report.borrow_limit, decimals),
            outer_borrow: amount(report.outer_borrow, decimals),
            nested_borrow: amount(report.nested_borrow, decimals),
            total_borrowed: amount(report.total_borrowed, decimals),
            nested_succeeded: report.nested_succeeded,
            failure: report.failure.as_ref().map(|e| e.to_string()),
        }
    }

    pub fn profit(breakdown: &ProfitBreakdown, successful: bool, decimals: u32) -> Self {
        Record::Profit {
            gross: signed_amount(&breakdown.gross, decimals),
            flash_loan_fee: signed_amount(&breakdown.flash_loan_fee, decimals),
            gas_cost: signed_amount(&breakdown.gas_cost, decimals),
            swap_fees: signed_amount(&breakdown.swap_fees, decimals),
            net: signed_amount(&breakdown.net, decimals),
            roi_pct: breakdown.roi_pct().map(|roi| roi.to_string()),
            successful,
        }
    }

    pub fn stats(stats: &AttackStats, decimals: u32) -> Self {
        Record::Stats {
            flash_loan_used: amount(stats.flash_loan_used, decimals),
            base_received: amount(stats.base_received, decimals),
            collateral_deposited: amount(stats.collateral_deposited, decimals),
            quote_borrowed: amount(stats.quote_borrowed, decimals),
        }
    }
}

//! Attacker - strategy entry points and post-execution queries

use crate::market::LiveMarket;
use crate::profit::{calculate_profit, CostModel, ProfitBreakdown};
use crate::strategy::{
    execute_gradual, execute_leveraged, execute_reentrancy, simulate_gradual, simulate_leveraged,
    simulate_reentrancy, AttackReport, AttackRun, GradualPlan, GradualReport, LeveragedPlan,
    RealisticAttackReport, ReentrancyReport,
};
use crate::trace::AttackTrace;
use flashsim_common::{Result, SimError, SwapDirection, U256};
use log::{info, warn};

fn log_failure(context: &str, failure: &Option<SimError>) {
    match failure {
        Some(e) if e.is_borrow_rejection() => info!("{}: protocol rejected the borrow: {}", context, e),
        Some(e) => warn!("{}: run failed: {}", context, e),
        None => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackerConfig {
    /// Manipulation direction of the single-shot attack
    pub direction: SwapDirection,

    /// Share of the base received posted as collateral
    pub collateral_share_bps: u16,

    pub cost: CostModel,
}

impl Default for AttackerConfig {
    fn default() -> Self {
        Self {
            direction: SwapDirection::BaseToQuote,
            collateral_share_bps: 10_000,
            cost: CostModel::default(),
        }
    }
}

/// Totals of the last executed attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackStats {
    pub flash_loan_used: U256,
    pub base_received: U256,
    pub collateral_deposited: U256,
    pub quote_borrowed: U256,
}

#[derive(Debug, Clone)]
struct Execution {
    /// Settled trace; gradual and reentrancy runs have none
    trace: Option<AttackTrace>,
    stats: AttackStats,
    succeeded: bool,
}

pub struct Attacker {
    market: LiveMarket,
    config: AttackerConfig,
    last_execution: Option<Execution>,
}

impl Attacker {
    pub fn new(market: LiveMarket, config: AttackerConfig) -> Self {
        Self {
            market,
            config,
            last_execution: None,
        }
    }

    pub fn market(&self) -> &LiveMarket {
        &self.market
    }

    pub fn config(&self) -> &AttackerConfig {
        &self.config
    }

    fn single_shot_plan(&self, attack_amount: U256) -> LeveragedPlan {
        LeveragedPlan::single_shot(attack_amount, self.config.direction, self.config.collateral_share_bps)
    }

    fn realistic_plan(&self, flash_loan: U256) -> LeveragedPlan {
        LeveragedPlan::realistic(flash_loan, self.config.collateral_share_bps)
    }

    fn record(&mut self, run: &AttackRun, succeeded: bool) {
        self.last_execution = Some(Execution {
            stats: AttackStats {
                flash_loan_used: run.trace.flash_loan,
                base_received: run.trace.base_received(),
                collateral_deposited: run.trace.total_deposited(),
                quote_borrowed: run.trace.total_borrowed(),
            },
            trace: Some(run.trace.clone()),
            succeeded,
        });
    }

    pub fn simulate_attack(&self, attack_amount: U256) -> AttackReport {
        let (run, outcome) = simulate_leveraged(&self.market, &self.single_shot_plan(attack_amount));
        let report = AttackReport::from_run(&run, &outcome);
        log_failure("simulate_attack", &report.failure);
        info!(
            "simulate_attack {}: deviation {} bps, profit {}, will_succeed {}",
            attack_amount, report.deviation_bps, report.estimated_profit, report.will_succeed
        );
        report
    }

    pub fn execute_attack(&mut self, attack_amount: U256) -> Result<AttackReport> {
        let run = execute_leveraged(&self.market, &self.single_shot_plan(attack_amount)).map_err(|e| {
            warn!("execute_attack {} failed: {}", attack_amount, e);
            e
        })?;
        let report = AttackReport::from_run(&run, &Ok(()));
        self.record(&run, report.will_succeed);
        info!(
            "execute_attack {}: deviation {} bps, profit {}",
            attack_amount, report.deviation_bps, report.estimated_profit
        );
        Ok(report)
    }

    pub fn simulate_realistic_attack(&self, flash_loan: U256) -> RealisticAttackReport {
        let (run, outcome) = simulate_leveraged(&self.market, &self.realistic_plan(flash_loan));
        let report = RealisticAttackReport::from_run(&run, &outcome);
        log_failure("simulate_realistic_attack", &report.failure);
        info!(
            "simulate_realistic_attack {}: +{}%, profit {}, will_succeed {}",
            flash_loan, report.pct_increase, report.estimated_profit, report.will_succeed
        );
        report
    }

    pub fn execute_realistic_attack(&mut self, flash_loan: U256) -> Result<RealisticAttackReport> {
        let run = execute_leveraged(&self.market, &self.realistic_plan(flash_loan)).map_err(|e| {
            warn!("execute_realistic_attack {} failed: {}", flash_loan, e);
            e
        })?;
        let report = RealisticAttackReport::from_run(&run, &Ok(()));
        self.record(&run, report.will_succeed);
        info!(
            "execute_realistic_attack {}: +{}%, profit {}",
            flash_loan, report.pct_increase, report.estimated_profit
        );
        Ok(report)
    }

    /// Realistic simulation per flash loan amount
    pub fn sweep_realistic(&self, amounts: &[U256]) -> Vec<(U256, RealisticAttackReport)> {
        amounts
            .iter()
            .map(|&amount| (amount, self.simulate_realistic_attack(amount)))
            .collect()
    }

    pub fn simulate_gradual_manipulation(&self, plan: &GradualPlan) -> GradualReport {
        let report = simulate_gradual(&self.market, plan);
        log_failure("simulate_gradual_manipulation", &report.failure);
        info!(
            "simulate_gradual_manipulation {}x{}: rejected_at {:?}, bypassed {}",
            plan.steps, plan.step_amount, report.rejected_at, report.bypassed
        );
        report
    }

    pub fn execute_gradual_manipulation(&mut self, plan: &GradualPlan) -> Result<GradualReport> {
        let report = execute_gradual(&self.market, plan).map_err(|e| {
            warn!("execute_gradual_manipulation {}x{} failed: {}", plan.steps, plan.step_amount, e);
            e
        })?;
        self.last_execution = Some(Execution {
            trace: None,
            stats: AttackStats::default(),
            succeeded: report.bypassed,
        });
        info!(
            "execute_gradual_manipulation {}x{}: cumulative {} bps, bypassed {}",
            plan.steps,
            plan.step_amount,
            report.final_cumulative_deviation_bps(),
            report.bypassed
        );
        Ok(report)
    }

    pub fn simulate_reentrancy_attack(&self, collateral: U256) -> ReentrancyReport {
        let report = simulate_reentrancy(&self.market, collateral);
        info!(
            "simulate_reentrancy_attack {}: borrowed {} of {}",
            collateral, report.total_borrowed, report.borrow_limit
        );
        report
    }

    pub fn execute_reentrancy_attack(&mut self, collateral: U256) -> Result<ReentrancyReport> {
        let report = execute_reentrancy(&self.market, collateral).map_err(|e| {
            warn!("execute_reentrancy_attack {} failed: {}", collateral, e);
            e
        })?;
        self.last_execution = Some(Execution {
            trace: None,
            stats: AttackStats {
                collateral_deposited: collateral,
                quote_borrowed: report.total_borrowed,
                ..AttackStats::default()
            },
            succeeded: report.exploited(),
        });
        info!(
            "execute_reentrancy_attack {}: borrowed {} of {}, exploited {}",
            collateral,
            report.total_borrowed,
            report.borrow_limit,
            report.exploited()
        );
        Ok(report)
    }

    /// Whether the last executed attack worked: a gross profit for leveraged
    /// runs, a guard bypass for gradual runs, a double borrow for reentrancy
    pub fn was_attack_successful(&self) -> bool {
        self.last_execution.as_ref().is_some_and(|e| e.succeeded)
    }

    /// Net profit breakdown of the last executed attack
    ///
    /// None unless that attack was a leveraged run.
    pub fn calculate_profit(&self) -> Option<ProfitBreakdown> {
        self.last_execution
            .as_ref()
            .and_then(|e| e.trace.as_ref())
            .map(|trace| calculate_profit(trace, &self.config.cost))
    }

    pub fn get_attack_stats(&self) -> Option<AttackStats> {
        self.last_execution.as_ref().map(|e| e.stats)
    }
}

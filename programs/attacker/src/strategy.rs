//! Attack strategies over a [`Market`]
//!
//! Each `run_*` function is the single code path of a strategy. It fills its
//! record as it goes, so a run that fails halfway still reports how far it
//! got. `simulate_*` wrappers run on a snapshot and keep the error as a
//! verdict; `execute_*` wrappers run under the live lock and return it.

use crate::market::{LiveMarket, Market};
use crate::profit::gross_profit;
use crate::trace::{AttackPhase, AttackTrace, Holdings, TraceEvent};
use flashsim_common::{apply_bps, min_u256, mul_u256, sub_u256, Fraction, Result, SimError, SwapDirection, U256};
use flashsim_oracle::deviation_bps;
use log::debug;
use num_bigint::BigInt;
use num_traits::Zero;

/// Parameters of a leveraged run (manipulate, deposit, borrow, unwind)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeveragedPlan {
    /// Attacker's own balances before the run
    pub funding: Holdings,

    /// Quote borrowed from the flash lender for the run
    pub flash_loan: U256,

    /// Manipulation swap size
    pub amount_in: U256,

    pub direction: SwapDirection,

    /// Share of the base received that goes in as collateral
    pub collateral_share_bps: u16,
}

impl LeveragedPlan {
    /// Pre-funded with `attack_amount` of the direction's input asset
    ///
    /// Only base received can be posted, so a `BaseToQuote` dump deposits
    /// nothing and borrows nothing. The guarded read still decides the
    /// verdict but such a run never shows a profit.
    pub fn single_shot(attack_amount: U256, direction: SwapDirection, collateral_share_bps: u16) -> Self {
        Self {
            funding: Holdings::funding(direction, attack_amount),
            flash_loan: U256::zero(),
            amount_in: attack_amount,
            direction,
            collateral_share_bps,
        }
    }

    /// Flash-borrow quote and buy base with all of it
    pub fn realistic(flash_loan: U256, collateral_share_bps: u16) -> Self {
        Self {
            funding: Holdings::default(),
            flash_loan,
            amount_in: flash_loan,
            direction: SwapDirection::QuoteToBase,
            collateral_share_bps,
        }
    }
}

/// Progress of a leveraged run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackRun {
    pub trace: AttackTrace,
    pub holdings: Holdings,
    /// Unsafe oracle price before the manipulation
    pub price_before: Fraction,
    /// Unsafe oracle price after the manipulation
    pub price_after: Fraction,
    pub deviation_bps: U256,
    /// Change of the quote-per-base valuation, in whole percent
    pub pct_increase: BigInt,
    pub swap_output: U256,
    pub max_borrow_inflated: U256,
    pub max_borrow_real: U256,
}

impl AttackRun {
    pub fn new(market: &Market, plan: &LeveragedPlan) -> Self {
        let price_before = market.oracle.read_unsafe(&market.pool);
        Self {
            trace: AttackTrace::new(plan.funding, plan.flash_loan, market.pool.spot_price()),
            holdings: plan.funding,
            price_after: price_before.clone(),
            price_before,
            deviation_bps: U256::zero(),
            pct_increase: BigInt::zero(),
            swap_output: U256::zero(),
            max_borrow_inflated: U256::zero(),
            max_borrow_real: U256::zero(),
        }
    }

    pub fn phase(&self) -> AttackPhase {
        self.trace.phase()
    }
}

/// Swap out of `holdings`, leaving them untouched if any part fails
fn swap_holdings(market: &mut Market, holdings: &mut Holdings, amount: U256, direction: SwapDirection) -> Result<U256> {
    let mut next = *holdings;
    next.pay(direction, amount)?;
    let out = market.pool.swap(amount, direction)?;
    next.receive(direction, out)?;
    *holdings = next;
    Ok(out)
}

pub fn run_leveraged(market: &mut Market, plan: &LeveragedPlan, run: &mut AttackRun) -> Result<()> {
    // Flash loan
    run.holdings.credit_quote(plan.flash_loan)?;
    run.trace.opening = run.holdings;
    run.trace.record(TraceEvent {
        amount_in: plan.flash_loan,
        ..TraceEvent::new(AttackPhase::FlashBorrowed, run.price_before.clone())
    });
    debug!("run: flash borrowed {}", plan.flash_loan);

    // Manipulation
    let out = swap_holdings(market, &mut run.holdings, plan.amount_in, plan.direction)?;
    run.swap_output = out;
    run.price_after = market.oracle.read_unsafe(&market.pool);
    run.deviation_bps = deviation_bps(&run.price_after, &run.price_before)?;
    run.pct_increase = market.pool.spot_price().pct_change(&run.trace.baseline_price)?;
    run.trace.record(TraceEvent::swap(
        AttackPhase::Swapped,
        plan.direction,
        run.price_before.clone(),
        run.price_after.clone(),
        plan.amount_in,
        out,
    ));
    debug!(
        "run: swapped {} -> {}, price {} -> {} ({} bps)",
        plan.amount_in, out, run.price_before, run.price_after, run.deviation_bps
    );

    // Collateral
    let base_received = if plan.direction.receives_base() { out } else { U256::zero() };
    let deposit = apply_bps(base_received, plan.collateral_share_bps)?;
    if !deposit.is_zero() {
        let mut next = run.holdings;
        next.debit_base(deposit)?;
        market.bank.deposit(deposit)?;
        run.holdings = next;
    }
    run.trace.record(TraceEvent {
        collateral_deposited: deposit,
        ..TraceEvent::new(AttackPhase::Deposited, run.price_after.clone())
    });

    // Lever borrow at the guarded price
    run.max_borrow_inflated = market.bank.borrowable_at(&market.pool.spot_price())?;
    run.max_borrow_real = market.bank.borrowable_at(&run.trace.baseline_price)?;

    let Market { pool, oracle, bank } = &mut *market;
    let available = bank.max_borrowable(oracle, pool)?;
    let borrow = min_u256(available, bank.cash());
    if !borrow.is_zero() {
        bank.borrow(oracle, pool, borrow)?;
        run.holdings.credit_quote(borrow)?;
    }
    run.trace.record(TraceEvent {
        amount_borrowed: borrow,
        ..TraceEvent::new(AttackPhase::LeverBorrowed, run.price_after.clone())
    });
    debug!(
        "run: borrowed {} (guarded max {}, inflated {}, real {})",
        borrow, available, run.max_borrow_inflated, run.max_borrow_real
    );

    // Unwind whatever the manipulation paid out and was not posted
    let remaining = sub_u256(out, deposit)?;
    let price_before_unwind = market.oracle.read_unsafe(&market.pool);
    if remaining.is_zero() {
        run.trace.record(TraceEvent::new(AttackPhase::Unwound, price_before_unwind));
    } else {
        let direction = plan.direction.reverse();
        let back = swap_holdings(market, &mut run.holdings, remaining, direction)?;
        let price_after_unwind = market.oracle.read_unsafe(&market.pool);
        run.trace.record(TraceEvent::swap(
            AttackPhase::Unwound,
            direction,
            price_before_unwind,
            price_after_unwind,
            remaining,
            back,
        ));
        debug!("run: unwound {} -> {}", remaining, back);
    }

    // Settle
    run.trace.closing = Some(run.holdings);
    run.trace.record(TraceEvent::new(
        AttackPhase::Settled,
        market.oracle.read_unsafe(&market.pool),
    ));
    Ok(())
}

pub fn simulate_leveraged(live: &LiveMarket, plan: &LeveragedPlan) -> (AttackRun, Result<()>) {
    let mut market = live.snapshot();
    let mut run = AttackRun::new(&market, plan);
    let outcome = run_leveraged(&mut market, plan, &mut run);
    (run, outcome)
}

/// Completed steps stay applied to the live market when the run fails
pub fn execute_leveraged(live: &LiveMarket, plan: &LeveragedPlan) -> Result<AttackRun> {
    let mut market = live.lock();
    let mut run = AttackRun::new(&market, plan);
    run_leveraged(&mut market, plan, &mut run)?;
    Ok(run)
}

/// Realized profit of a run; a failed run realizes nothing
fn estimated_profit(run: &AttackRun, outcome: &Result<()>) -> BigInt {
    match outcome {
        Ok(()) => gross_profit(&run.trace),
        Err(_) => BigInt::zero(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    pub price_before: Fraction,
    pub price_after: Fraction,
    pub deviation_bps: U256,
    pub estimated_profit: BigInt,
    pub will_succeed: bool,
    pub failure: Option<SimError>,
}

impl AttackReport {
    pub fn from_run(run: &AttackRun, outcome: &Result<()>) -> Self {
        let estimated_profit = estimated_profit(run, outcome);
        Self {
            price_before: run.price_before.clone(),
            price_after: run.price_after.clone(),
            deviation_bps: run.deviation_bps,
            will_succeed: outcome.is_ok() && estimated_profit > BigInt::zero(),
            estimated_profit,
            failure: outcome.as_ref().err().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealisticAttackReport {
    pub price_before: Fraction,
    pub price_after: Fraction,
    pub pct_increase: BigInt,
    pub base_received: U256,
    /// Borrow limit at the manipulated price
    pub max_borrow_inflated: U256,
    /// Borrow limit at the pre-attack price
    pub max_borrow_real: U256,
    pub estimated_profit: BigInt,
    pub will_succeed: bool,
    pub failure: Option<SimError>,
}

impl RealisticAttackReport {
    pub fn from_run(run: &AttackRun, outcome: &Result<()>) -> Self {
        let estimated_profit = estimated_profit(run, outcome);
        Self {
            price_before: run.price_before.clone(),
            price_after: run.price_after.clone(),
            pct_increase: run.pct_increase.clone(),
            base_received: run.trace.base_received(),
            max_borrow_inflated: run.max_borrow_inflated,
            max_borrow_real: run.max_borrow_real,
            will_succeed: outcome.is_ok() && estimated_profit > BigInt::zero(),
            estimated_profit,
            failure: outcome.as_ref().err().cloned(),
        }
    }
}

/// Staged manipulation: `steps` swaps of `step_amount`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradualPlan {
    pub step_amount: U256,
    pub steps: u32,
    pub direction: SwapDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReading {
    pub step: u32,
    pub price: Fraction,
    /// Against the last accepted reading (what the guard checks)
    pub step_deviation_bps: U256,
    /// Against the pre-attack price
    pub cumulative_deviation_bps: U256,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradualReport {
    pub baseline_price: Fraction,
    pub readings: Vec<StepReading>,
    /// First step the guard rejected
    pub rejected_at: Option<u32>,
    /// Every step accepted, yet the total move exceeds the guard bound
    pub bypassed: bool,
    pub failure: Option<SimError>,
}

impl GradualReport {
    pub fn new(baseline_price: Fraction) -> Self {
        Self {
            baseline_price,
            readings: Vec::new(),
            rejected_at: None,
            bypassed: false,
            failure: None,
        }
    }

    pub fn final_cumulative_deviation_bps(&self) -> U256 {
        self.readings
            .last()
            .map(|r| r.cumulative_deviation_bps)
            .unwrap_or_default()
    }
}

pub fn run_gradual(market: &mut Market, plan: &GradualPlan, report: &mut GradualReport) -> Result<()> {
    if plan.steps == 0 {
        return Err(SimError::InvalidParameter("gradual attack needs at least one step"));
    }
    let mut holdings = Holdings::funding(
        plan.direction,
        mul_u256(plan.step_amount, U256::from(plan.steps))?,
    );

    for step in 1..=plan.steps {
        swap_holdings(market, &mut holdings, plan.step_amount, plan.direction)?;

        let price = market.oracle.read_unsafe(&market.pool);
        let step_deviation_bps = market.oracle.pending_deviation_bps(&market.pool)?.unwrap_or_default();
        let cumulative_deviation_bps = deviation_bps(&price, &report.baseline_price)?;
        let guarded = market.oracle.read_guarded(&market.pool);

        debug!(
            "gradual: step {} price {} step {} bps cumulative {} bps accepted {}",
            step,
            price,
            step_deviation_bps,
            cumulative_deviation_bps,
            guarded.is_ok()
        );
        report.readings.push(StepReading {
            step,
            price,
            step_deviation_bps,
            cumulative_deviation_bps,
            accepted: guarded.is_ok(),
        });

        if let Err(e) = guarded {
            report.rejected_at = Some(step);
            return Err(e);
        }
    }

    report.bypassed = report.final_cumulative_deviation_bps() > U256::from(market.oracle.max_deviation_bps());
    Ok(())
}

pub fn simulate_gradual(live: &LiveMarket, plan: &GradualPlan) -> GradualReport {
    let mut market = live.snapshot();
    let mut report = GradualReport::new(market.oracle.read_unsafe(&market.pool));
    if let Err(e) = run_gradual(&mut market, plan, &mut report) {
        report.failure = Some(e);
    }
    report
}

pub fn execute_gradual(live: &LiveMarket, plan: &GradualPlan) -> Result<GradualReport> {
    let mut market = live.lock();
    let mut report = GradualReport::new(market.oracle.read_unsafe(&market.pool));
    run_gradual(&mut market, plan, &mut report)?;
    Ok(report)
}

/// Nested borrow from inside the borrow callback
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReentrancyReport {
    /// Guarded borrow limit after the deposit
    pub borrow_limit: U256,
    pub outer_borrow: U256,
    pub nested_borrow: U256,
    pub total_borrowed: U256,
    pub nested_succeeded: bool,
    pub failure: Option<SimError>,
}

impl ReentrancyReport {
    /// Borrowed more than the collateral allows
    pub fn exploited(&self) -> bool {
        self.total_borrowed > self.borrow_limit
    }
}

pub fn run_reentrancy(market: &mut Market, collateral: U256, report: &mut ReentrancyReport) -> Result<()> {
    let Market { pool, oracle, bank } = &mut *market;

    bank.deposit(collateral)?;
    report.borrow_limit = bank.max_borrowable(oracle, pool)?;
    let outer = min_u256(report.borrow_limit, bank.cash());

    let mut nested: Option<Result<U256>> = None;
    bank.borrow_with_hook(oracle, pool, outer, |bank, oracle, pool| {
        let attempt = bank.max_borrowable(oracle, pool).and_then(|available| {
            let amount = min_u256(available, bank.cash());
            bank.borrow(oracle, pool, amount).map(|_| amount)
        });
        nested = Some(attempt);
        Ok(())
    })?;
    report.outer_borrow = outer;

    match nested {
        Some(Ok(amount)) => {
            report.nested_borrow = amount;
            report.nested_succeeded = true;
        }
        Some(Err(e)) => {
            debug!("reentrancy: nested borrow failed: {}", e);
            report.failure = Some(e);
        }
        None => {}
    }
    report.total_borrowed = report.outer_borrow.saturating_add(report.nested_borrow);
    Ok(())
}

pub fn simulate_reentrancy(live: &LiveMarket, collateral: U256) -> ReentrancyReport {
    let mut market = live.snapshot();
    let mut report = ReentrancyReport::default();
    if let Err(e) = run_reentrancy(&mut market, collateral, &mut report) {
        report.failure = Some(e);
    }
    report
}

pub fn execute_reentrancy(live: &LiveMarket, collateral: U256) -> Result<ReentrancyReport> {
    let mut market = live.lock();
    let mut report = ReentrancyReport::default();
    run_reentrancy(&mut market, collateral, &mut report)?;
    Ok(report)
}

//! Attack strategy engine
//!
//! Drives the pool, oracle and bank through flash-loan manipulation runs.
//! Every strategy has one code path shared by its `simulate_*` and
//! `execute_*` entry points: simulation runs it on a snapshot of the market
//! and turns failures into verdicts, execution runs it on the live market and
//! propagates them.

pub mod attacker;
pub mod market;
pub mod profit;
pub mod strategy;
pub mod trace;

pub use attacker::{AttackStats, Attacker, AttackerConfig};
pub use market::{LiveMarket, Market, MarketConfig};
pub use profit::{calculate_profit, gross_profit, CostModel, ProfitBreakdown};
pub use strategy::{
    AttackReport, AttackRun, GradualPlan, GradualReport, LeveragedPlan, RealisticAttackReport,
    ReentrancyReport, StepReading,
};
pub use trace::{AttackPhase, AttackTrace, Holdings, TraceEvent};

//! flashsim runner
//!
//! Runs the configured oracle-manipulation scenarios against a simulated
//! ALPHA/ETH market and prints one JSON record per result.
//!
//! ```text
//! flashsim            simulate every scenario
//! flashsim execute    simulate, then execute the configured flash loan
//! flashsim init PATH  write the default config
//! ```

mod config;
mod report;

use anyhow::{Context, Result};
use config::Config;
use flashsim_attacker::{Attacker, LiveMarket, MarketConfig};
use report::Record;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let command = args.next();

    if command.as_deref() == Some("init") {
        let path = args.next().unwrap_or_else(|| "flashsim.toml".to_string());
        return Config::write_default(&path);
    }

    log::info!("Starting flashsim");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default scenario", e);
        Config::default_scenario()
    });

    let market_config = config.market_config()?;
    let market = LiveMarket::from_config(&market_config).context("Failed to build market")?;
    let mut attacker = Attacker::new(market, config.attacker_config()?);

    log::info!(
        "Pool {} base / {} quote, guard {} bps",
        config.pool.reserve_base,
        config.pool.reserve_quote,
        config.oracle.max_deviation_bps
    );

    simulate_all(&config, &market_config, &attacker)?;

    if command.as_deref() == Some("execute") {
        execute(&config, &mut attacker)?;
    }

    Ok(())
}

fn emit(record: &Record) -> Result<()> {
    let line = serde_json::to_string(record).context("Failed to serialize record")?;
    println!("{}", line);
    Ok(())
}

fn simulate_all(config: &Config, market_config: &MarketConfig, attacker: &Attacker) -> Result<()> {
    let decimals = config.decimals;

    // Single shot
    let attack_amount = config
        .amount(&config.scenarios.attack_amount)
        .context("scenarios.attack_amount")?;
    let report = attacker.simulate_attack(attack_amount);
    emit(&Record::attack("simulate", attack_amount, &report, decimals))?;

    // Realistic sweep
    for (flash_loan, report) in attacker.sweep_realistic(&config.flash_loans()?) {
        emit(&Record::realistic("simulate", flash_loan, &report, decimals))?;
    }

    // Gradual
    let report = attacker.simulate_gradual_manipulation(&config.gradual_plan()?);
    emit(&Record::gradual(&report))?;

    // Reentrancy, with and without the guard, each on a fresh market
    let collateral = config
        .amount(&config.scenarios.reentrancy_collateral)
        .context("scenarios.reentrancy_collateral")?;
    for guard in [true, false] {
        let mut variant = *market_config;
        variant.bank.reentrancy_guard = guard;
        let market = LiveMarket::from_config(&variant).context("Failed to build market")?;
        let probe = Attacker::new(market, *attacker.config());
        let report = probe.simulate_reentrancy_attack(collateral);
        emit(&Record::reentrancy(guard, &report, decimals))?;
    }

    Ok(())
}

fn execute(config: &Config, attacker: &mut Attacker) -> Result<()> {
    let decimals = config.decimals;
    let flash_loan = config
        .amount(&config.scenarios.execute_flash_loan)
        .context("scenarios.execute_flash_loan")?;

    let report = attacker
        .execute_realistic_attack(flash_loan)
        .context(format!("Realistic attack with {} failed", config.scenarios.execute_flash_loan))?;
    emit(&Record::realistic("execute", flash_loan, &report, decimals))?;

    if let Some(breakdown) = attacker.calculate_profit() {
        emit(&Record::profit(&breakdown, attacker.was_attack_successful(), decimals))?;
    }
    if let Some(stats) = attacker.get_attack_stats() {
        emit(&Record::stats(&stats, decimals))?;
    }

    Ok(())
}

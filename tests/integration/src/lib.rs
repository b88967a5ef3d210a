//! flashsim integration tests
//!
//! Fixtures shared by the scenario and property suites: the ALPHA/ETH market
//! (10M ALPHA / 1000 ETH, 0.3% fee, 50% guard, 80% collateral factor, 500 ETH
//! of bank cash) and small amount helpers.

pub use flashsim_amm;
pub use flashsim_attacker;
pub use flashsim_bank;
pub use flashsim_common;
pub use flashsim_oracle;

use flashsim_attacker::{Attacker, AttackerConfig, LiveMarket, Market, MarketConfig};
use flashsim_common::{ether, U256};

/// Default ALPHA/ETH market
pub fn alpha_eth_market() -> Market {
    match Market::new(&MarketConfig::default()) {
        Ok(market) => market,
        Err(e) => panic!("default market must build: {}", e),
    }
}

/// Attacker on a fresh default market, optionally with the reentrancy guard off
pub fn attacker(reentrancy_guard: bool) -> Attacker {
    let mut config = MarketConfig::default();
    config.bank.reentrancy_guard = reentrancy_guard;
    match LiveMarket::from_config(&config) {
        Ok(live) => Attacker::new(live, AttackerConfig::default()),
        Err(e) => panic!("market must build: {}", e),
    }
}

/// Whole tokens plus a milli-token remainder, e.g. `tokens(0, 800)` = 0.8
pub fn tokens(whole: u64, milli: u64) -> U256 {
    ether(whole) + U256::from(milli) * U256::exp10(15)
}

/// Decimal base-unit literal
pub fn units(value: &str) -> U256 {
    match U256::from_dec_str(value) {
        Ok(v) => v,
        Err(e) => panic!("bad literal {}: {:?}", value, e),
    }
}

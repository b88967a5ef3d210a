//! Attack scenarios against the ALPHA/ETH market

use flashsim_attacker::{calculate_profit, AttackTrace, CostModel, GradualPlan, Holdings};
use flashsim_common::{ether, Fraction, SimError, SwapDirection, U256};
use flashsim_integration_tests::{alpha_eth_market, attacker, tokens, units};
use num_bigint::BigInt;

/// Scenario 1: one 50M ALPHA dump moves the price far past the guard
#[test]
fn test_single_shot_dump_rejected() {
    let attacker = attacker(true);
    let report = attacker.simulate_attack(ether(50_000_000));

    // 10k ALPHA per ETH before, ~359k after
    assert_eq!(report.price_before, Fraction::from_integer(U256::from(10_000u64)));
    assert!(report.price_after > Fraction::from_integer(U256::from(15_000u64)));
    assert_eq!(report.deviation_bps, U256::from(349_099u64));
    assert!(report.deviation_bps > U256::from(5_000u64));

    assert!(!report.will_succeed);
    assert!(matches!(
        report.failure,
        Some(SimError::DeviationExceeded { max_deviation_bps: 5_000, .. })
    ));
}

#[test]
fn test_single_shot_dump_execute_propagates() {
    let mut attacker = attacker(true);
    let err = attacker.execute_attack(ether(50_000_000)).unwrap_err();
    assert!(matches!(err, SimError::DeviationExceeded { .. }));

    // The dump itself landed; the oracle kept its last good price
    let market = attacker.market().snapshot();
    assert_eq!(market.pool.reserve_base(), ether(60_000_000));
    assert_eq!(
        market.oracle.last_observed_price(),
        Some(&Fraction::from_integer(U256::from(10_000u64)))
    );
    assert!(!attacker.was_attack_successful());
}

/// Scenario 2: five 10M ALPHA steps; the first already trips the guard
#[test]
fn test_gradual_large_steps_rejected_at_first_step() {
    let attacker = attacker(true);
    let plan = GradualPlan {
        step_amount: ether(10_000_000),
        steps: 5,
        direction: SwapDirection::BaseToQuote,
    };
    let report = attacker.simulate_gradual_manipulation(&plan);

    assert_eq!(report.rejected_at, Some(1));
    assert_eq!(report.readings.len(), 1);
    assert_eq!(report.readings[0].step_deviation_bps, U256::from(29_939u64));
    assert_eq!(report.readings[0].cumulative_deviation_bps, U256::from(29_939u64));
    assert!(!report.readings[0].accepted);
    assert!(!report.bypassed);
}

#[test]
fn test_gradual_small_steps_bypass_guard() {
    let mut attacker = attacker(true);
    let plan = GradualPlan {
        step_amount: ether(1_000_000),
        steps: 5,
        direction: SwapDirection::BaseToQuote,
    };
    let report = attacker.execute_gradual_manipulation(&plan).unwrap();

    // Every step passes on its own
    for reading in &report.readings {
        assert!(reading.accepted);
        assert!(reading.step_deviation_bps <= U256::from(5_000u64));
    }
    // But the total move is ~125%
    assert_eq!(report.final_cumulative_deviation_bps(), U256::from(12_473u64));
    assert!(report.bypassed);
    assert!(attacker.was_attack_successful());
    assert!(attacker.calculate_profit().is_none());
    assert_eq!(attacker.get_attack_stats(), Some(Default::default()));

    // The oracle now trusts the manipulated price
    let market = attacker.market().snapshot();
    assert_eq!(
        market.oracle.last_observed_price(),
        Some(&report.readings[4].price)
    );
}

#[test]
fn test_gradual_execute_stops_at_rejection() {
    let mut attacker = attacker(true);
    let plan = GradualPlan {
        step_amount: ether(10_000_000),
        steps: 5,
        direction: SwapDirection::BaseToQuote,
    };
    let err = attacker.execute_gradual_manipulation(&plan).unwrap_err();
    assert!(matches!(err, SimError::DeviationExceeded { .. }));

    // Only the first step's swap landed
    assert_eq!(attacker.market().snapshot().pool.reserve_base(), ether(20_000_000));
}

/// Scenario 3: nested borrow from the borrow callback
#[test]
fn test_reentrancy_without_guard_double_borrows() {
    let attacker = attacker(false);
    let report = attacker.simulate_reentrancy_attack(ether(10_000));

    assert!(report.nested_succeeded);
    assert_eq!(report.borrow_limit, tokens(0, 800));
    assert_eq!(report.outer_borrow, tokens(0, 800));
    assert_eq!(report.nested_borrow, tokens(0, 800));
    assert_eq!(report.total_borrowed, tokens(1, 600));
    assert!(report.exploited());
}

#[test]
fn test_reentrancy_with_guard_rejected() {
    let attacker = attacker(true);
    let report = attacker.simulate_reentrancy_attack(ether(10_000));

    assert!(!report.nested_succeeded);
    assert_eq!(report.failure, Some(SimError::ReentrantCall));
    assert_eq!(report.total_borrowed, tokens(0, 800));
    assert!(!report.exploited());
}

#[test]
fn test_reentrancy_directly_on_bank() {
    let mut market = alpha_eth_market();
    market.bank.deposit(ether(10_000)).unwrap();

    let pool = market.pool.clone();
    let result = market.bank.borrow_with_hook(
        &mut market.oracle,
        &pool,
        tokens(0, 800),
        |bank, oracle, pool| bank.borrow(oracle, pool, tokens(0, 800)),
    );
    assert_eq!(result, Err(SimError::ReentrantCall));
    assert_eq!(market.bank.position().borrowed_amount, U256::zero());

    market.bank.set_reentrancy_guard(false);
    market
        .bank
        .borrow_with_hook(&mut market.oracle, &pool, tokens(0, 800), |bank, oracle, pool| {
            bank.borrow(oracle, pool, tokens(0, 800))
        })
        .unwrap();
    assert_eq!(market.bank.position().borrowed_amount, tokens(1, 600));
}

#[test]
fn test_reentrancy_execute_without_guard_succeeds() {
    let mut attacker = attacker(false);
    let report = attacker.execute_reentrancy_attack(ether(10_000)).unwrap();

    assert!(report.nested_succeeded);
    assert!(report.exploited());
    assert!(attacker.was_attack_successful());

    let stats = attacker.get_attack_stats().unwrap();
    assert_eq!(stats.collateral_deposited, ether(10_000));
    assert_eq!(stats.quote_borrowed, tokens(1, 600));
    assert_eq!(attacker.market().snapshot().bank.position().borrowed_amount, tokens(1, 600));
}

#[test]
fn test_reentrancy_execute_with_guard_fails() {
    let mut attacker = attacker(true);
    let report = attacker.execute_reentrancy_attack(ether(10_000)).unwrap();

    assert_eq!(report.failure, Some(SimError::ReentrantCall));
    assert!(!report.exploited());
    assert!(!attacker.was_attack_successful());
    assert_eq!(attacker.get_attack_stats().unwrap().quote_borrowed, tokens(0, 800));
}

/// Scenario 4: gross profit below fee + gas nets out negative
#[test]
fn test_costs_exceed_thin_profit() {
    let baseline = Fraction::new(U256::one(), U256::from(10_000u64)).unwrap();
    let mut trace = AttackTrace::new(Holdings::new(U256::zero(), ether(100)), ether(100), baseline);
    // +0.5 ETH gross; costs are 0.09 + 0.5
    trace.closing = Some(Holdings::new(U256::zero(), tokens(100, 500)));

    let cost = CostModel {
        flash_loan_fee_bps: 9,
        swap_fee_bps: 30,
        gas_cost_estimate: tokens(0, 500),
    };
    let breakdown = calculate_profit(&trace, &cost);

    assert_eq!(breakdown.gross, BigInt::from(500_000_000_000_000_000u64));
    assert_eq!(breakdown.flash_loan_fee, BigInt::from(90_000_000_000_000_000u64));
    assert!(breakdown.net <= BigInt::from(0));
    assert_eq!(breakdown.net, BigInt::from(-90_000_000_000_000_000i64));
}

#[test]
fn test_realistic_attack_passes_guard() {
    let attacker = attacker(true);
    let report = attacker.simulate_realistic_attack(ether(300));

    assert!(report.will_succeed);
    assert_eq!(report.failure, None);
    assert_eq!(report.base_received, units("2302363174505426833961973"));
    assert_eq!(report.pct_increase, BigInt::from(68));
    assert_eq!(report.max_borrow_inflated, units("311063999999999999999"));
    assert_eq!(report.max_borrow_real, units("184189053960434146716"));
    assert!(report.max_borrow_inflated > report.max_borrow_real);
    assert_eq!(report.estimated_profit, BigInt::from(11_063_999_999_999_999_999u128));
}

#[test]
fn test_realistic_execute_nets_profit() {
    let mut attacker = attacker(true);
    attacker.execute_realistic_attack(ether(300)).unwrap();
    assert!(attacker.was_attack_successful());

    // 11.064 - 0.27 - 0.5
    let profit = attacker.calculate_profit().unwrap();
    assert_eq!(profit.flash_loan_fee, BigInt::from(270_000_000_000_000_000u64));
    assert_eq!(profit.net, BigInt::from(10_293_999_999_999_999_999u128));

    let stats = attacker.get_attack_stats().unwrap();
    assert_eq!(stats.flash_loan_used, ether(300));
    assert_eq!(stats.collateral_deposited, units("2302363174505426833961973"));
    assert_eq!(stats.quote_borrowed, units("311063999999999999999"));

    let market = attacker.market().snapshot();
    assert_eq!(market.bank.cash(), ether(500) - stats.quote_borrowed);
}

/// Every one of these flash loans moves the price more than 50%
#[test]
fn test_large_flash_loans_rejected() {
    let attacker = attacker(true);
    let amounts = [ether(500), ether(1_000), ether(2_000), ether(5_000)];

    for (amount, report) in attacker.sweep_realistic(&amounts) {
        assert!(!report.will_succeed, "{} should be rejected", amount);
        assert!(matches!(report.failure, Some(SimError::DeviationExceeded { .. })));
        // Unsafe valuation still shows the inflated limit
        assert!(report.max_borrow_inflated > report.max_borrow_real);
    }
}

#[test]
fn test_sweep_finds_guard_edge() {
    let attacker = attacker(true);
    let amounts = [ether(100), ether(250), ether(300), ether(400), ether(414), ether(420)];
    let verdicts: Vec<bool> = attacker
        .sweep_realistic(&amounts)
        .iter()
        .map(|(_, r)| r.will_succeed)
        .collect();

    // Too small to cover the flash loan, then profitable, then past the guard
    assert_eq!(verdicts, vec![false, false, true, true, true, false]);
}

#[test]
fn test_simulate_execute_parity() {
    let mut attacker = attacker(true);

    let simulated = attacker.simulate_attack(ether(1_000_000));
    let executed = attacker.execute_attack(ether(1_000_000)).unwrap();
    assert_eq!(simulated, executed);

    // Fresh attacker for the realistic path (the oracle moved above)
    let mut attacker = flashsim_integration_tests::attacker(true);
    let simulated = attacker.simulate_realistic_attack(ether(400));
    let executed = attacker.execute_realistic_attack(ether(400)).unwrap();
    assert_eq!(simulated, executed);
}

#[test]
fn test_simulation_has_no_side_effects() {
    let attacker = attacker(true);
    let before = attacker.market().snapshot();

    attacker.simulate_attack(ether(50_000_000));
    attacker.simulate_realistic_attack(ether(300));
    attacker.simulate_gradual_manipulation(&GradualPlan {
        step_amount: ether(1_000_000),
        steps: 5,
        direction: SwapDirection::BaseToQuote,
    });
    attacker.simulate_reentrancy_attack(ether(10_000));

    assert_eq!(attacker.market().snapshot(), before);
    assert!(attacker.get_attack_stats().is_none());
}

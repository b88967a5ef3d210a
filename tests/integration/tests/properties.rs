//! Property tests for the pool, oracle and bank models

use flashsim_amm::{quote_exact_in, quote_exact_in_no_fee, PoolState};
use flashsim_bank::{Bank, BankConfig};
use flashsim_common::{ether, Fraction, SwapDirection, U256};
use flashsim_oracle::{within_deviation, OracleConfig, OracleState};
use proptest::prelude::*;

fn pool(base: u64, quote: u64) -> PoolState {
    PoolState::new(ether(base), ether(quote), 30).unwrap()
}

proptest! {
    #[test]
    fn prop_fee_reduces_output(
        reserve_in in 1_000u64..100_000_000,
        reserve_out in 1_000u64..100_000_000,
        amount_bps in 1u64..9_999,
    ) {
        let r_in = ether(reserve_in);
        let amount = r_in * U256::from(amount_bps) / U256::from(10_000u64);

        let with_fee = quote_exact_in(r_in, ether(reserve_out), 30, amount).unwrap();
        let no_fee = quote_exact_in_no_fee(r_in, ether(reserve_out), amount).unwrap();
        prop_assert!(with_fee.amount_out < no_fee);
    }

    #[test]
    fn prop_invariant_never_decreases(
        base in 1_000u64..100_000_000,
        quote in 1_000u64..100_000_000,
        amount_bps in 1u64..20_000,
        base_to_quote in any::<bool>(),
    ) {
        let mut pool = pool(base, quote);
        let direction = if base_to_quote { SwapDirection::BaseToQuote } else { SwapDirection::QuoteToBase };
        let (reserve_in, _) = pool.reserves(direction);
        let amount = reserve_in * U256::from(amount_bps) / U256::from(10_000u64);

        let k0 = pool.invariant();
        pool.swap(amount, direction).unwrap();
        prop_assert!(pool.invariant() >= k0);
    }

    #[test]
    fn prop_round_trip_erodes(
        base in 1_000u64..100_000_000,
        quote in 1_000u64..100_000_000,
        amount_bps in 1u64..9_999,
    ) {
        let mut pool = pool(base, quote);
        let amount = ether(base) * U256::from(amount_bps) / U256::from(10_000u64);

        let quote_out = pool.swap(amount, SwapDirection::BaseToQuote).unwrap();
        let base_back = pool.swap(quote_out, SwapDirection::QuoteToBase).unwrap();
        prop_assert!(base_back < amount);
    }

    #[test]
    fn prop_guard_accepts_iff_within_bound(
        dump_millions in 1u64..40,
        max_deviation_bps in 1u16..10_000,
    ) {
        let mut pool = pool(10_000_000, 1_000);
        let config = OracleConfig { max_deviation_bps, ..OracleConfig::default() };
        let mut oracle = OracleState::seeded(config, &pool).unwrap();
        let reference = oracle.last_observed_price().cloned().unwrap();

        pool.swap(ether(dump_millions * 1_000_000), SwapDirection::BaseToQuote).unwrap();
        let current = oracle.read_unsafe(&pool);
        let deviation = current.deviation_bps(&reference).unwrap();

        let accepted = oracle.read_guarded(&pool).is_ok();
        prop_assert_eq!(accepted, deviation <= U256::from(max_deviation_bps));
        prop_assert_eq!(accepted, within_deviation(&current, &reference, max_deviation_bps).unwrap());
    }

    #[test]
    fn prop_read_unsafe_idempotent(
        base in 1_000u64..100_000_000,
        quote in 1_000u64..100_000_000,
    ) {
        let pool = pool(base, quote);
        let oracle = OracleState::seeded(OracleConfig::default(), &pool).unwrap();
        let before = oracle.clone();

        prop_assert_eq!(oracle.read_unsafe(&pool), oracle.read_unsafe(&pool));
        prop_assert_eq!(oracle, before);
    }

    #[test]
    fn prop_borrowable_monotone_in_collateral(
        first in 1u64..1_000_000,
        extra in 0u64..1_000_000,
        debt_milli in 0u64..1_000,
    ) {
        let price = Fraction::new(U256::one(), U256::from(10_000u64)).unwrap();
        let mut small = Bank::new(BankConfig::default()).unwrap();
        small.deposit(ether(first)).unwrap();
        let mut large = small.clone();
        if extra > 0 {
            large.deposit(ether(extra)).unwrap();
        }

        let pool = pool(10_000_000, 1_000);
        let mut oracle = OracleState::seeded(OracleConfig::default(), &pool).unwrap();
        let debt = U256::from(debt_milli) * U256::exp10(15);
        let limit = small.max_borrowable(&mut oracle, &pool).unwrap();
        if !debt.is_zero() && debt <= limit {
            small.borrow(&mut oracle, &pool, debt).unwrap();
            large.borrow(&mut oracle, &pool, debt).unwrap();
        }

        prop_assert!(large.borrowable_at(&price).unwrap() >= small.borrowable_at(&price).unwrap());
    }

    #[test]
    fn prop_borrowable_monotone_in_price(
        collateral in 1u64..10_000_000,
        lower in 1u64..1_000_000,
        step in 0u64..1_000_000,
    ) {
        let mut bank = Bank::new(BankConfig::default()).unwrap();
        bank.deposit(ether(collateral)).unwrap();

        let low = Fraction::new(U256::from(lower), U256::from(10_000_000_000u64)).unwrap();
        let high = Fraction::new(U256::from(lower + step), U256::from(10_000_000_000u64)).unwrap();
        prop_assert!(bank.borrowable_at(&high).unwrap() >= bank.borrowable_at(&low).unwrap());
    }
}

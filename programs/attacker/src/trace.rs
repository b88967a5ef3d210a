//! Attack trace records

use flashsim_common::{add_u256, sub_u256, to_biguint, Fraction, Result, SimError, SwapDirection, U256};
use num_bigint::BigUint;

/// Run state machine; a run ends on `Settled` or at its first failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttackPhase {
    #[default]
    Idle,
    FlashBorrowed,
    Swapped,
    Deposited,
    LeverBorrowed,
    Unwound,
    Settled,
}

/// Attacker balances outside the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Holdings {
    pub base: U256,
    pub quote: U256,
}

impl Holdings {
    pub fn new(base: U256, quote: U256) -> Self {
        Self { base, quote }
    }

    /// Funding for a swap in `direction`
    pub fn funding(direction: SwapDirection, amount: U256) -> Self {
        match direction {
            SwapDirection::BaseToQuote => Self::new(amount, U256::zero()),
            SwapDirection::QuoteToBase => Self::new(U256::zero(), amount),
        }
    }

    pub fn credit_base(&mut self, amount: U256) -> Result<()> {
        self.base = add_u256(self.base, amount)?;
        Ok(())
    }

    pub fn credit_quote(&mut self, amount: U256) -> Result<()> {
        self.quote = add_u256(self.quote, amount)?;
        Ok(())
    }

    pub fn debit_base(&mut self, amount: U256) -> Result<()> {
        self.base = debit(self.base, amount)?;
        Ok(())
    }

    pub fn debit_quote(&mut self, amount: U256) -> Result<()> {
        self.quote = debit(self.quote, amount)?;
        Ok(())
    }

    /// Pay the input side of a swap
    pub fn pay(&mut self, direction: SwapDirection, amount: U256) -> Result<()> {
        match direction {
            SwapDirection::BaseToQuote => self.debit_base(amount),
            SwapDirection::QuoteToBase => self.debit_quote(amount),
        }
    }

    /// Receive the output side of a swap
    pub fn receive(&mut self, direction: SwapDirection, amount: U256) -> Result<()> {
        match direction {
            SwapDirection::BaseToQuote => self.credit_quote(amount),
            SwapDirection::QuoteToBase => self.credit_base(amount),
        }
    }

    /// quote + floor(base * price_qpb)
    pub fn value_in_quote(&self, price_qpb: &Fraction) -> BigUint {
        to_biguint(self.quote) + price_qpb.mul_floor(self.base)
    }
}

fn debit(balance: U256, amount: U256) -> Result<U256> {
    if amount > balance {
        return Err(SimError::InsufficientFunds {
            requested: amount,
            available: balance,
        });
    }
    sub_u256(balance, amount)
}

/// One completed step of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub step: AttackPhase,
    /// Unsafe oracle price before the step
    pub price_before: Fraction,
    /// Unsafe oracle price after the step
    pub price_after: Fraction,
    pub amount_in: U256,
    pub amount_out: U256,
    pub collateral_deposited: U256,
    pub amount_borrowed: U256,
    /// Set for swap steps
    pub direction: Option<SwapDirection>,
}

impl TraceEvent {
    pub fn new(step: AttackPhase, price: Fraction) -> Self {
        Self {
            step,
            price_before: price.clone(),
            price_after: price,
            amount_in: U256::zero(),
            amount_out: U256::zero(),
            collateral_deposited: U256::zero(),
            amount_borrowed: U256::zero(),
            direction: None,
        }
    }

    pub fn swap(
        step: AttackPhase,
        direction: SwapDirection,
        price_before: Fraction,
        price_after: Fraction,
        amount_in: U256,
        amount_out: U256,
    ) -> Self {
        Self {
            price_before,
            price_after,
            amount_in,
            amount_out,
            direction: Some(direction),
            ..Self::new(step, Fraction::from_integer(U256::zero()))
        }
    }
}

/// Append-only record of a run, input to the profit calculator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackTrace {
    events: Vec<TraceEvent>,

    /// Holdings once funded and flash-borrowed
    pub opening: Holdings,

    /// Holdings at settlement (None until settled)
    pub closing: Option<Holdings>,

    /// Flash-loaned quote principal
    pub flash_loan: U256,

    /// Pre-attack quote per base, used to value holdings
    pub baseline_price: Fraction,
}

impl AttackTrace {
    pub fn new(opening: Holdings, flash_loan: U256, baseline_price: Fraction) -> Self {
        Self {
            events: Vec::new(),
            opening,
            closing: None,
            flash_loan,
            baseline_price,
        }
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Last completed phase
    pub fn phase(&self) -> AttackPhase {
        self.events.last().map(|e| e.step).unwrap_or_default()
    }

    pub fn is_settled(&self) -> bool {
        self.closing.is_some()
    }

    pub fn total_deposited(&self) -> U256 {
        self.events
            .iter()
            .fold(U256::zero(), |acc, e| acc.saturating_add(e.collateral_deposited))
    }

    pub fn total_borrowed(&self) -> U256 {
        self.events
            .iter()
            .fold(U256::zero(), |acc, e| acc.saturating_add(e.amount_borrowed))
    }

    /// Base paid out to the attacker by the manipulation swap
    pub fn base_received(&self) -> U256 {
        self.events
            .iter()
            .find(|e| e.step == AttackPhase::Swapped && e.direction == Some(SwapDirection::QuoteToBase))
            .map(|e| e.amount_out)
            .unwrap_or_default()
    }
}

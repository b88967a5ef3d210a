//! Direction and quotation conventions for the base/quote pair

use crate::error::Result;
use crate::fraction::Fraction;

/// Which reserve a swap pays into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapDirection {
    /// Pay base, receive quote
    BaseToQuote,
    /// Pay quote, receive base
    QuoteToBase,
}

impl SwapDirection {
    pub fn reverse(self) -> Self {
        match self {
            SwapDirection::BaseToQuote => SwapDirection::QuoteToBase,
            SwapDirection::QuoteToBase => SwapDirection::BaseToQuote,
        }
    }

    /// True when the swap output is the base asset
    pub fn receives_base(self) -> bool {
        matches!(self, SwapDirection::QuoteToBase)
    }
}

/// Unit a price is expressed in
///
/// `BasePerQuote` is how the lending oracle reports (e.g. ALPHA per ETH); a
/// dump of base into the pool raises it. `QuotePerBase` is the collateral
/// valuation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quotation {
    #[default]
    BasePerQuote,
    QuotePerBase,
}

impl Quotation {
    /// Convert a price in this quotation to quote per base
    pub fn to_quote_per_base(self, price: &Fraction) -> Result<Fraction> {
        match self {
            Quotation::QuotePerBase => Ok(price.clone()),
            Quotation::BasePerQuote => price.recip(),
        }
    }

    /// Convert a quote-per-base price into this quotation
    pub fn from_quote_per_base(self, price: &Fraction) -> Result<Fraction> {
        // Both conversions are the same involution
        self.to_quote_per_base(price)
    }
}

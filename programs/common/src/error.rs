use primitive_types::U256;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Swap would drain or invert a reserve, or has no input
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Guarded oracle read moved further than the configured bound
    #[error("price deviation too high: {deviation_bps} bps > {max_deviation_bps} bps")]
    DeviationExceeded {
        deviation_bps: U256,
        max_deviation_bps: u16,
    },

    #[error("borrow of {requested} exceeds collateral limit of {available}")]
    ExceedsCollateralLimit { requested: U256, available: U256 },

    /// Nested borrow while one is in progress on the same position
    #[error("reentrant call")]
    ReentrantCall,

    #[error("bank cash {available} cannot fund borrow of {requested}")]
    InsufficientCash { requested: U256, available: U256 },

    #[error("attacker holds {available}, needs {requested}")]
    InsufficientFunds { requested: U256, available: U256 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}

impl SimError {
    /// Failures that make a borrow step fail its guard checks
    pub fn is_borrow_rejection(&self) -> bool {
        matches!(
            self,
            SimError::DeviationExceeded { .. } | SimError::ExceedsCollateralLimit { .. }
        )
    }
}

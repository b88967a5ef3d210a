//! Runner configuration

use anyhow::{bail, Context, Result};
use flashsim_attacker::{AttackerConfig, CostModel, GradualPlan, MarketConfig};
use flashsim_bank::BankConfig;
use flashsim_common::{Quotation, SwapDirection, U256};
use flashsim_oracle::OracleConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationSetting {
    BasePerQuote,
    QuotePerBase,
}

impl From<QuotationSetting> for Quotation {
    fn from(setting: QuotationSetting) -> Self {
        match setting {
            QuotationSetting::BasePerQuote => Quotation::BasePerQuote,
            QuotationSetting::QuotePerBase => Quotation::QuotePerBase,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionSetting {
    BaseToQuote,
    QuoteToBase,
}

impl From<DirectionSetting> for SwapDirection {
    fn from(setting: DirectionSetting) -> Self {
        match setting {
            DirectionSetting::BaseToQuote => SwapDirection::BaseToQuote,
            DirectionSetting::QuoteToBase => SwapDirection::QuoteToBase,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSection {
    /// Whole base tokens (e.g. ALPHA)
    pub reserve_base: String,
    /// Whole quote tokens (e.g. ETH)
    pub reserve_quote: String,
    pub fee_bps: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSection {
    pub max_deviation_bps: u16,
    pub quotation: QuotationSetting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSection {
    pub collateral_factor_bps: u16,
    /// Lendable quote, whole tokens
    pub cash: String,
    pub reentrancy_guard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerSection {
    pub direction: DirectionSetting,
    pub collateral_share_bps: u16,
    pub flash_loan_fee_bps: u16,
    pub swap_fee_bps: u16,
    /// Gas in quote, whole tokens
    pub gas_cost_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSection {
    /// Single-shot manipulation size
    pub attack_amount: String,
    /// Flash loan sizes for the realistic sweep
    pub flash_loans: Vec<String>,
    pub gradual_step_amount: String,
    pub gradual_steps: u32,
    pub gradual_direction: DirectionSetting,
    /// Collateral for the reentrancy run
    pub reentrancy_collateral: String,
    /// Flash loan used by `flashsim execute`
    pub execute_flash_loan: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Token decimals for every amount below
    pub decimals: u32,
    pub pool: PoolSection,
    pub oracle: OracleSection,
    pub bank: BankSection,
    pub attacker: AttackerSection,
    pub scenarios: ScenarioSection,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("FLASHSIM_CONFIG").unwrap_or_else(|_| "flashsim.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(path);
        let config_str = std::fs::read_to_string(expanded_path.as_ref())
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&config_str).context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// ALPHA/ETH scenario: 10M / 1000 pool, 50% guard, 80% collateral factor
    pub fn default_scenario() -> Self {
        Self {
            decimals: 18,
            pool: PoolSection {
                reserve_base: "10000000".to_string(),
                reserve_quote: "1000".to_string(),
                fee_bps: 30,
            },
            oracle: OracleSection {
                max_deviation_bps: 5_000,
                quotation: QuotationSetting::BasePerQuote,
            },
            bank: BankSection {
                collateral_factor_bps: 8_000,
                cash: "500".to_string(),
                reentrancy_guard: true,
            },
            attacker: AttackerSection {
                direction: DirectionSetting::BaseToQuote,
                collateral_share_bps: 10_000,
                flash_loan_fee_bps: 9,
                swap_fee_bps: 30,
                gas_cost_estimate: "0.5".to_string(),
            },
            scenarios: ScenarioSection {
                attack_amount: "50000000".to_string(),
                flash_loans: ["300", "500", "1000", "2000", "5000"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                gradual_step_amount: "10000000".to_string(),
                gradual_steps: 5,
                gradual_direction: DirectionSetting::BaseToQuote,
                reentrancy_collateral: "10000".to_string(),
                execute_flash_loan: "300".to_string(),
            },
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_scenario();
        let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;

        let expanded_path = shellexpand::tilde(path);
        std::fs::write(expanded_path.as_ref(), toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }

    pub fn amount(&self, value: &str) -> Result<U256> {
        parse_amount(value, self.decimals)
    }

    pub fn market_config(&self) -> Result<MarketConfig> {
        Ok(MarketConfig {
            reserve_base: self.amount(&self.pool.reserve_base).context("pool.reserve_base")?,
            reserve_quote: self.amount(&self.pool.reserve_quote).context("pool.reserve_quote")?,
            fee_bps: self.pool.fee_bps,
            oracle: OracleConfig {
                max_deviation_bps: self.oracle.max_deviation_bps,
                quotation: self.oracle.quotation.into(),
            },
            bank: BankConfig {
                collateral_factor_bps: self.bank.collateral_factor_bps,
                cash: self.amount(&self.bank.cash).context("bank.cash")?,
                reentrancy_guard: self.bank.reentrancy_guard,
            },
        })
    }

    pub fn attacker_config(&self) -> Result<AttackerConfig> {
        Ok(AttackerConfig {
            direction: self.attacker.direction.into(),
            collateral_share_bps: self.attacker.collateral_share_bps,
            cost: CostModel {
                flash_loan_fee_bps: self.attacker.flash_loan_fee_bps,
                swap_fee_bps: self.attacker.swap_fee_bps,
                gas_cost_estimate: self
                    .amount(&self.attacker.gas_cost_estimate)
                    .context("attacker.gas_cost_estimate")?,
            },
        })
    }

    pub fn gradual_plan(&self) -> Result<GradualPlan> {
        Ok(GradualPlan {
            step_amount: self
                .amount(&self.scenarios.gradual_step_amount)
                .context("scenarios.gradual_step_amount")?,
            steps: self.scenarios.gradual_steps,
            direction: self.scenarios.gradual_direction.into(),
        })
    }

    pub fn flash_loans(&self) -> Result<Vec<U256>> {
        self.scenarios
            .flash_loans
            .iter()
            .map(|s| self.amount(s).context(format!("scenarios.flash_loans: {}", s)))
            .collect()
    }
}

/// Whole-token decimal string to base units, e.g. "0.5" at 18 decimals
pub fn parse_amount(value: &str, decimals: u32) -> Result<U256> {
    let value = value.trim().replace('_', "");
    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value.as_str(), ""),
    };
    if whole.is_empty() && frac.is_empty() {
        bail!("empty amount");
    }
    if frac.len() > decimals as usize {
        bail!("{} has more than {} decimals", value, decimals);
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        bail!("{} is not a decimal amount", value);
    }

    let digits = format!("{}{:0<width$}", whole, frac, width = decimals as usize);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|e| anyhow::anyhow!("{}: {:?}", value, e))
}

//! Risk configuration.
//!
//! A flat struct of named numeric limits. Every field has a conservative
//! default so zero-config use is valid; `RiskConfig::default()` is a
//! complete, working configuration. All percentages are fractions
//! (0.05 = 5%).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

/// Risk parameters for sizing, constraints and halts.
///
/// Constructed once per invocation and passed by reference through the
/// pipeline; no global default state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Max position size as fraction of equity (0.05 = 5%).
    pub max_position_pct: Decimal,
    /// Maximum number of concurrent positions.
    pub max_positions: usize,
    /// Minimum order notional value; smaller orders are dropped.
    pub min_position_value: Decimal,
    /// Max exposure to any single sector (0.30 = 30%).
    pub max_sector_pct: Decimal,
    /// Max gross exposure / equity ratio.
    pub max_gross_leverage: Decimal,
    /// Max net exposure / equity ratio.
    pub max_net_leverage: Decimal,
    /// Max pairwise correlation between held/ordered symbols.
    pub max_correlation: Option<Decimal>,
    /// Fraction of equity to risk per trade (0.01 = 1%).
    pub risk_per_trade: Decimal,
    /// Fractional Kelly multiplier (0.25 = quarter Kelly).
    pub kelly_fraction: Decimal,
    /// Stop-loss distance in ATR multiples.
    pub stop_loss_atr_mult: Decimal,
    /// Take-profit distance in ATR multiples; `None` disables targets.
    pub take_profit_atr_mult: Option<Decimal>,
    /// Halt new exposure at this drawdown from the high-water mark.
    pub max_drawdown_halt: Decimal,
    /// Halt new exposure at this loss from day-start equity.
    pub max_daily_loss_halt: Option<Decimal>,
    /// Whether sells may open or extend short positions.
    pub allow_shorts: bool,
    /// Commission assumption as a fraction of notional, used when
    /// checking buying power.
    pub commission_pct: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_pct: dec!(0.05),
            max_positions: 50,
            min_position_value: dec!(100),
            max_sector_pct: dec!(0.30),
            max_gross_leverage: dec!(1.0),
            max_net_leverage: dec!(1.0),
            max_correlation: None,
            risk_per_trade: dec!(0.01),
            kelly_fraction: dec!(0.25),
            stop_loss_atr_mult: dec!(2.0),
            take_profit_atr_mult: None,
            max_drawdown_halt: dec!(0.15),
            max_daily_loss_halt: None,
            allow_shorts: true,
            commission_pct: Decimal::ZERO,
        }
    }
}

impl RiskConfig {
    /// Validate every field against its domain.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfiguration`] naming the first
    /// out-of-domain field.
    pub fn validate(&self) -> Result<()> {
        Self::check_fraction("max_position_pct", self.max_position_pct)?;
        if self.max_positions == 0 {
            return Err(invalid("max_positions", "must be greater than zero"));
        }
        if self.min_position_value < Decimal::ZERO {
            return Err(invalid("min_position_value", "must be non-negative"));
        }
        Self::check_fraction("max_sector_pct", self.max_sector_pct)?;
        Self::check_positive("max_gross_leverage", self.max_gross_leverage)?;
        Self::check_positive("max_net_leverage", self.max_net_leverage)?;
        if let Some(corr) = self.max_correlation {
            Self::check_fraction("max_correlation", corr)?;
        }
        Self::check_fraction("risk_per_trade", self.risk_per_trade)?;
        Self::check_fraction("kelly_fraction", self.kelly_fraction)?;
        Self::check_positive("stop_loss_atr_mult", self.stop_loss_atr_mult)?;
        if let Some(mult) = self.take_profit_atr_mult {
            Self::check_positive("take_profit_atr_mult", mult)?;
        }
        Self::check_fraction("max_drawdown_halt", self.max_drawdown_halt)?;
        if let Some(loss) = self.max_daily_loss_halt {
            Self::check_fraction("max_daily_loss_halt", loss)?;
        }
        if self.commission_pct < Decimal::ZERO {
            return Err(invalid("commission_pct", "must be non-negative"));
        }
        Ok(())
    }

    fn check_fraction(field: &'static str, value: Decimal) -> Result<()> {
        if value <= Decimal::ZERO || value > Decimal::ONE {
            return Err(invalid(field, format!("{value} outside (0, 1]")));
        }
        Ok(())
    }

    fn check_positive(field: &'static str, value: Decimal) -> Result<()> {
        if value <= Decimal::ZERO {
            return Err(invalid(field, format!("{value} must be positive")));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> RiskError {
    RiskError::InvalidConfiguration {
        field,
        message: message.into(),
    }
}

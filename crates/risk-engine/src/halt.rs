//! Trading-halt evaluation.
//!
//! Stateless: every invocation recomputes the halt decision from
//! caller-supplied equity baselines. The caller owns persistence of the
//! high-water mark and day-start equity between invocations.

use rust_decimal::Decimal;
use std::fmt;

use crate::config::RiskConfig;

/// Why trading is halted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// Equity has fallen to or below zero.
    EquityFloor {
        /// Current equity.
        equity: Decimal,
    },
    /// Drawdown from the high-water mark breached the configured limit.
    Drawdown {
        /// Observed drawdown as a fraction of the high-water mark.
        drawdown: Decimal,
        /// Configured halt threshold.
        limit: Decimal,
    },
    /// Loss since day-start equity breached the configured limit.
    DailyLoss {
        /// Observed loss as a fraction of day-start equity.
        loss: Decimal,
        /// Configured halt threshold.
        limit: Decimal,
    },
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EquityFloor { equity } => {
                write!(f, "equity floor breached: equity is {equity}")
            }
            Self::Drawdown { drawdown, limit } => {
                write!(
                    f,
                    "drawdown of {:.1}% exceeds limit of {:.1}%",
                    drawdown * Decimal::ONE_HUNDRED,
                    limit * Decimal::ONE_HUNDRED
                )
            }
            Self::DailyLoss { loss, limit } => {
                write!(
                    f,
                    "daily loss of {:.1}% exceeds limit of {:.1}%",
                    loss * Decimal::ONE_HUNDRED,
                    limit * Decimal::ONE_HUNDRED
                )
            }
        }
    }
}

/// Evaluate the halt conditions, first breach wins.
///
/// Checked in order: equity floor, drawdown (when `high_water_mark` is
/// supplied and positive), daily loss (when configured and
/// `day_start_equity` is supplied and positive). Returns `None` when
/// trading may continue normally.
#[must_use]
pub fn evaluate(
    equity: Decimal,
    config: &RiskConfig,
    high_water_mark: Option<Decimal>,
    day_start_equity: Option<Decimal>,
) -> Option<HaltReason> {
    if equity <= Decimal::ZERO {
        return Some(HaltReason::EquityFloor { equity });
    }

    if let Some(hwm) = high_water_mark
        && hwm > Decimal::ZERO
    {
        let drawdown = (hwm - equity) / hwm;
        if drawdown >= config.max_drawdown_halt {
            return Some(HaltReason::Drawdown {
                drawdown,
                limit: config.max_drawdown_halt,
            });
        }
    }

    if let Some(limit) = config.max_daily_loss_halt
        && let Some(day_start) = day_start_equity
        && day_start > Decimal::ZERO
    {
        let loss = (day_start - equity) / day_start;
        if loss >= limit {
            return Some(HaltReason::DailyLoss { loss, limit });
        }
    }

    None
}

//! Trading signals consumed by the pipeline.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Symbol;
use crate::error::{Result, RiskError};

/// Direction a signal wants the position to move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Enter or increase a long position.
    Long,
    /// Enter or increase a short position.
    Short,
    /// No directional view; skipped by every sizer.
    Flat,
}

/// A trading signal produced by an external signal generator.
///
/// Immutable input to the pipeline; the engine never modifies signals,
/// it only sizes them into orders or skips them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Symbol the signal refers to.
    pub symbol: Symbol,
    /// Desired direction.
    pub direction: Direction,
    /// Signal confidence in `[0, 1]`.
    pub strength: Decimal,
    /// When the signal was generated (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    /// Create a new signal.
    #[must_use]
    pub fn new(
        symbol: impl Into<Symbol>,
        direction: Direction,
        strength: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            strength,
            timestamp,
        }
    }

    /// Validate that strength lies in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`] for out-of-range strengths.
    pub fn validate(&self) -> Result<()> {
        if self.strength < Decimal::ZERO || self.strength > Decimal::ONE {
            return Err(RiskError::InvalidInput {
                field: "signal.strength",
                message: format!(
                    "strength {} for {} outside [0, 1]",
                    self.strength, self.symbol
                ),
            });
        }
        Ok(())
    }
}

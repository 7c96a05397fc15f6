//! Portfolio snapshot supplied by the caller per invocation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Symbol;
use crate::error::{Result, RiskError};

/// An open position.
///
/// Quantity is signed: positive for long, negative for short.
/// `market_value` is the signed mark-to-market value and is maintained
/// by the execution layer between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol held.
    pub symbol: Symbol,
    /// Signed quantity (positive long, negative short).
    pub quantity: Decimal,
    /// Average entry price.
    pub average_price: Decimal,
    /// Signed mark-to-market value.
    pub market_value: Decimal,
    /// When the position was last updated (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// Create a position marked at its average entry price.
    #[must_use]
    pub fn new(
        symbol: impl Into<Symbol>,
        quantity: Decimal,
        average_price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_price,
            market_value: quantity * average_price,
            timestamp,
        }
    }

    /// Override the mark-to-market value.
    #[must_use]
    pub const fn with_market_value(mut self, market_value: Decimal) -> Self {
        self.market_value = market_value;
        self
    }
}

/// Immutable portfolio snapshot for one pipeline invocation.
///
/// Owned and mutated by the execution layer between invocations; the
/// pipeline itself never writes to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Available cash.
    pub cash: Decimal,
    /// Open positions keyed by symbol.
    pub positions: HashMap<Symbol, Position>,
    /// Snapshot time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PortfolioState {
    /// Create a snapshot.
    #[must_use]
    pub fn new(
        cash: Decimal,
        positions: HashMap<Symbol, Position>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            cash,
            positions,
            timestamp,
        }
    }

    /// Cash plus the signed mark-to-market value of all positions.
    #[must_use]
    pub fn equity(&self) -> Decimal {
        self.cash
            + self
                .positions
                .values()
                .map(|p| p.market_value)
                .sum::<Decimal>()
    }

    /// Signed quantity held for `symbol`, zero if flat.
    #[must_use]
    pub fn quantity(&self, symbol: &Symbol) -> Decimal {
        self.positions
            .get(symbol)
            .map_or(Decimal::ZERO, |p| p.quantity)
    }

    /// Validate that no position carries an impossible price.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`] for negative average prices.
    pub fn validate(&self) -> Result<()> {
        for position in self.positions.values() {
            if position.average_price < Decimal::ZERO {
                return Err(RiskError::InvalidInput {
                    field: "position.average_price",
                    message: format!(
                        "negative average price {} for {}",
                        position.average_price, position.symbol
                    ),
                });
            }
        }
        Ok(())
    }
}

//! Market conditions snapshot for sizing and constraint decisions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Bar, Symbol};
use crate::error::{Result, RiskError};

/// Current market conditions for one pipeline invocation.
///
/// Symbols referenced by signals must appear in `current_bars` and
/// `volatility`; symbols that don't are skipped during sizing rather
/// than treated as an error. The optional maps enable the sector,
/// correlation and borrow-cost constraints; when absent, those
/// constraints are no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    /// Most recent bar per symbol.
    pub current_bars: HashMap<Symbol, Bar>,
    /// ATR (or range-based) volatility per symbol.
    pub volatility: HashMap<Symbol, Decimal>,
    /// Average daily volume per symbol.
    pub liquidity: HashMap<Symbol, Decimal>,
    /// Symbol to sector mapping.
    #[serde(default)]
    pub sector_map: Option<HashMap<Symbol, String>>,
    /// Pairwise correlations; lookups try both orderings of the pair.
    #[serde(default)]
    pub correlations: Option<HashMap<(Symbol, Symbol), Decimal>>,
    /// Annualized borrow rates for shorts, per symbol.
    #[serde(default)]
    pub borrow_rates: Option<HashMap<Symbol, Decimal>>,
    /// Market regime label (e.g. "high_volatility").
    #[serde(default)]
    pub regime: Option<String>,
    /// Snapshot time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl MarketState {
    /// Create a snapshot with the required maps; optional maps start empty.
    #[must_use]
    pub fn new(
        current_bars: HashMap<Symbol, Bar>,
        volatility: HashMap<Symbol, Decimal>,
        liquidity: HashMap<Symbol, Decimal>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            current_bars,
            volatility,
            liquidity,
            sector_map: None,
            correlations: None,
            borrow_rates: None,
            regime: None,
            timestamp,
        }
    }

    /// Attach a symbol-to-sector map.
    #[must_use]
    pub fn with_sectors(mut self, sector_map: HashMap<Symbol, String>) -> Self {
        self.sector_map = Some(sector_map);
        self
    }

    /// Attach a pairwise correlation map.
    #[must_use]
    pub fn with_correlations(mut self, correlations: HashMap<(Symbol, Symbol), Decimal>) -> Self {
        self.correlations = Some(correlations);
        self
    }

    /// Attach per-symbol borrow rates.
    #[must_use]
    pub fn with_borrow_rates(mut self, borrow_rates: HashMap<Symbol, Decimal>) -> Self {
        self.borrow_rates = Some(borrow_rates);
        self
    }

    /// Attach a regime label.
    #[must_use]
    pub fn with_regime(mut self, regime: impl Into<String>) -> Self {
        self.regime = Some(regime.into());
        self
    }

    /// Reference price for `symbol` (bar close), if a bar exists.
    #[must_use]
    pub fn price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.current_bars.get(symbol).map(|bar| bar.close)
    }

    /// ATR for `symbol`, if known.
    #[must_use]
    pub fn atr(&self, symbol: &Symbol) -> Option<Decimal> {
        self.volatility.get(symbol).copied()
    }

    /// Sector for `symbol`, if a sector map is attached and covers it.
    #[must_use]
    pub fn sector(&self, symbol: &Symbol) -> Option<&str> {
        self.sector_map
            .as_ref()
            .and_then(|map| map.get(symbol))
            .map(String::as_str)
    }

    /// Pairwise correlation, trying both orderings of the pair.
    #[must_use]
    pub fn correlation(&self, a: &Symbol, b: &Symbol) -> Option<Decimal> {
        let map = self.correlations.as_ref()?;
        map.get(&(a.clone(), b.clone()))
            .or_else(|| map.get(&(b.clone(), a.clone())))
            .copied()
    }

    /// Validate bars and volatility entries.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidMarketData`] for negative prices,
    /// volume or volatility.
    pub fn validate(&self) -> Result<()> {
        for bar in self.current_bars.values() {
            bar.validate()?;
        }
        for (symbol, atr) in &self.volatility {
            if *atr < Decimal::ZERO {
                return Err(RiskError::InvalidMarketData {
                    symbol: symbol.to_string(),
                    message: format!("negative volatility: {atr}"),
                });
            }
        }
        Ok(())
    }
}

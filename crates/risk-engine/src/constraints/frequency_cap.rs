//! Trade frequency cap constraint.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::error::{Result, RiskError};
use crate::models::{MarketState, OrderRequest, OrderSide, PortfolioState, Symbol};

/// Window sizes for frequency caps. Discriminants are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// One second.
    Second = 1,
    /// One minute.
    Minute = 60,
    /// One hour.
    Hour = 3_600,
    /// One day.
    Day = 86_400,
    /// One week.
    Week = 604_800,
    /// Thirty days.
    Month = 2_592_000,
}

impl Timeframe {
    /// Window length as a chrono duration.
    #[must_use]
    pub fn duration(self) -> Duration {
        Duration::seconds(self as i64)
    }
}

/// One frequency cap rule: at most `max_trades` per `timeframe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyCap {
    /// Maximum trades allowed inside the window.
    pub max_trades: u32,
    /// Window size.
    pub timeframe: Timeframe,
    /// Per-symbol when true, global when false.
    pub per_symbol: bool,
}

impl FrequencyCap {
    /// Per-symbol cap of `max_trades` per `timeframe`.
    #[must_use]
    pub const fn per_symbol(max_trades: u32, timeframe: Timeframe) -> Self {
        Self {
            max_trades,
            timeframe,
            per_symbol: true,
        }
    }

    /// Global cap of `max_trades` per `timeframe`.
    #[must_use]
    pub const fn global(max_trades: u32, timeframe: Timeframe) -> Self {
        Self {
            max_trades,
            timeframe,
            per_symbol: false,
        }
    }
}

/// A recorded trade for frequency tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Symbol traded.
    pub symbol: Symbol,
    /// When the fill happened (UTC).
    pub timestamp: DateTime<Utc>,
    /// Side of the fill.
    pub side: OrderSide,
    /// Filled quantity.
    pub quantity: Decimal,
}

/// Limit trade frequency to prevent over-trading.
///
/// Supports multiple simultaneous caps (e.g. 3 per minute per symbol AND
/// 100 per day globally). Risk-reducing orders are NOT exempt: a churned
/// close is still a trade. The caller feeds confirmed fills back through
/// [`FrequencyCapConstraint::record_trade`]; `apply` itself only reads
/// history, using the market snapshot's timestamp as "now".
#[derive(Debug, Clone)]
pub struct FrequencyCapConstraint {
    caps: Vec<FrequencyCap>,
    history: Vec<TradeRecord>,
}

impl Default for FrequencyCapConstraint {
    fn default() -> Self {
        Self {
            caps: vec![FrequencyCap::per_symbol(10, Timeframe::Minute)],
            history: Vec::new(),
        }
    }
}

impl FrequencyCapConstraint {
    /// Create a constraint with explicit caps and empty history.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfiguration`] if `caps` is empty or
    /// any cap allows zero trades.
    pub fn new(caps: Vec<FrequencyCap>) -> Result<Self> {
        if caps.is_empty() {
            return Err(RiskError::InvalidConfiguration {
                field: "caps",
                message: "at least one frequency cap is required".to_string(),
            });
        }
        for cap in &caps {
            if cap.max_trades == 0 {
                return Err(RiskError::InvalidConfiguration {
                    field: "max_trades",
                    message: "must be at least 1".to_string(),
                });
            }
        }
        Ok(Self {
            caps,
            history: Vec::new(),
        })
    }

    /// Seed the trade history, e.g. after a restart.
    #[must_use]
    pub fn with_history(mut self, history: Vec<TradeRecord>) -> Self {
        self.history = history;
        self
    }

    /// Active caps.
    #[must_use]
    pub fn caps(&self) -> &[FrequencyCap] {
        &self.caps
    }

    /// Record a confirmed fill for frequency tracking.
    pub fn record_trade(
        &mut self,
        symbol: Symbol,
        timestamp: DateTime<Utc>,
        side: OrderSide,
        quantity: Decimal,
    ) {
        self.history.push(TradeRecord {
            symbol,
            timestamp,
            side,
            quantity,
        });
    }

    /// Drop history older than the longest cap window before `now`.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let longest = self
            .caps
            .iter()
            .map(|cap| cap.timeframe.duration())
            .max()
            .unwrap_or_else(|| Duration::seconds(0));
        let cutoff = now - longest - Duration::minutes(1);
        self.history.retain(|record| record.timestamp >= cutoff);
    }

    /// Number of recorded trades, optionally filtered by symbol and time.
    #[must_use]
    pub fn trade_count(&self, symbol: Option<&Symbol>, since: Option<DateTime<Utc>>) -> usize {
        self.history
            .iter()
            .filter(|record| symbol.is_none_or(|s| record.symbol == *s))
            .filter(|record| since.is_none_or(|t| record.timestamp >= t))
            .count()
    }

    fn violation(
        &self,
        order: &OrderRequest,
        now: DateTime<Utc>,
        batch_by_symbol: &HashMap<Symbol, u32>,
        batch_global: u32,
    ) -> Option<String> {
        for cap in &self.caps {
            let window_start = now - cap.timeframe.duration();
            let (history_count, batch_count) = if cap.per_symbol {
                let history = self
                    .history
                    .iter()
                    .filter(|t| t.symbol == order.symbol && t.timestamp >= window_start)
                    .count() as u32;
                let batch = batch_by_symbol.get(&order.symbol).copied().unwrap_or(0);
                (history, batch)
            } else {
                let history = self
                    .history
                    .iter()
                    .filter(|t| t.timestamp >= window_start)
                    .count() as u32;
                (history, batch_global)
            };

            if history_count + batch_count >= cap.max_trades {
                let scope = if cap.per_symbol {
                    format!("for {}", order.symbol)
                } else {
                    "globally".to_string()
                };
                return Some(format!(
                    "frequency cap exceeded {scope}: {} trades in window (max {} per {:?})",
                    history_count + batch_count,
                    cap.max_trades,
                    cap.timeframe
                ));
            }
        }
        None
    }
}

impl Constraint for FrequencyCapConstraint {
    fn name(&self) -> &'static str {
        "FrequencyCapConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        _portfolio: &PortfolioState,
        market: &MarketState,
        _config: &RiskConfig,
    ) -> ConstraintResult {
        let now = market.timestamp;

        let mut batch_by_symbol: HashMap<Symbol, u32> = HashMap::new();
        let mut batch_global: u32 = 0;
        let mut result = ConstraintResult::default();

        for order in orders {
            if let Some(reason) = self.violation(&order, now, &batch_by_symbol, batch_global) {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason,
                    original_quantity: None,
                });
            } else {
                *batch_by_symbol.entry(order.symbol.clone()).or_default() += 1;
                batch_global += 1;
                result.orders.push(order);
            }
        }

        result
    }
}

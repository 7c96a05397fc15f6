//! Pyramiding constraint.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use super::{Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::error::{Result, RiskError};
use crate::models::{MarketState, OrderRequest, OrderSide, PortfolioState, Symbol};

/// Per-symbol pyramiding bookkeeping.
///
/// Owned by the caller and fed back in between invocations; the
/// constraint itself reads it during `apply` and only mutates it through
/// the explicit [`PyramidingConstraint::record_fill`] /
/// [`PyramidingConstraint::reset_symbol`] calls the execution layer makes
/// after fills.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PyramidState {
    /// Number of adds since the initial entry.
    pub add_count: u32,
    /// Position size at initial entry.
    pub initial_quantity: Decimal,
    /// Total quantity added since the initial entry.
    pub total_added: Decimal,
}

/// Limit position scaling (adding to existing positions).
///
/// Prevents over-concentration by capping how many times and how much a
/// position can be added to:
/// - at most `max_adds` adds after the initial entry,
/// - each add at most `max_add_pct` of the initial position size.
///
/// Initial entries and risk-reducing orders always pass.
#[derive(Debug, Clone)]
pub struct PyramidingConstraint {
    max_adds: u32,
    max_add_pct: Decimal,
    state: HashMap<Symbol, PyramidState>,
}

impl Default for PyramidingConstraint {
    fn default() -> Self {
        Self {
            max_adds: 3,
            max_add_pct: dec!(0.5),
            state: HashMap::new(),
        }
    }
}

impl PyramidingConstraint {
    /// Create a constraint with explicit limits and no prior state.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfiguration`] if `max_add_pct` is
    /// outside `(0, 1]`.
    pub fn new(max_adds: u32, max_add_pct: Decimal) -> Result<Self> {
        if max_add_pct <= Decimal::ZERO || max_add_pct > Decimal::ONE {
            return Err(RiskError::InvalidConfiguration {
                field: "max_add_pct",
                message: format!("{max_add_pct} outside (0, 1]"),
            });
        }
        Ok(Self {
            max_adds,
            max_add_pct,
            state: HashMap::new(),
        })
    }

    /// Seed the per-symbol state, e.g. after a restart.
    #[must_use]
    pub fn with_state(mut self, state: HashMap<Symbol, PyramidState>) -> Self {
        self.state = state;
        self
    }

    /// Current state for `symbol`, if any.
    #[must_use]
    pub fn state_for(&self, symbol: &Symbol) -> Option<&PyramidState> {
        self.state.get(symbol)
    }

    /// Record a confirmed fill so future adds count correctly.
    ///
    /// `is_add` is false for the initial entry of a position.
    pub fn record_fill(&mut self, symbol: &Symbol, filled_qty: Decimal, is_add: bool) {
        let state = self.state.entry(symbol.clone()).or_default();
        if is_add {
            state.add_count += 1;
            state.total_added += filled_qty;
        } else {
            state.add_count = 0;
            state.initial_quantity = filled_qty;
            state.total_added = Decimal::ZERO;
        }
    }

    /// Clear the state for `symbol` (position fully closed).
    pub fn reset_symbol(&mut self, symbol: &Symbol) {
        self.state.remove(symbol);
    }

    fn is_risk_reducing(order: &OrderRequest, current: Decimal) -> bool {
        match order.side {
            OrderSide::Buy => current < Decimal::ZERO,
            OrderSide::Sell => current > Decimal::ZERO,
        }
    }
}

impl Constraint for PyramidingConstraint {
    fn name(&self) -> &'static str {
        "PyramidingConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        _config: &RiskConfig,
    ) -> ConstraintResult {
        let mut result = ConstraintResult::default();

        for order in orders {
            let current = portfolio.quantity(&order.symbol);

            // Risk-reducing orders and initial entries pass.
            if Self::is_risk_reducing(&order, current) || current == Decimal::ZERO {
                result.orders.push(order);
                continue;
            }

            let state = self.state.get(&order.symbol).cloned().unwrap_or_default();

            if state.add_count >= self.max_adds {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "pyramiding limit reached: {} adds (max {})",
                        state.add_count, self.max_adds
                    ),
                    original_quantity: None,
                });
                continue;
            }

            let base = if state.initial_quantity > Decimal::ZERO {
                state.initial_quantity
            } else {
                current.abs()
            };
            let max_add = base * self.max_add_pct;

            if order.quantity > max_add {
                if max_add > Decimal::ZERO {
                    let price = market.price(&order.symbol).unwrap_or_else(|| {
                        if order.quantity > Decimal::ZERO {
                            order.notional / order.quantity
                        } else {
                            Decimal::ZERO
                        }
                    });
                    result.rejected.push(RejectedOrder {
                        symbol: order.symbol.clone(),
                        constraint: self.name(),
                        reason: format!(
                            "scaled from {} to {} (max add {} of initial {})",
                            order.quantity, max_add, self.max_add_pct, base
                        ),
                        original_quantity: Some(order.quantity),
                    });
                    result.orders.push(order.with_quantity(max_add, price));
                } else {
                    result.rejected.push(RejectedOrder {
                        symbol: order.symbol.clone(),
                        constraint: self.name(),
                        reason: format!(
                            "add size {} exceeds max {} ({} of initial {})",
                            order.quantity, max_add, self.max_add_pct, base
                        ),
                        original_quantity: None,
                    });
                }
            } else {
                result.orders.push(order);
            }
        }

        result
    }
}

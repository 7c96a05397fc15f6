//! The risk engine: orchestrates the signal-to-order pipeline.
//!
//! Fixed stage order per invocation:
//! 1. validate inputs (fatal on malformed config or market data)
//! 2. evaluate halt conditions (equity floor, drawdown, daily loss)
//! 3. size surviving signals via the configured sizer
//! 4. fold the orders through the constraint chain
//! 5. compute stop-loss / take-profit levels for the survivors
//!
//! Every stage is a pure function over the inputs; the engine holds no
//! mutable cross-call state, so identical inputs always produce an
//! identical [`RiskResult`].

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::RiskConfig;
use crate::constraints::{
    self, BuyingPowerConstraint, Constraint, GrossLeverageConstraint, MaxPositionConstraint,
    MaxPositionsConstraint, MinPositionValueConstraint, NetLeverageConstraint,
    ShortSellingConstraint,
};
use crate::error::Result;
use crate::halt;
use crate::models::{MarketState, OrderRequest, PortfolioState, Signal, Symbol};
use crate::sizing::{PositionSizer, VolatilitySizer};
use crate::stops;

/// Result of processing a signal batch through the pipeline.
///
/// Orders keep the relative order their signals were supplied in;
/// constraints only ever remove or shrink entries, never re-sort them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskResult {
    /// Sized and constrained orders ready for execution.
    pub orders: Vec<OrderRequest>,
    /// Stop-loss price per surviving symbol.
    pub stop_losses: BTreeMap<Symbol, Decimal>,
    /// Take-profit price per surviving symbol; empty unless
    /// `take_profit_atr_mult` is configured.
    pub take_profits: BTreeMap<Symbol, Decimal>,
    /// Audit trail: constraint name to the rejections it produced.
    pub rejections: BTreeMap<String, Vec<String>>,
    /// Whether trading is halted.
    pub halted: bool,
    /// Reason for the halt, when halted.
    pub halt_reason: Option<String>,
}

/// Core orchestrator for the signal-to-order pipeline.
///
/// Accepts any conforming sizer and constraint chain; the defaults are a
/// [`VolatilitySizer`] and [`RiskEngine::default_constraints`].
///
/// # Example
///
/// ```
/// use risk_engine::{RiskConfig, RiskEngine};
/// # use chrono::Utc;
/// # use std::collections::HashMap;
/// # use rust_decimal_macros::dec;
/// # use risk_engine::models::{MarketState, PortfolioState};
///
/// let engine = RiskEngine::default();
/// # let portfolio = PortfolioState::new(dec!(100000), HashMap::new(), Utc::now());
/// # let market = MarketState::new(HashMap::new(), HashMap::new(), HashMap::new(), Utc::now());
/// let result = engine
///     .process_signals(&[], &portfolio, &market, &RiskConfig::default(), None, None)
///     .unwrap();
/// assert!(result.orders.is_empty());
/// assert!(!result.halted);
/// ```
pub struct RiskEngine {
    sizer: Box<dyn PositionSizer>,
    constraints: Vec<Box<dyn Constraint>>,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(
            Box::new(VolatilitySizer::new()),
            Self::default_constraints(),
        )
    }
}

impl RiskEngine {
    /// Create an engine with an explicit sizer and constraint chain.
    ///
    /// Constraints run in the given order; each sees the output of the
    /// previous one, so ordering is policy (e.g. a scaler placed after
    /// [`MinPositionValueConstraint`] can legitimately produce orders
    /// below the minimum).
    #[must_use]
    pub fn new(sizer: Box<dyn PositionSizer>, constraints: Vec<Box<dyn Constraint>>) -> Self {
        Self { sizer, constraints }
    }

    /// Create an engine with a custom sizer and the default chain.
    #[must_use]
    pub fn with_sizer(sizer: Box<dyn PositionSizer>) -> Self {
        Self::new(sizer, Self::default_constraints())
    }

    /// The default constraint chain.
    ///
    /// Order matters:
    /// 1. ShortSelling - filter disallowed shorts first
    /// 2. MinPositionValue - drop dust before the scalers run
    /// 3. MaxPosition - cap individual position sizes
    /// 4. MaxPositions - cap the position count
    /// 5. BuyingPower - fit buys to available cash
    /// 6. GrossLeverage - cap total exposure
    /// 7. NetLeverage - cap directional exposure
    #[must_use]
    pub fn default_constraints() -> Vec<Box<dyn Constraint>> {
        vec![
            Box::new(ShortSellingConstraint::new()),
            Box::new(MinPositionValueConstraint::new()),
            Box::new(MaxPositionConstraint::new()),
            Box::new(MaxPositionsConstraint::new()),
            Box::new(BuyingPowerConstraint::new()),
            Box::new(GrossLeverageConstraint::new()),
            Box::new(NetLeverageConstraint::new()),
        ]
    }

    /// Process a signal batch through the risk pipeline.
    ///
    /// `high_water_mark` and `day_start_equity` are the caller-persisted
    /// equity baselines for the drawdown and daily-loss halts; either may
    /// be omitted to disable the respective check.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RiskError`] only for malformed inputs
    /// (out-of-domain config, negative prices/volatility, out-of-range
    /// signal strength). Missing market data, constraint rejections and
    /// halts are reflected in the result instead.
    pub fn process_signals(
        &self,
        signals: &[Signal],
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
        high_water_mark: Option<Decimal>,
        day_start_equity: Option<Decimal>,
    ) -> Result<RiskResult> {
        config.validate()?;
        market.validate()?;
        portfolio.validate()?;
        for signal in signals {
            signal.validate()?;
        }

        let equity = portfolio.equity();
        let halt_reason = halt::evaluate(equity, config, high_water_mark, day_start_equity);
        let halted = halt_reason.is_some();
        if let Some(reason) = &halt_reason {
            warn!(%equity, "trading halted: {reason}");
        }

        if signals.is_empty() {
            return Ok(RiskResult {
                halted,
                halt_reason: halt_reason.map(|r| r.to_string()),
                ..RiskResult::default()
            });
        }

        // Sizing. While halted, only signals that can reduce an existing
        // position are worth sizing at all.
        let sized = if halted {
            let reducible: Vec<Signal> = signals
                .iter()
                .filter(|s| Self::could_reduce(s, portfolio))
                .cloned()
                .collect();
            let orders = self
                .sizer
                .size_positions(&reducible, portfolio, market, config);
            // Nothing may open new exposure while halted; an order whose
            // sized quantity would flip through the position is out too.
            orders
                .into_iter()
                .filter(|order| constraints::is_exposure_reducing(order, portfolio))
                .collect()
        } else {
            self.sizer.size_positions(signals, portfolio, market, config)
        };

        // Constraint chain, collecting the audit trail as we fold.
        let mut orders = sized;
        let mut rejections: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for constraint in &self.constraints {
            let outcome = constraint.apply(orders, portfolio, market, config);
            orders = outcome.orders;
            for rejected in outcome.rejected {
                debug!(
                    constraint = rejected.constraint,
                    symbol = %rejected.symbol,
                    "order rejected: {}",
                    rejected.reason
                );
                rejections
                    .entry(rejected.constraint.to_string())
                    .or_default()
                    .push(format!("{}: {}", rejected.symbol, rejected.reason));
            }
            for warning in outcome.warnings {
                warn!(constraint = constraint.name(), "{warning}");
            }
        }

        // Protective levels for the survivors.
        let mut stop_losses = BTreeMap::new();
        let mut take_profits = BTreeMap::new();
        for order in &orders {
            let Some(entry) = market.price(&order.symbol) else {
                continue;
            };
            let Some(atr) = market.atr(&order.symbol) else {
                continue;
            };
            stop_losses.insert(
                order.symbol.clone(),
                stops::stop_loss(order.side, entry, atr, config.stop_loss_atr_mult),
            );
            if let Some(mult) = config.take_profit_atr_mult {
                take_profits.insert(
                    order.symbol.clone(),
                    stops::take_profit(order.side, entry, atr, mult),
                );
            }
        }

        Ok(RiskResult {
            orders,
            stop_losses,
            take_profits,
            rejections,
            halted,
            halt_reason: halt_reason.map(|r| r.to_string()),
        })
    }

    /// Whether a signal could produce an exposure-reducing order against
    /// the current portfolio (sell against a long, buy against a short).
    fn could_reduce(signal: &Signal, portfolio: &PortfolioState) -> bool {
        use crate::models::Direction;
        let current = portfolio.quantity(&signal.symbol);
        match signal.direction {
            Direction::Long => current < Decimal::ZERO,
            Direction::Short => current > Decimal::ZERO,
            Direction::Flat => false,
        }
    }
}

//! Risk constraints.
//!
//! Constraints are applied in caller-supplied order; each receives the
//! full surviving order set (some limits are portfolio-level and need
//! cross-order visibility) and returns a [`ConstraintResult`] carrying
//! the passed orders plus an audit trail of everything it scaled or
//! dropped. Constraints may shrink or remove orders, never grow or add
//! them, and every constraint preserves the relative input order of the
//! orders it passes.
//!
//! Exposure classification is shared: an order splits into a *closing*
//! quantity (up to the size of the opposite-side position) and an
//! *opening* quantity (the remainder). An order with no opening quantity
//! is exposure-reducing and passes the portfolio-limit constraints
//! unmodified.

mod buying_power;
mod correlation;
mod frequency_cap;
mod leverage;
mod min_value;
mod net_leverage;
mod position;
mod pyramiding;
mod sector;
mod short_selling;

pub use buying_power::BuyingPowerConstraint;
pub use correlation::CorrelationConstraint;
pub use frequency_cap::{FrequencyCap, FrequencyCapConstraint, Timeframe, TradeRecord};
pub use leverage::GrossLeverageConstraint;
pub use min_value::MinPositionValueConstraint;
pub use net_leverage::NetLeverageConstraint;
pub use position::{MaxPositionConstraint, MaxPositionsConstraint};
pub use pyramiding::{PyramidState, PyramidingConstraint};
pub use sector::SectorExposureConstraint;
pub use short_selling::ShortSellingConstraint;

use rust_decimal::Decimal;

use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, OrderSide, PortfolioState, Symbol};

/// A risk constraint over the candidate order set.
///
/// Implementations must be pure with respect to the pipeline: they
/// inspect the orders, portfolio and market, and return a result; they
/// never mutate shared state during `apply`.
pub trait Constraint {
    /// Constraint name for logging and the rejection audit trail.
    fn name(&self) -> &'static str;

    /// Apply the constraint, returning survivors and rejections.
    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult;
}

/// An order a constraint dropped or scaled, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOrder {
    /// Symbol of the affected order.
    pub symbol: Symbol,
    /// Name of the constraint that acted.
    pub constraint: &'static str,
    /// Human-readable explanation.
    pub reason: String,
    /// Original quantity when the order was scaled rather than dropped.
    pub original_quantity: Option<Decimal>,
}

/// Structured output of one constraint application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintResult {
    /// Orders that passed (possibly scaled).
    pub orders: Vec<OrderRequest>,
    /// Orders that were dropped or scaled, with reasons.
    pub rejected: Vec<RejectedOrder>,
    /// Non-fatal notes worth logging.
    pub warnings: Vec<String>,
}

impl ConstraintResult {
    /// A result that passes `orders` through untouched.
    #[must_use]
    pub fn pass_through(orders: Vec<OrderRequest>) -> Self {
        Self {
            orders,
            ..Self::default()
        }
    }
}

/// How an order's quantity divides between reducing and increasing exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposureSplit {
    /// Quantity that closes or reduces the opposite-side position.
    pub closing: Decimal,
    /// Quantity that opens or extends a directional position.
    pub opening: Decimal,
}

/// Split an order's quantity against the existing position.
///
/// A buy first covers any short position; a sell first closes any long.
/// Whatever is left over opens new exposure.
#[must_use]
pub fn split_exposure(order: &OrderRequest, portfolio: &PortfolioState) -> ExposureSplit {
    let current = portfolio.quantity(&order.symbol);
    let opposite = match order.side {
        OrderSide::Buy => (-current).max(Decimal::ZERO),
        OrderSide::Sell => current.max(Decimal::ZERO),
    };
    let closing = order.quantity.min(opposite);
    ExposureSplit {
        closing,
        opening: order.quantity - closing,
    }
}

/// Whether the whole order reduces exposure (no opening quantity).
#[must_use]
pub fn is_exposure_reducing(order: &OrderRequest, portfolio: &PortfolioState) -> bool {
    split_exposure(order, portfolio).opening == Decimal::ZERO
}

/// Shorthand used by constraints when a priced order lacks bar data.
pub(crate) fn reject_missing_bar(constraint: &'static str, order: &OrderRequest) -> RejectedOrder {
    RejectedOrder {
        symbol: order.symbol.clone(),
        constraint,
        reason: format!("no bar data for {}", order.symbol),
        original_quantity: None,
    }
}

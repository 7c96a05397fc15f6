//! Gross leverage constraint.

use rust_decimal::Decimal;

use super::{reject_missing_bar, split_exposure, Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, PortfolioState};

/// Limit total gross exposure as a multiple of equity.
///
/// Gross exposure is the sum of absolute position values. Opening
/// quantities across the whole batch scale down by one common factor
/// (not independently) so the combined exposure fits under
/// `max_gross_leverage * equity`; closing quantities are untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrossLeverageConstraint;

impl GrossLeverageConstraint {
    /// Create the constraint.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for GrossLeverageConstraint {
    fn name(&self) -> &'static str {
        "GrossLeverageConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult {
        let equity = portfolio.equity();
        let max_exposure = equity * config.max_gross_leverage;

        let current_exposure: Decimal = portfolio
            .positions
            .values()
            .map(|p| p.market_value.abs())
            .sum();

        // First pass: price each order and total the opening exposure.
        let mut priced = Vec::with_capacity(orders.len());
        let mut rejected = Vec::new();
        let mut total_opening_value = Decimal::ZERO;

        for order in orders {
            let split = split_exposure(&order, portfolio);
            if split.opening == Decimal::ZERO {
                priced.push((order, split, Decimal::ZERO, Decimal::ZERO));
                continue;
            }
            let Some(price) = market.price(&order.symbol) else {
                rejected.push(reject_missing_bar(self.name(), &order));
                continue;
            };
            let opening_value = split.opening * price;
            total_opening_value += opening_value;
            priced.push((order, split, price, opening_value));
        }

        let remaining_capacity = max_exposure - current_exposure;

        // Everything fits, or nothing wants to open: pass through.
        if total_opening_value <= remaining_capacity.max(Decimal::ZERO) {
            return ConstraintResult {
                orders: priced.into_iter().map(|(order, ..)| order).collect(),
                rejected,
                warnings: Vec::new(),
            };
        }

        let mut result = ConstraintResult {
            rejected,
            ..Default::default()
        };

        if remaining_capacity <= Decimal::ZERO {
            // Already at or over the limit: opening parts are cut entirely.
            for (order, split, price, _) in priced {
                if split.opening == Decimal::ZERO {
                    result.orders.push(order);
                } else if split.closing > Decimal::ZERO {
                    result.rejected.push(RejectedOrder {
                        symbol: order.symbol.clone(),
                        constraint: self.name(),
                        reason: format!(
                            "gross leverage at max ({}x), trimmed to closing quantity",
                            config.max_gross_leverage
                        ),
                        original_quantity: Some(order.quantity),
                    });
                    result.orders.push(order.with_quantity(split.closing, price));
                } else {
                    result.rejected.push(RejectedOrder {
                        symbol: order.symbol.clone(),
                        constraint: self.name(),
                        reason: format!(
                            "gross leverage at max ({}x), no capacity for new exposure",
                            config.max_gross_leverage
                        ),
                        original_quantity: None,
                    });
                }
            }
            return result;
        }

        // Scale all opening quantities by one common factor.
        let scale = remaining_capacity / total_opening_value;

        for (order, split, price, _) in priced {
            if split.opening == Decimal::ZERO {
                result.orders.push(order);
                continue;
            }
            let scaled = split.closing + split.opening * scale;
            if scaled > Decimal::ZERO {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "scaled from {} to {} (gross leverage limit {}x)",
                        order.quantity, scaled, config.max_gross_leverage
                    ),
                    original_quantity: Some(order.quantity),
                });
                result.orders.push(order.with_quantity(scaled, price));
            } else {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "scaled to zero (gross leverage limit {}x)",
                        config.max_gross_leverage
                    ),
                    original_quantity: None,
                });
            }
        }

        result
    }
}

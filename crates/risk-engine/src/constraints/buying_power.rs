//! Buying power constraint.

use rust_decimal::Decimal;

use super::{reject_missing_bar, Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, OrderSide, PortfolioState};

/// Limit buy orders to available cash.
///
/// Walks the batch in input order, debiting each accepted buy's cost
/// (notional plus the configured commission assumption) from the cash
/// balance. A buy that no longer fits is scaled down to the affordable
/// quantity; a buy with no cash behind it is dropped. Sells never
/// consume cash and always pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyingPowerConstraint;

impl BuyingPowerConstraint {
    /// Create the constraint.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for BuyingPowerConstraint {
    fn name(&self) -> &'static str {
        "BuyingPowerConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult {
        let cost_load = Decimal::ONE + config.commission_pct;
        let mut remaining = portfolio.cash.max(Decimal::ZERO);

        let mut result = ConstraintResult::default();

        for order in orders {
            if order.side == OrderSide::Sell {
                result.orders.push(order);
                continue;
            }

            let Some(price) = market.price(&order.symbol) else {
                result.rejected.push(reject_missing_bar(self.name(), &order));
                continue;
            };

            let unit_cost = price * cost_load;
            let cost = order.quantity * unit_cost;

            if cost <= remaining {
                remaining -= cost;
                result.orders.push(order);
                continue;
            }

            let affordable = if unit_cost > Decimal::ZERO {
                remaining / unit_cost
            } else {
                Decimal::ZERO
            };

            if affordable > Decimal::ZERO {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "reduced from {} to {} (insufficient buying power)",
                        order.quantity, affordable
                    ),
                    original_quantity: Some(order.quantity),
                });
                remaining -= affordable * unit_cost;
                result.orders.push(order.with_quantity(affordable, price));
            } else {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "order cost {cost} exceeds available cash, nothing affordable"
                    ),
                    original_quantity: None,
                });
            }
        }

        result
    }
}

//! Minimum order value constraint.

use super::{is_exposure_reducing, reject_missing_bar, Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, PortfolioState};

/// Drop orders below the minimum notional value.
///
/// Filters dust orders whose value (quantity times price) is under
/// `min_position_value`. Exposure-reducing orders always pass: closing a
/// tiny remnant of a position is legitimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinPositionValueConstraint;

impl MinPositionValueConstraint {
    /// Create the constraint.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for MinPositionValueConstraint {
    fn name(&self) -> &'static str {
        "MinPositionValueConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult {
        let min_value = config.min_position_value;
        let mut result = ConstraintResult::default();

        for order in orders {
            if is_exposure_reducing(&order, portfolio) {
                result.orders.push(order);
                continue;
            }

            let Some(price) = market.price(&order.symbol) else {
                result.rejected.push(reject_missing_bar(self.name(), &order));
                continue;
            };

            let value = order.quantity * price;
            if value >= min_value {
                result.orders.push(order);
            } else {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!("order value {value} below minimum {min_value}"),
                    original_quantity: None,
                });
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_above_minimum_passes() {
        let constraint = MinPositionValueConstraint::new();
        // 2.649 * 100 = 264.90 > 100
        let result = constraint.apply(
            vec![buy("AAPL", dec!(2.649))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders.len(), 1);
    }

    #[test]
    fn dust_order_dropped() {
        let constraint = MinPositionValueConstraint::new();
        // 0.5 * 100 = 50 < 100
        let result = constraint.apply(
            vec![buy("AAPL", dec!(0.5))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert!(result.orders.is_empty());
        assert_eq!(result.rejected.len(), 1);
        assert!(result.rejected[0].reason.contains("below minimum"));
    }

    #[test]
    fn tiny_closing_sell_passes() {
        let constraint = MinPositionValueConstraint::new();
        let portfolio = portfolio_with(&[("AAPL", dec!(0.5))]);
        let result = constraint.apply(
            vec![sell("AAPL", dec!(0.5))],
            &portfolio,
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders.len(), 1);
    }

    #[test]
    fn tiny_short_initiating_sell_dropped() {
        let constraint = MinPositionValueConstraint::new();
        let result = constraint.apply(
            vec![sell("AAPL", dec!(0.5))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert!(result.orders.is_empty());
    }
}

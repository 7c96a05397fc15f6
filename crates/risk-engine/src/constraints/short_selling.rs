//! Short selling constraint.

use rust_decimal::Decimal;

use super::{Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, OrderSide, PortfolioState};

/// Block sells from opening short positions when shorting is disabled.
///
/// With `config.allow_shorts` (the default) this passes everything
/// through unchanged. When shorts are disabled:
/// - buys always pass,
/// - sells against a long position are trimmed to the long quantity,
/// - sells with no long position behind them are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortSellingConstraint;

impl ShortSellingConstraint {
    /// Create the constraint.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for ShortSellingConstraint {
    fn name(&self) -> &'static str {
        "ShortSellingConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult {
        if config.allow_shorts {
            return ConstraintResult::pass_through(orders);
        }

        let mut result = ConstraintResult::default();

        for order in orders {
            if order.side == OrderSide::Buy {
                result.orders.push(order);
                continue;
            }

            let current = portfolio.quantity(&order.symbol);
            if current <= Decimal::ZERO {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: "short selling not allowed".to_string(),
                    original_quantity: None,
                });
                continue;
            }

            if order.quantity > current {
                let price = market.price(&order.symbol).unwrap_or_else(|| {
                    // No bar: preserve the recorded notional-per-unit.
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
                        "trimmed from {} to {} to avoid short position",
                        order.quantity, current
                    ),
                    original_quantity: Some(order.quantity),
                });
                result.orders.push(order.with_quantity(current, price));
            } else {
                result.orders.push(order);
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

    fn no_shorts() -> RiskConfig {
        RiskConfig {
            allow_shorts: false,
            ..Default::default()
        }
    }

    #[test]
    fn shorts_allowed_passes_everything() {
        let constraint = ShortSellingConstraint::new();
        let result = constraint.apply(
            vec![sell("AAPL", dec!(100))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders.len(), 1);
    }

    #[test]
    fn naked_sell_dropped_when_shorts_disabled() {
        let constraint = ShortSellingConstraint::new();
        let result = constraint.apply(
            vec![sell("AAPL", dec!(100))],
            &empty_portfolio(),
            &market(),
            &no_shorts(),
        );
        assert!(result.orders.is_empty());
        assert_eq!(result.rejected.len(), 1);
    }

    #[test]
    fn oversized_sell_trimmed_to_position() {
        let constraint = ShortSellingConstraint::new();
        let portfolio = portfolio_with(&[("AAPL", dec!(100))]);
        let result = constraint.apply(
            vec![sell("AAPL", dec!(150))],
            &portfolio,
            &market(),
            &no_shorts(),
        );
        assert_eq!(result.orders[0].quantity, dec!(100));
        assert_eq!(result.rejected[0].original_quantity, Some(dec!(150)));
    }

    #[test]
    fn sell_within_position_passes() {
        let constraint = ShortSellingConstraint::new();
        let portfolio = portfolio_with(&[("AAPL", dec!(100))]);
        let result = constraint.apply(
            vec![sell("AAPL", dec!(60))],
            &portfolio,
            &market(),
            &no_shorts(),
        );
        assert_eq!(result.orders[0].quantity, dec!(60));
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn buys_always_pass() {
        let constraint = ShortSellingConstraint::new();
        let result = constraint.apply(
            vec![buy("AAPL", dec!(100))],
            &empty_portfolio(),
            &market(),
            &no_shorts(),
        );
        assert_eq!(result.orders.len(), 1);
    }
}

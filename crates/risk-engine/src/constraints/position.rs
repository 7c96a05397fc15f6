//! Position-size constraints.
//!
//! [`MaxPositionConstraint`] caps individual position value as a fraction
//! of equity; [`MaxPositionsConstraint`] caps the number of concurrent
//! positions.

use rust_decimal::Decimal;
use std::collections::HashSet;

use super::{reject_missing_bar, split_exposure, Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, PortfolioState};

/// Limit individual position value as a fraction of equity.
///
/// The closing part of an order always passes; only the opening part is
/// fitted into the room left under `max_position_pct * equity`. An order
/// that flips a position through zero gets the full limit for its new
/// side, since the old position is gone by the time the new one opens.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxPositionConstraint;

impl MaxPositionConstraint {
    /// Create the constraint.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for MaxPositionConstraint {
    fn name(&self) -> &'static str {
        "MaxPositionConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult {
        let equity = portfolio.equity();
        let max_value = equity * config.max_position_pct;

        let mut result = ConstraintResult::default();

        for order in orders {
            let split = split_exposure(&order, portfolio);
            if split.opening == Decimal::ZERO {
                result.orders.push(order);
                continue;
            }

            let Some(price) = market.price(&order.symbol) else {
                result.rejected.push(reject_missing_bar(self.name(), &order));
                continue;
            };

            // Room for the opening part: a flip starts the new side from
            // zero, otherwise the existing same-side value counts.
            let existing_value = if split.closing > Decimal::ZERO {
                Decimal::ZERO
            } else {
                (portfolio.quantity(&order.symbol) * price).abs()
            };
            let room = (max_value - existing_value).max(Decimal::ZERO);

            if room == Decimal::ZERO && split.closing == Decimal::ZERO {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "position already at max ({} of equity)",
                        config.max_position_pct
                    ),
                    original_quantity: None,
                });
                continue;
            }

            let opening_value = split.opening * price;
            if opening_value <= room {
                result.orders.push(order);
                continue;
            }

            let allowed_opening = room / price;
            let total = split.closing + allowed_opening;
            if total > Decimal::ZERO {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "reduced from {} to {} (max position {} of equity)",
                        order.quantity, total, config.max_position_pct
                    ),
                    original_quantity: Some(order.quantity),
                });
                result.orders.push(order.with_quantity(total, price));
            } else {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "position would exceed {} of equity",
                        config.max_position_pct
                    ),
                    original_quantity: None,
                });
            }
        }

        result
    }
}

/// Limit the total number of concurrent positions.
///
/// Orders that reduce existing positions or add to already-held symbols
/// pass freely; orders opening brand-new symbols compete for the room
/// left under `max_positions`, strongest signal first. Strength ties
/// keep the earlier order (stable, input-order tie-break).
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxPositionsConstraint;

impl MaxPositionsConstraint {
    /// Create the constraint.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for MaxPositionsConstraint {
    fn name(&self) -> &'static str {
        "MaxPositionsConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        _market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult {
        let current_count = portfolio.positions.len();
        let room = config.max_positions.saturating_sub(current_count);

        // Indices of orders that would open a brand-new symbol.
        let new_position_idx: Vec<usize> = orders
            .iter()
            .enumerate()
            .filter(|(_, order)| {
                !portfolio.positions.contains_key(&order.symbol)
                    && split_exposure(order, portfolio).opening > Decimal::ZERO
            })
            .map(|(i, _)| i)
            .collect();

        let dropped: HashSet<usize> = if new_position_idx.len() > room {
            let mut ranked = new_position_idx;
            ranked.sort_by(|&a, &b| {
                orders[b]
                    .strength
                    .cmp(&orders[a].strength)
                    .then(a.cmp(&b))
            });
            ranked.split_off(room).into_iter().collect()
        } else {
            HashSet::new()
        };

        let mut result = ConstraintResult::default();
        for (idx, order) in orders.into_iter().enumerate() {
            if dropped.contains(&idx) {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "max positions ({}) reached, currently holding {} positions",
                        config.max_positions, current_count
                    ),
                    original_quantity: None,
                });
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
    use crate::models::OrderSide;
    use rust_decimal_macros::dec;

    #[test]
    fn buy_within_limit_passes() {
        let constraint = MaxPositionConstraint::new();
        // 5% of 100k = 5000; 40 * 100 = 4000
        let result = constraint.apply(
            vec![buy("AAPL", dec!(40))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders.len(), 1);
        assert_eq!(result.orders[0].quantity, dec!(40));
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn oversized_buy_scales_to_limit() {
        let constraint = MaxPositionConstraint::new();
        // 80 * 100 = 8000 > 5000 -> scaled to 50
        let result = constraint.apply(
            vec![buy("AAPL", dec!(80))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders[0].quantity, dec!(50));
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].original_quantity, Some(dec!(80)));
    }

    #[test]
    fn existing_position_consumes_room() {
        let constraint = MaxPositionConstraint::new();
        // Holding 30 AAPL (3000); room = 2000 -> 20 shares
        let portfolio = portfolio_with(&[("AAPL", dec!(30))]);
        let result = constraint.apply(
            vec![buy("AAPL", dec!(40))],
            &portfolio,
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders[0].quantity, dec!(20));
    }

    #[test]
    fn sell_closing_long_passes_unmodified() {
        let constraint = MaxPositionConstraint::new();
        let portfolio = portfolio_with(&[("AAPL", dec!(100))]);
        let result = constraint.apply(
            vec![sell("AAPL", dec!(100))],
            &portfolio,
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders[0].quantity, dec!(100));
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn short_initiating_sell_is_constrained() {
        let constraint = MaxPositionConstraint::new();
        // 80 * 100 = 8000 > 5000 -> scaled like a buy would be
        let result = constraint.apply(
            vec![sell("AAPL", dec!(80))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders[0].quantity, dec!(50));
        assert_eq!(result.orders[0].side, OrderSide::Sell);
    }

    #[test]
    fn flip_through_zero_gets_full_room_for_new_side() {
        let constraint = MaxPositionConstraint::new();
        // Long 20; sell 120 = close 20 + open 100 short (10000 > 5000).
        // Opening part capped at 50, total = 20 + 50 = 70.
        let portfolio = portfolio_with(&[("AAPL", dec!(20))]);
        let result = constraint.apply(
            vec![sell("AAPL", dec!(120))],
            &portfolio,
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders[0].quantity, dec!(70));
    }

    #[test]
    fn max_positions_drops_weakest_new_orders() {
        let constraint = MaxPositionsConstraint::new();
        let config = RiskConfig {
            max_positions: 1,
            ..Default::default()
        };
        let orders = vec![
            order("AAPL", OrderSide::Buy, dec!(10), dec!(0.6)),
            order("GOOGL", OrderSide::Buy, dec!(5), dec!(0.9)),
        ];
        let result = constraint.apply(orders, &empty_portfolio(), &market(), &config);

        assert_eq!(result.orders.len(), 1);
        assert_eq!(result.orders[0].symbol.as_str(), "GOOGL");
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].symbol.as_str(), "AAPL");
    }

    #[test]
    fn max_positions_tie_break_keeps_earlier_order() {
        let constraint = MaxPositionsConstraint::new();
        let config = RiskConfig {
            max_positions: 1,
            ..Default::default()
        };
        let orders = vec![
            order("AAPL", OrderSide::Buy, dec!(10), dec!(0.7)),
            order("GOOGL", OrderSide::Buy, dec!(5), dec!(0.7)),
        ];
        let result = constraint.apply(orders, &empty_portfolio(), &market(), &config);
        assert_eq!(result.orders[0].symbol.as_str(), "AAPL");
        assert_eq!(result.rejected[0].symbol.as_str(), "GOOGL");
    }

    #[test]
    fn reducing_and_existing_symbol_orders_bypass_count() {
        let constraint = MaxPositionsConstraint::new();
        let config = RiskConfig {
            max_positions: 2,
            ..Default::default()
        };
        // Already holding 2 symbols: no room for new ones.
        let portfolio = portfolio_with(&[("AAPL", dec!(10)), ("GOOGL", dec!(5))]);
        let orders = vec![
            sell("AAPL", dec!(10)),  // reduces existing
            buy("GOOGL", dec!(5)),   // adds to existing
            buy("MSFT", dec!(2)),    // brand new -> dropped
        ];
        let result = constraint.apply(orders, &portfolio, &market(), &config);

        assert_eq!(result.orders.len(), 2);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].symbol.as_str(), "MSFT");
    }

    #[test]
    fn output_preserves_input_order_after_drops() {
        let constraint = MaxPositionsConstraint::new();
        let config = RiskConfig {
            max_positions: 2,
            ..Default::default()
        };
        let orders = vec![
            order("AAPL", OrderSide::Buy, dec!(10), dec!(0.5)),
            order("MSFT", OrderSide::Buy, dec!(2), dec!(0.9)),
            order("GOOGL", OrderSide::Buy, dec!(5), dec!(0.7)),
        ];
        let result = constraint.apply(orders, &empty_portfolio(), &market(), &config);

        // AAPL (weakest) drops; MSFT and GOOGL stay in input order.
        assert_eq!(result.orders.len(), 2);
        assert_eq!(result.orders[0].symbol.as_str(), "MSFT");
        assert_eq!(result.orders[1].symbol.as_str(), "GOOGL");
    }
}

//! Net leverage constraint.

use rust_decimal::Decimal;

use super::{reject_missing_bar, Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, OrderSide, PortfolioState};

/// Limit net exposure (longs minus shorts) as a multiple of equity.
///
/// Unlike gross leverage, a balanced long/short book can keep adding
/// offsetting positions: only |net exposure| is capped at
/// `max_net_leverage * equity`. Orders that shrink the absolute net
/// exposure always pass; the rest scale proportionally into whatever
/// directional room is left.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetLeverageConstraint;

impl NetLeverageConstraint {
    /// Create the constraint.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for NetLeverageConstraint {
    fn name(&self) -> &'static str {
        "NetLeverageConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult {
        let equity = portfolio.equity();
        let max_net = equity * config.max_net_leverage;

        // Signed: longs positive, shorts negative.
        let current_net: Decimal = portfolio.positions.values().map(|p| p.market_value).sum();

        // First pass: signed exposure delta per order.
        let mut priced = Vec::with_capacity(orders.len());
        let mut rejected = Vec::new();
        let mut increasing_delta = Decimal::ZERO;

        for order in orders {
            let Some(price) = market.price(&order.symbol) else {
                rejected.push(reject_missing_bar(self.name(), &order));
                continue;
            };
            let delta = match order.side {
                OrderSide::Buy => order.quantity * price,
                OrderSide::Sell => -(order.quantity * price),
            };
            // An order that moves net exposure toward zero always passes.
            let reduces = (current_net + delta).abs() < current_net.abs();
            if !reduces {
                increasing_delta += delta;
            }
            priced.push((order, price, delta, reduces));
        }

        let proposed_net = current_net + increasing_delta;
        if proposed_net.abs() <= max_net {
            return ConstraintResult {
                orders: priced.into_iter().map(|(order, ..)| order).collect(),
                rejected,
                warnings: Vec::new(),
            };
        }

        // Room in the direction the batch is pushing.
        let available = if increasing_delta > Decimal::ZERO {
            max_net - current_net
        } else {
            max_net + current_net
        };

        let mut result = ConstraintResult {
            rejected,
            ..Default::default()
        };

        if available <= Decimal::ZERO {
            for (order, _, _, reduces) in priced {
                if reduces {
                    result.orders.push(order);
                } else {
                    result.rejected.push(RejectedOrder {
                        symbol: order.symbol.clone(),
                        constraint: self.name(),
                        reason: format!(
                            "net leverage at max ({}x), no capacity in this direction",
                            config.max_net_leverage
                        ),
                        original_quantity: None,
                    });
                }
            }
            return result;
        }

        let scale = available / increasing_delta.abs();

        for (order, price, _, reduces) in priced {
            if reduces {
                result.orders.push(order);
                continue;
            }
            let scaled = order.quantity * scale;
            if scaled > Decimal::ZERO {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "scaled from {} to {} (net leverage limit {}x)",
                        order.quantity, scaled, config.max_net_leverage
                    ),
                    original_quantity: Some(order.quantity),
                });
                result.orders.push(order.with_quantity(scaled, price));
            } else {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "scaled to zero (net leverage limit {}x)",
                        config.max_net_leverage
                    ),
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
    fn balanced_batch_passes_where_gross_would_scale() {
        let constraint = NetLeverageConstraint::new();
        // 1500*100 long + 750*200 short = 300k gross, 0 net
        let result = constraint.apply(
            vec![buy("AAPL", dec!(1500)), sell("GOOGL", dec!(750))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders.len(), 2);
        assert!(result.rejected.is_empty());
        assert_eq!(result.orders[0].quantity, dec!(1500));
    }

    #[test]
    fn directional_batch_scales() {
        let constraint = NetLeverageConstraint::new();
        // 2000 * 100 = 200k net long against 100k limit -> halve
        let result = constraint.apply(
            vec![buy("AAPL", dec!(2000))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders[0].quantity, dec!(1000));
    }

    #[test]
    fn sell_reducing_net_long_passes() {
        let constraint = NetLeverageConstraint::new();
        // Net long 1000 AAPL = 100k (at limit); the sell reduces |net|.
        let portfolio = portfolio_with(&[("AAPL", dec!(1000))]);
        let result = constraint.apply(
            vec![sell("AAPL", dec!(400))],
            &portfolio,
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders[0].quantity, dec!(400));
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn no_room_in_direction_drops_increasing_orders() {
        let constraint = NetLeverageConstraint::new();
        // Already net long at the limit; more longs have no room.
        let portfolio = portfolio_with(&[("AAPL", dec!(1000))]);
        let result = constraint.apply(
            vec![buy("GOOGL", dec!(100))],
            &portfolio,
            &market(),
            &RiskConfig::default(),
        );
        assert!(result.orders.is_empty());
        assert_eq!(result.rejected.len(), 1);
    }

    #[test]
    fn short_direction_uses_short_side_room() {
        let constraint = NetLeverageConstraint::new();
        // Net short room from flat book: 100k; 1000-share GOOGL short =
        // 200k -> halve
        let result = constraint.apply(
            vec![sell("GOOGL", dec!(1000))],
            &empty_portfolio(),
            &market(),
            &RiskConfig::default(),
        );
        assert_eq!(result.orders[0].quantity, dec!(500));
    }
}

//! Kelly criterion position sizing.

use rust_decimal::Decimal;

use super::{side_for, PositionSizer};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, PortfolioState, Signal};

/// Size positions using the Kelly criterion.
///
/// Signal strength is treated as a win-probability proxy. For symmetric
/// returns the full Kelly fraction is `f* = 2p - 1`; a fractional Kelly
/// multiplier from the config tempers it:
///
/// ```text
/// fraction = clamp(2p - 1, 0, 1) * kelly_fraction
/// quantity = equity * fraction / price
/// ```
///
/// Strength at or below 0.5 means no edge and produces no order.
#[derive(Debug, Clone, Copy, Default)]
pub struct KellySizer;

impl KellySizer {
    /// Create the sizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PositionSizer for KellySizer {
    fn name(&self) -> &'static str {
        "KellySizer"
    }

    fn size_positions(
        &self,
        signals: &[Signal],
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> Vec<OrderRequest> {
        let equity = portfolio.equity();
        let mut orders = Vec::new();

        for signal in signals {
            let Some(side) = side_for(signal.direction) else {
                continue;
            };
            let Some(price) = market.price(&signal.symbol) else {
                continue;
            };
            if price <= Decimal::ZERO {
                continue;
            }

            let full_kelly = (Decimal::TWO * signal.strength - Decimal::ONE)
                .clamp(Decimal::ZERO, Decimal::ONE);
            if full_kelly <= Decimal::ZERO {
                continue;
            }

            let fraction = full_kelly * config.kelly_fraction;
            let quantity = equity * fraction / price;
            if quantity <= Decimal::ZERO {
                continue;
            }

            orders.push(OrderRequest::new(
                signal.symbol.clone(),
                side,
                quantity,
                signal.strength,
                price,
                signal.timestamp,
            ));
        }

        orders
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quarter_kelly_from_strength() {
        let sizer = KellySizer::new();
        let orders = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.75))],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );

        // f* = 2*0.75 - 1 = 0.5; quarter Kelly = 0.125; value = 12500
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].quantity, dec!(12500) / dec!(151.50));
    }

    #[test]
    fn strength_half_has_no_edge() {
        let sizer = KellySizer::new();
        let orders = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.5))],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );
        assert!(orders.is_empty());
    }

    #[test]
    fn negative_edge_skipped() {
        let sizer = KellySizer::new();
        let orders = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.3))],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );
        assert!(orders.is_empty());
    }

    #[test]
    fn short_edge_sized_like_long() {
        let sizer = KellySizer::new();
        let orders = sizer.size_positions(
            &[short_signal("AAPL", dec!(0.75))],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, crate::models::OrderSide::Sell);
        assert_eq!(orders[0].quantity, dec!(12500) / dec!(151.50));
    }
}

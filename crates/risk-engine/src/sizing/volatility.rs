//! Volatility-normalized position sizing.

use rust_decimal::Decimal;

use super::{side_for, PositionSizer};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, PortfolioState, Signal};

/// Scale position size inversely with volatility.
///
/// Each trade risks approximately the same fraction of equity regardless
/// of how volatile the instrument is:
///
/// ```text
/// quantity = (equity * risk_per_trade) / (atr * price)
/// ```
///
/// Higher volatility means a smaller position. This is the engine's
/// default sizer.
#[derive(Debug, Clone, Default)]
pub struct VolatilitySizer {
    /// Per-instance override for `config.risk_per_trade`.
    risk_per_trade: Option<Decimal>,
}

impl VolatilitySizer {
    /// Create a sizer that uses `config.risk_per_trade`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            risk_per_trade: None,
        }
    }

    /// Create a sizer with a fixed risk fraction overriding the config.
    #[must_use]
    pub const fn with_risk_per_trade(risk_per_trade: Decimal) -> Self {
        Self {
            risk_per_trade: Some(risk_per_trade),
        }
    }
}

impl PositionSizer for VolatilitySizer {
    fn name(&self) -> &'static str {
        "VolatilitySizer"
    }

    fn size_positions(
        &self,
        signals: &[Signal],
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> Vec<OrderRequest> {
        let equity = portfolio.equity();
        let risk_pct = self.risk_per_trade.unwrap_or(config.risk_per_trade);
        let risk_amount = equity * risk_pct;

        let mut orders = Vec::new();

        for signal in signals {
            let Some(side) = side_for(signal.direction) else {
                continue;
            };
            let Some(price) = market.price(&signal.symbol) else {
                continue;
            };
            let Some(atr) = market.atr(&signal.symbol) else {
                continue;
            };

            let divisor = atr * price;
            if divisor <= Decimal::ZERO {
                continue;
            }

            let quantity = risk_amount / divisor;
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
    use crate::models::OrderSide;
    use rust_decimal_macros::dec;

    #[test]
    fn sizes_by_inverse_volatility() {
        let sizer = VolatilitySizer::new();
        let orders = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.8))],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );

        // qty = (100000 * 0.01) / (2.50 * 151.50)
        assert_eq!(orders.len(), 1);
        let expected = dec!(1000) / (dec!(2.50) * dec!(151.50));
        assert_eq!(orders[0].quantity, expected);
        assert_eq!(orders[0].side, OrderSide::Buy);
    }

    #[test]
    fn short_signal_sized_symmetrically() {
        let sizer = VolatilitySizer::new();
        let long = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.8))],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );
        let short = sizer.size_positions(
            &[short_signal("AAPL", dec!(0.8))],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );

        assert_eq!(long[0].quantity, short[0].quantity);
        assert_eq!(short[0].side, OrderSide::Sell);
    }

    #[test]
    fn missing_volatility_skips_signal() {
        let sizer = VolatilitySizer::new();
        let mut market = two_symbol_market();
        market.volatility.remove(&crate::models::Symbol::new("AAPL"));

        let orders = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.8)), long_signal("GOOGL", dec!(0.6))],
            &empty_portfolio(),
            &market,
            &RiskConfig::default(),
        );
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].symbol.as_str(), "GOOGL");
    }

    #[test]
    fn risk_override_takes_precedence() {
        let sizer = VolatilitySizer::with_risk_per_trade(dec!(0.02));
        let orders = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.8))],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );
        let expected = dec!(2000) / (dec!(2.50) * dec!(151.50));
        assert_eq!(orders[0].quantity, expected);
    }

    #[test]
    fn flat_signal_produces_nothing() {
        let sizer = VolatilitySizer::new();
        let flat = crate::models::Signal::new(
            "AAPL",
            crate::models::Direction::Flat,
            dec!(0),
            now(),
        );
        let orders = sizer.size_positions(
            &[flat],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );
        assert!(orders.is_empty());
    }
}

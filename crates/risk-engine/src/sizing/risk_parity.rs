//! Risk parity position sizing.

use rust_decimal::Decimal;

use super::{side_for, PositionSizer};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, PortfolioState, Signal};

/// Equal risk contribution across the signal batch.
///
/// Positions are weighted inversely to their volatility so each
/// contributes the same volatility to the portfolio:
///
/// ```text
/// weight_i   = (1 / vol_i) / sum(1 / vol_j)
/// quantity_i = equity * weight_i / price_i
/// ```
///
/// The weights are normalized over the whole batch, so this sizer cannot
/// be evaluated one signal at a time. Signals with zero or missing
/// volatility drop out before normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskParitySizer;

impl RiskParitySizer {
    /// Create the sizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PositionSizer for RiskParitySizer {
    fn name(&self) -> &'static str {
        "RiskParitySizer"
    }

    fn size_positions(
        &self,
        signals: &[Signal],
        portfolio: &PortfolioState,
        market: &MarketState,
        _config: &RiskConfig,
    ) -> Vec<OrderRequest> {
        // First pass: collect the sizable signals with their inverse vols.
        let mut valid = Vec::new();
        for signal in signals {
            let Some(side) = side_for(signal.direction) else {
                continue;
            };
            let Some(price) = market.price(&signal.symbol) else {
                continue;
            };
            let Some(vol) = market.atr(&signal.symbol) else {
                continue;
            };
            if vol <= Decimal::ZERO || price <= Decimal::ZERO {
                continue;
            }
            valid.push((signal, side, price, Decimal::ONE / vol));
        }
        if valid.is_empty() {
            return Vec::new();
        }

        let total_inverse_vol: Decimal = valid.iter().map(|(_, _, _, iv)| *iv).sum();
        if total_inverse_vol <= Decimal::ZERO {
            return Vec::new();
        }

        let equity = portfolio.equity();
        let mut orders = Vec::new();

        for (signal, side, price, inverse_vol) in valid {
            let weight = inverse_vol / total_inverse_vol;
            let quantity = equity * weight / price;
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
    fn weights_are_inverse_to_volatility() {
        let sizer = RiskParitySizer::new();
        let orders = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.8)), long_signal("GOOGL", dec!(0.6))],
            &empty_portfolio(),
            &two_symbol_market(),
            &RiskConfig::default(),
        );

        assert_eq!(orders.len(), 2);
        // AAPL (vol 2.50) gets the larger allocation than GOOGL (vol 3.20).
        assert!(orders[0].notional > orders[1].notional);

        // Allocations split the full equity by inverse volatility.
        let total_iv = dec!(1) / dec!(2.50) + dec!(1) / dec!(3.20);
        let aapl_weight = (dec!(1) / dec!(2.50)) / total_iv;
        assert_eq!(
            orders[0].quantity,
            dec!(100000) * aapl_weight / dec!(151.50)
        );
    }

    #[test]
    fn equal_volatility_means_equal_allocation() {
        let sizer = RiskParitySizer::new();
        let mut market = two_symbol_market();
        market
            .volatility
            .insert(crate::models::Symbol::new("GOOGL"), dec!(2.50));

        let orders = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.8)), long_signal("GOOGL", dec!(0.6))],
            &empty_portfolio(),
            &market,
            &RiskConfig::default(),
        );
        // Equal weights; notionals agree up to division rounding.
        let diff = (orders[0].notional - orders[1].notional).abs();
        assert!(diff < dec!(0.0001), "notional diff {diff}");
    }

    #[test]
    fn zero_volatility_signal_drops_out_of_normalization() {
        let sizer = RiskParitySizer::new();
        let mut market = two_symbol_market();
        market
            .volatility
            .insert(crate::models::Symbol::new("AAPL"), Decimal::ZERO);

        let orders = sizer.size_positions(
            &[long_signal("AAPL", dec!(0.8)), long_signal("GOOGL", dec!(0.6))],
            &empty_portfolio(),
            &market,
            &RiskConfig::default(),
        );

        // GOOGL is now the whole batch and receives the full allocation.
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].symbol.as_str(), "GOOGL");
        assert_eq!(orders[0].quantity, dec!(100000) / dec!(141.00));
    }
}

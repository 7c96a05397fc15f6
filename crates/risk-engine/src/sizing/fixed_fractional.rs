//! Fixed fractional position sizing.

use rust_decimal::Decimal;

use super::{side_for, PositionSizer};
use crate::config::RiskConfig;
use crate::error::{Result, RiskError};
use crate::models::{MarketState, OrderRequest, PortfolioState, Signal};

/// Allocate a fixed fraction of equity to each position.
///
/// ```text
/// quantity = equity * fraction / price
/// ```
///
/// Signal strength is ignored. The fraction defaults to
/// `config.risk_per_trade` and can be overridden per instance.
#[derive(Debug, Clone, Default)]
pub struct FixedFractionalSizer {
    fraction: Option<Decimal>,
}

impl FixedFractionalSizer {
    /// Create a sizer that uses `config.risk_per_trade`.
    #[must_use]
    pub const fn new() -> Self {
        Self { fraction: None }
    }

    /// Create a sizer with a fixed per-instance fraction.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfiguration`] if `fraction` is
    /// outside `(0, 1]`.
    pub fn with_fraction(fraction: Decimal) -> Result<Self> {
        if fraction <= Decimal::ZERO || fraction > Decimal::ONE {
            return Err(RiskError::InvalidConfiguration {
                field: "fraction",
                message: format!("{fraction} outside (0, 1]"),
            });
        }
        Ok(Self {
            fraction: Some(fraction),
        })
    }
}

impl PositionSizer for FixedFractionalSizer {
    fn name(&self) -> &'static str {
        "FixedFractionalSizer"
    }

    fn size_positions(
        &self,
        signals: &[Signal],
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> Vec<OrderRequest> {
        let equity = portfolio.equity();
        let allocation = equity * self.fraction.unwrap_or(config.risk_per_trade);

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

            let quantity = allocation / price;
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

//! Fractional-lot sizing for crypto venues.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{side_for, PositionSizer};
use crate::config::RiskConfig;
use crate::error::{Result, RiskError};
use crate::models::{MarketState, OrderRequest, PortfolioState, RoundDirection, RoundingPolicy, Signal};

/// Allocate a fraction of equity with fractional lot quantities.
///
/// Designed for crypto venues where sub-unit quantities are the norm.
/// Quantities are rounded down to a multiple of `step_qty`; anything that
/// rounds below `min_qty` is dropped rather than bumped up.
#[derive(Debug, Clone)]
pub struct CryptoFractionalSizer {
    fraction: Decimal,
    min_qty: Decimal,
    rounding: RoundingPolicy,
}

impl Default for CryptoFractionalSizer {
    fn default() -> Self {
        Self {
            fraction: dec!(0.02),
            min_qty: dec!(0.0001),
            rounding: RoundingPolicy::with_lot_size(dec!(0.0001)),
        }
    }
}

impl CryptoFractionalSizer {
    /// Create a sizer with explicit venue parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfiguration`] if `fraction` is
    /// outside `(0, 1]` or `min_qty`/`step_qty` are not positive.
    pub fn new(fraction: Decimal, min_qty: Decimal, step_qty: Decimal) -> Result<Self> {
        if fraction <= Decimal::ZERO || fraction > Decimal::ONE {
            return Err(RiskError::InvalidConfiguration {
                field: "fraction",
                message: format!("{fraction} outside (0, 1]"),
            });
        }
        if min_qty <= Decimal::ZERO {
            return Err(RiskError::InvalidConfiguration {
                field: "min_qty",
                message: format!("{min_qty} must be positive"),
            });
        }
        if step_qty <= Decimal::ZERO {
            return Err(RiskError::InvalidConfiguration {
                field: "step_qty",
                message: format!("{step_qty} must be positive"),
            });
        }
        Ok(Self {
            fraction,
            min_qty,
            rounding: RoundingPolicy::with_lot_size(step_qty),
        })
    }

    /// Allocation fraction of equity per position.
    #[must_use]
    pub const fn fraction(&self) -> Decimal {
        self.fraction
    }
}

impl PositionSizer for CryptoFractionalSizer {
    fn name(&self) -> &'static str {
        "CryptoFractionalSizer"
    }

    fn size_positions(
        &self,
        signals: &[Signal],
        portfolio: &PortfolioState,
        market: &MarketState,
        _config: &RiskConfig,
    ) -> Vec<OrderRequest> {
        let equity = portfolio.equity();
        let allocation = equity * self.fraction;

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

            let raw = allocation / price;
            let quantity = self.rounding.round_quantity(raw, RoundDirection::Down);
            if quantity <= Decimal::ZERO || quantity < self.min_qty {
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

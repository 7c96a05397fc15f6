//! Sector exposure constraint.

use rust_decimal::Decimal;
use std::collections::HashMap;

use super::{reject_missing_bar, split_exposure, Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, PortfolioState};

/// Limit exposure to any single sector.
///
/// Requires a sector map on the market state; without one the constraint
/// is a no-op rather than an error. Existing positions (at bar close)
/// and orders accepted earlier in the batch both count toward each
/// sector's cap of `max_sector_pct * equity`; symbols without a sector
/// entry pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectorExposureConstraint;

impl SectorExposureConstraint {
    /// Create the constraint.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for SectorExposureConstraint {
    fn name(&self) -> &'static str {
        "SectorExposureConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult {
        let Some(sector_map) = market.sector_map.as_ref() else {
            return ConstraintResult::pass_through(orders);
        };

        let equity = portfolio.equity();
        let max_sector_value = equity * config.max_sector_pct;

        // Current exposure per sector from existing positions, priced at
        // the bar close when available.
        let mut sector_exposure: HashMap<&str, Decimal> = HashMap::new();
        for (symbol, position) in &portfolio.positions {
            let Some(sector) = sector_map.get(symbol) else {
                continue;
            };
            let value = market
                .price(symbol)
                .map_or(position.market_value.abs(), |price| {
                    (position.quantity * price).abs()
                });
            *sector_exposure.entry(sector.as_str()).or_default() += value;
        }

        let mut result = ConstraintResult::default();

        for order in orders {
            let split = split_exposure(&order, portfolio);
            if split.opening == Decimal::ZERO {
                result.orders.push(order);
                continue;
            }

            let Some(sector) = sector_map.get(&order.symbol) else {
                result.orders.push(order);
                continue;
            };
            let Some(price) = market.price(&order.symbol) else {
                result.rejected.push(reject_missing_bar(self.name(), &order));
                continue;
            };

            let used = sector_exposure
                .get(sector.as_str())
                .copied()
                .unwrap_or_default();
            let room = max_sector_value - used;

            if room <= Decimal::ZERO {
                if split.closing > Decimal::ZERO {
                    result.rejected.push(RejectedOrder {
                        symbol: order.symbol.clone(),
                        constraint: self.name(),
                        reason: format!(
                            "sector '{sector}' at max exposure, trimmed to closing quantity"
                        ),
                        original_quantity: Some(order.quantity),
                    });
                    result.orders.push(order.with_quantity(split.closing, price));
                } else {
                    result.rejected.push(RejectedOrder {
                        symbol: order.symbol.clone(),
                        constraint: self.name(),
                        reason: format!(
                            "sector '{sector}' at max exposure ({} of equity)",
                            config.max_sector_pct
                        ),
                        original_quantity: None,
                    });
                }
                continue;
            }

            let opening_value = split.opening * price;
            if opening_value <= room {
                result.orders.push(order);
                *sector_exposure.entry(sector.as_str()).or_default() =
                    used + opening_value;
                continue;
            }

            let allowed_opening = room / price;
            let total = split.closing + allowed_opening;
            if total > Decimal::ZERO {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!(
                        "scaled from {} to {} (sector '{sector}' limit {})",
                        order.quantity, total, config.max_sector_pct
                    ),
                    original_quantity: Some(order.quantity),
                });
                result.orders.push(order.with_quantity(total, price));
                *sector_exposure.entry(sector.as_str()).or_default() =
                    used + allowed_opening * price;
            } else {
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason: format!("sector '{sector}' at max exposure, scaled to zero"),
                    original_quantity: None,
                });
            }
        }

        result
    }
}

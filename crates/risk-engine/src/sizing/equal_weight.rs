//! Equal dollar-weight position sizing.

use rust_decimal::Decimal;

use super::{side_for, PositionSizer};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, PortfolioState, Signal};

/// Allocate equal dollar weight to each signal.
///
/// Equity is divided evenly across the active (non-flat) signals,
/// ignoring volatility entirely. When the batch exceeds
/// `config.max_positions`, only the strongest signals participate
/// (ties broken by input position); output stays in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeightSizer;

impl EqualWeightSizer {
    /// Create the sizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PositionSizer for EqualWeightSizer {
    fn name(&self) -> &'static str {
        "EqualWeightSizer"
    }

    fn size_positions(
        &self,
        signals: &[Signal],
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> Vec<OrderRequest> {
        let active: Vec<usize> = signals
            .iter()
            .enumerate()
            .filter(|(_, s)| side_for(s.direction).is_some())
            .map(|(i, _)| i)
            .collect();
        if active.is_empty() {
            return Vec::new();
        }

        // Keep the strongest signals when over the position cap,
        // breaking strength ties by input position.
        let selected: Vec<usize> = if active.len() > config.max_positions {
            let mut ranked = active;
            ranked.sort_by(|&a, &b| {
                signals[b]
                    .strength
                    .cmp(&signals[a].strength)
                    .then(a.cmp(&b))
            });
            ranked.truncate(config.max_positions);
            ranked.sort_unstable();
            ranked
        } else {
            active
        };

        let equity = portfolio.equity();
        let allocation = equity / Decimal::from(selected.len() as u64);

        let mut orders = Vec::new();

        for idx in selected {
            let signal = &signals[idx];
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

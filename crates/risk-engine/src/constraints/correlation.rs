//! Correlation constraint.

use rust_decimal::Decimal;
use std::collections::HashSet;

use super::{split_exposure, Constraint, ConstraintResult, RejectedOrder};
use crate::config::RiskConfig;
use crate::models::{MarketState, OrderRequest, PortfolioState};

/// Limit exposure to highly correlated assets.
///
/// Requires both `config.max_correlation` and a correlation map on the
/// market state; missing either makes this a no-op. Two checks run, both
/// on absolute correlation so strongly anti-correlated pairs are treated
/// the same as strongly correlated ones:
///
/// 1. An exposure-increasing order whose symbol correlates beyond the
///    limit with an existing position is dropped.
/// 2. Among the remaining exposure-increasing orders, each offending
///    pair keeps the higher-strength side; equal strength keeps the
///    earlier order.
///
/// Exposure-reducing orders always pass. Missing pair data is treated as
/// uncorrelated.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationConstraint;

impl CorrelationConstraint {
    /// Create the constraint.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Constraint for CorrelationConstraint {
    fn name(&self) -> &'static str {
        "CorrelationConstraint"
    }

    fn apply(
        &self,
        orders: Vec<OrderRequest>,
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> ConstraintResult {
        let Some(max_correlation) = config.max_correlation else {
            return ConstraintResult::pass_through(orders);
        };
        if market.correlations.is_none() {
            return ConstraintResult::pass_through(orders);
        }

        let increasing: Vec<usize> = orders
            .iter()
            .enumerate()
            .filter(|(_, order)| split_exposure(order, portfolio).opening > Decimal::ZERO)
            .map(|(i, _)| i)
            .collect();

        let mut dropped: HashSet<usize> = HashSet::new();
        let mut reasons: Vec<(usize, String)> = Vec::new();

        // Check against existing holdings first.
        for &idx in &increasing {
            let order = &orders[idx];
            for held in portfolio.positions.keys() {
                if *held == order.symbol {
                    continue;
                }
                if let Some(corr) = market.correlation(&order.symbol, held)
                    && corr.abs() > max_correlation
                {
                    dropped.insert(idx);
                    reasons.push((
                        idx,
                        format!(
                            "highly correlated with held position {held} (|{corr}| > {max_correlation})"
                        ),
                    ));
                    break;
                }
            }
        }

        // Then pairwise among the surviving increasing orders: drop the
        // lower-strength side, later order on ties.
        for (a_pos, &a) in increasing.iter().enumerate() {
            if dropped.contains(&a) {
                continue;
            }
            for &b in &increasing[a_pos + 1..] {
                if dropped.contains(&b) || dropped.contains(&a) {
                    continue;
                }
                let Some(corr) = market.correlation(&orders[a].symbol, &orders[b].symbol)
                else {
                    continue;
                };
                if corr.abs() <= max_correlation {
                    continue;
                }
                let (loser, winner) = if orders[b].strength > orders[a].strength {
                    (a, b)
                } else {
                    (b, a)
                };
                dropped.insert(loser);
                reasons.push((
                    loser,
                    format!(
                        "highly correlated with {} (|{corr}| > {max_correlation})",
                        orders[winner].symbol
                    ),
                ));
            }
        }

        let mut result = ConstraintResult::default();
        for (idx, order) in orders.into_iter().enumerate() {
            if dropped.contains(&idx) {
                let reason = reasons
                    .iter()
                    .find(|(i, _)| *i == idx)
                    .map_or_else(String::new, |(_, r)| r.clone());
                result.rejected.push(RejectedOrder {
                    symbol: order.symbol.clone(),
                    constraint: self.name(),
                    reason,
                    original_quantity: None,
                });
            } else {
                result.orders.push(order);
            }
        }
        result
    }
}

//! Property tests for the numeric invariants the constraints promise.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use risk_engine::constraints::{
    Constraint, GrossLeverageConstraint, MaxPositionConstraint,
};
use risk_engine::{
    Bar, MarketState, OrderRequest, OrderSide, PortfolioState, RiskConfig, Symbol,
};

fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap()
}

fn bar(symbol: &str, close: Decimal) -> Bar {
    Bar {
        symbol: Symbol::new(symbol),
        open: close,
        high: close + dec!(1),
        low: close - dec!(1),
        close,
        volume: dec!(1000000),
        timestamp: ts(),
    }
}

/// Market covering SYM0..SYM4 at the given integer prices.
fn market_for(prices: &[i64]) -> MarketState {
    let mut bars = HashMap::new();
    let mut volatility = HashMap::new();
    let mut liquidity = HashMap::new();
    for (i, price) in prices.iter().enumerate() {
        let sym = Symbol::new(format!("SYM{i}"));
        bars.insert(sym.clone(), bar(&format!("SYM{i}"), Decimal::from(*price)));
        volatility.insert(sym.clone(), dec!(1));
        liquidity.insert(sym, dec!(1000000));
    }
    MarketState::new(bars, volatility, liquidity, ts())
}

fn buy_order(index: usize, quantity: i64, price: i64) -> OrderRequest {
    OrderRequest::new(
        Symbol::new(format!("SYM{index}")),
        OrderSide::Buy,
        Decimal::from(quantity),
        dec!(0.5),
        Decimal::from(price),
        ts(),
    )
}

proptest! {
    /// After GrossLeverageConstraint, the opening notional of a batch of
    /// fresh buys never exceeds max_gross_leverage * equity (up to
    /// decimal division rounding).
    #[test]
    fn gross_leverage_never_exceeded(
        quantities in proptest::collection::vec(1i64..5_000, 1..5),
        prices in proptest::collection::vec(1i64..500, 5),
        leverage_tenths in 1i64..30,
    ) {
        let constraint = GrossLeverageConstraint::new();
        let portfolio = PortfolioState::new(dec!(100000), HashMap::new(), ts());
        let market = market_for(&prices);
        let config = RiskConfig {
            max_gross_leverage: Decimal::new(leverage_tenths, 1),
            ..Default::default()
        };

        let orders: Vec<OrderRequest> = quantities
            .iter()
            .enumerate()
            .map(|(i, &qty)| buy_order(i, qty, prices[i]))
            .collect();

        let outcome = constraint.apply(orders, &portfolio, &market, &config);

        let total: Decimal = outcome.orders.iter().map(|o| o.notional).sum();
        let limit = dec!(100000) * config.max_gross_leverage;
        prop_assert!(
            total <= limit + dec!(0.001),
            "total {} exceeds limit {}",
            total,
            limit
        );
    }

    /// MaxPositionConstraint never increases a quantity and never caps a
    /// resulting position above max_position_pct * equity.
    #[test]
    fn max_position_never_grows_orders(
        quantities in proptest::collection::vec(1i64..5_000, 1..5),
        prices in proptest::collection::vec(1i64..500, 5),
    ) {
        let constraint = MaxPositionConstraint::new();
        let portfolio = PortfolioState::new(dec!(100000), HashMap::new(), ts());
        let market = market_for(&prices);
        let config = RiskConfig::default();

        let orders: Vec<OrderRequest> = quantities
            .iter()
            .enumerate()
            .map(|(i, &qty)| buy_order(i, qty, prices[i]))
            .collect();
        let originals: HashMap<Symbol, Decimal> = orders
            .iter()
            .map(|o| (o.symbol.clone(), o.quantity))
            .collect();

        let outcome = constraint.apply(orders, &portfolio, &market, &config);

        let cap = dec!(100000) * config.max_position_pct;
        for order in &outcome.orders {
            prop_assert!(order.quantity <= originals[&order.symbol]);
            prop_assert!(
                order.notional <= cap + dec!(0.001),
                "notional {} exceeds cap {}",
                order.notional,
                cap
            );
        }
    }

    /// Constraint application preserves input order of the survivors.
    #[test]
    fn constraints_preserve_relative_order(
        quantities in proptest::collection::vec(1i64..5_000, 1..5),
        prices in proptest::collection::vec(1i64..500, 5),
    ) {
        let constraint = GrossLeverageConstraint::new();
        let portfolio = PortfolioState::new(dec!(100000), HashMap::new(), ts());
        let market = market_for(&prices);

        let orders: Vec<OrderRequest> = quantities
            .iter()
            .enumerate()
            .map(|(i, &qty)| buy_order(i, qty, prices[i]))
            .collect();
        let input_symbols: Vec<Symbol> = orders.iter().map(|o| o.symbol.clone()).collect();

        let outcome = constraint.apply(orders, &portfolio, &market, &RiskConfig::default());

        // Survivors appear in the same relative order as the input.
        let mut cursor = 0usize;
        for order in &outcome.orders {
            let pos = input_symbols[cursor..]
                .iter()
                .position(|s| *s == order.symbol)
                .expect("survivor not found after cursor: order was re-sorted");
            cursor += pos + 1;
        }
    }
}

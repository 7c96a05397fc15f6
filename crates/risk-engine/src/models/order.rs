//! Candidate orders produced by sizing and shaped by constraints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Symbol;

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy (opens/extends longs, covers shorts).
    Buy,
    /// Sell (closes/reduces longs, opens/extends shorts).
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// A sized candidate order.
///
/// Created by a sizing strategy, then scaled down or dropped by the
/// constraint chain. Quantities are unsigned; the side carries direction.
/// `notional` is kept in sync with `quantity` on every rescale so
/// downstream constraints can compare money amounts without re-pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Buy or sell.
    pub side: OrderSide,
    /// Unsigned quantity.
    pub quantity: Decimal,
    /// Strength of the originating signal, kept for prioritization.
    pub strength: Decimal,
    /// Quantity times reference price at creation/rescale time.
    pub notional: Decimal,
    /// Timestamp inherited from the originating signal (UTC).
    pub timestamp: DateTime<Utc>,
}

impl OrderRequest {
    /// Create a new order, deriving notional from the reference price.
    #[must_use]
    pub fn new(
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        strength: Decimal,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            side,
            quantity,
            strength,
            notional: quantity * price,
            timestamp,
        }
    }

    /// Return a copy rescaled to `quantity`, with notional recomputed
    /// against `price`.
    #[must_use]
    pub fn with_quantity(&self, quantity: Decimal, price: Decimal) -> Self {
        Self {
            quantity,
            notional: quantity * price,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn notional_derived_from_price() {
        let order = OrderRequest::new(
            Symbol::new("AAPL"),
            OrderSide::Buy,
            dec!(10),
            dec!(0.8),
            dec!(151.50),
            Utc::now(),
        );
        assert_eq!(order.notional, dec!(1515.00));
    }

    #[test]
    fn with_quantity_rescales_notional() {
        let order = OrderRequest::new(
            Symbol::new("AAPL"),
            OrderSide::Buy,
            dec!(10),
            dec!(0.8),
            dec!(100),
            Utc::now(),
        );
        let scaled = order.with_quantity(dec!(4), dec!(100));
        assert_eq!(scaled.quantity, dec!(4));
        assert_eq!(scaled.notional, dec!(400));
        assert_eq!(scaled.strength, order.strength);
    }

    #[test]
    fn order_side_display() {
        assert_eq!(OrderSide::Buy.to_string(), "buy");
        assert_eq!(OrderSide::Sell.to_string(), "sell");
    }
}

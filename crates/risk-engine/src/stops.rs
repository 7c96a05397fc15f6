//! ATR-based protective price levels.
//!
//! Pure functions over entry price and volatility:
//! - Long:  stop below entry, target above entry
//! - Short: stop above entry, target below entry

use rust_decimal::Decimal;

use crate::models::OrderSide;

/// Stop-loss price for an entry at `entry` with the given ATR distance.
///
/// `side` is the entry order's side: buys are long entries, sells are
/// short entries.
#[must_use]
pub fn stop_loss(side: OrderSide, entry: Decimal, atr: Decimal, atr_mult: Decimal) -> Decimal {
    let distance = atr * atr_mult;
    match side {
        OrderSide::Buy => entry - distance,
        OrderSide::Sell => entry + distance,
    }
}

/// Take-profit price, mirroring [`stop_loss`] on the other side of entry.
#[must_use]
pub fn take_profit(side: OrderSide, entry: Decimal, atr: Decimal, atr_mult: Decimal) -> Decimal {
    let distance = atr * atr_mult;
    match side {
        OrderSide::Buy => entry + distance,
        OrderSide::Sell => entry - distance,
    }
}

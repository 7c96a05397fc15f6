//! Position sizing strategies.
//!
//! Each sizer is a stateless transformation from a batch of signals to a
//! batch of candidate orders. Sizers take the whole batch (not one signal
//! at a time) so batch-level strategies like risk parity can normalize
//! across it.
//!
//! Common behavior shared by every sizer:
//! - Flat signals produce nothing.
//! - Signals whose symbol lacks a bar (or, where needed, volatility) are
//!   skipped silently; missing data is never an error at this stage.
//! - Short signals produce sell orders sized exactly like the long case.
//! - Quantities stay fractional; lot rounding belongs to the execution
//!   layer (see [`crate::models::RoundingPolicy`]), except where a sizer's
//!   own contract includes a step size.

mod crypto_fractional;
mod equal_weight;
mod fixed_fractional;
mod kelly;
mod risk_parity;
mod volatility;

pub use crypto_fractional::CryptoFractionalSizer;
pub use equal_weight::EqualWeightSizer;
pub use fixed_fractional::FixedFractionalSizer;
pub use kelly::KellySizer;
pub use risk_parity::RiskParitySizer;
pub use volatility::VolatilitySizer;

use crate::config::RiskConfig;
use crate::models::{Direction, MarketState, OrderRequest, OrderSide, PortfolioState, Signal};

/// A position sizing strategy.
///
/// Implementations must be pure: no side effects, no cross-call state.
/// The engine accepts any conforming implementation.
pub trait PositionSizer {
    /// Strategy name for logging and audit.
    fn name(&self) -> &'static str;

    /// Size the signal batch into candidate orders.
    ///
    /// Output preserves the relative order of the input signals.
    fn size_positions(
        &self,
        signals: &[Signal],
        portfolio: &PortfolioState,
        market: &MarketState,
        config: &RiskConfig,
    ) -> Vec<OrderRequest>;
}

/// Map a directional signal to an order side; `None` for flat signals.
pub(crate) fn side_for(direction: Direction) -> Option<OrderSide> {
    match direction {
        Direction::Long => Some(OrderSide::Buy),
        Direction::Short => Some(OrderSide::Sell),
        Direction::Flat => None,
    }
}

//! Provider-specific quantity rounding rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rounding direction for lot snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundDirection {
    /// Round toward zero (conservative default).
    Down,
    /// Round away from zero.
    Up,
    /// Round to the nearest lot.
    Nearest,
}

/// Venue quantity rules, passed in to keep the pipeline provider-agnostic.
///
/// Different venues have different minimum tradeable units (1 share for
/// stocks, 0.001 for BTC) and minimum order values; this captures them
/// without coupling the pipeline to any one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    /// Minimum tradeable unit; quantities snap to multiples of this.
    pub lot_size: Decimal,
    /// Minimum order value in quote currency.
    pub min_notional: Decimal,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            lot_size: Decimal::ONE,
            min_notional: Decimal::ONE,
        }
    }
}

impl RoundingPolicy {
    /// Create a policy with the given lot size and a 1-unit minimum notional.
    #[must_use]
    pub fn with_lot_size(lot_size: Decimal) -> Self {
        Self {
            lot_size,
            ..Self::default()
        }
    }

    /// Snap `qty` to a multiple of the lot size.
    ///
    /// A zero lot size leaves the quantity untouched.
    #[must_use]
    pub fn round_quantity(&self, qty: Decimal, direction: RoundDirection) -> Decimal {
        if qty == Decimal::ZERO || self.lot_size == Decimal::ZERO {
            return qty;
        }

        let lots = qty / self.lot_size;
        let rounded_lots = match direction {
            RoundDirection::Down => lots.floor(),
            RoundDirection::Up => lots.ceil(),
            RoundDirection::Nearest => lots.round(),
        };
        rounded_lots * self.lot_size
    }
}

//! OHLCV bar data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Symbol;
use crate::error::{Result, RiskError};

/// A single OHLCV bar, the most recent one per symbol being traded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Symbol this bar belongs to.
    pub symbol: Symbol,
    /// Opening price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Traded volume.
    pub volume: Decimal,
    /// Bar timestamp (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Bar {
    /// Validate that the bar contains no impossible values.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidMarketData`] for negative prices or volume.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ] {
            if value < Decimal::ZERO {
                return Err(RiskError::InvalidMarketData {
                    symbol: self.symbol.to_string(),
                    message: format!("negative {name}: {value}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_bar() -> Bar {
        Bar {
            symbol: Symbol::new("AAPL"),
            open: dec!(150.00),
            high: dec!(152.00),
            low: dec!(149.00),
            close: dec!(151.50),
            volume: dec!(1000000),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn valid_bar_passes() {
        assert!(sample_bar().validate().is_ok());
    }

    #[test]
    fn negative_close_rejected() {
        let mut bar = sample_bar();
        bar.close = dec!(-1);
        let err = bar.validate().unwrap_err();
        assert!(matches!(err, RiskError::InvalidMarketData { .. }));
    }
}

//! Error types for the risk pipeline.
//!
//! Only malformed inputs surface as errors. Business-level outcomes
//! (missing market data, constraint rejections, trading halts) are
//! expressed through the shape of [`crate::engine::RiskResult`] instead.

use thiserror::Error;

/// Fatal input errors raised by the risk pipeline.
///
/// These indicate a configuration or data problem on the caller's side,
/// not a risk decision. Everything the pipeline decides on its own
/// (skipped signals, scaled or dropped orders, halts) is reported in the
/// result, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    /// A configuration value is outside its valid domain.
    #[error("invalid risk configuration [{field}]: {message}")]
    InvalidConfiguration {
        /// Configuration field that failed validation.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Market data contains an impossible value (negative price or volatility).
    #[error("invalid market data for {symbol}: {message}")]
    InvalidMarketData {
        /// Symbol the bad data was supplied for.
        symbol: String,
        /// What was wrong with it.
        message: String,
    },

    /// A signal or portfolio field is outside its valid domain.
    #[error("invalid input [{field}]: {message}")]
    InvalidInput {
        /// Input field that failed validation.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RiskError>;

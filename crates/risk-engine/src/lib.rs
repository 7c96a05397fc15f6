// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Risk Engine - Rust Core Library
//!
//! A pure, synchronous pipeline that turns trading signals into
//! risk-adjusted, sized orders. It sits between a signal generator and
//! an execution layer: given candidate signals, current holdings, market
//! conditions and a risk configuration, it produces a bounded order set,
//! protective stop/target prices and a trading-halt decision.
//!
//! # Pipeline
//!
//! ```text
//! Signals + PortfolioState + MarketState + RiskConfig
//!     -> halt check -> sizing -> constraint chain -> stops/targets
//!     -> RiskResult
//! ```
//!
//! - **Sizers** ([`sizing`]): pluggable strategies mapping signals to
//!   candidate order quantities (volatility-normalized, equal weight,
//!   Kelly, fixed fractional, risk parity, crypto fractional).
//! - **Constraints** ([`constraints`]): an ordered chain that scales or
//!   drops orders against position, leverage, sector, correlation,
//!   buying-power and frequency limits.
//! - **Stops** ([`stops`]): ATR-based stop-loss / take-profit levels.
//! - **Halt** ([`halt`]): drawdown / daily-loss / equity-floor checks
//!   from caller-supplied equity baselines.
//! - **Engine** ([`engine`]): sequences the above deterministically.
//!
//! The pipeline performs no I/O, holds no mutable cross-call state and
//! uses decimal arithmetic ([`rust_decimal`]) for every money and
//! quantity field; identical inputs always produce identical results.
//! Callers wanting parallelism across portfolios invoke the pipeline
//! once per portfolio from independent tasks.
//!
//! # Errors
//!
//! Only malformed inputs raise [`RiskError`]. Missing market data skips
//! the affected signal; constraint rejections and halts are recorded in
//! the [`RiskResult`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod halt;
pub mod models;
pub mod sizing;
pub mod stops;

pub use config::RiskConfig;
pub use engine::{RiskEngine, RiskResult};
pub use error::{Result, RiskError};
pub use halt::HaltReason;
pub use models::{
    Bar, Direction, MarketState, OrderRequest, OrderSide, PortfolioState, Position,
    RoundDirection, RoundingPolicy, Signal, Symbol,
};

//! Settlement for OpenETS
//!
//! This crate prices every net position at the clearing price and rolls the
//! results up into a market summary.
//!
//! Buyers pay `net_position × price`, sellers receive `|net_position| × price`.
//! Every amount is also expressed per unit of output, and the per-unit net
//! cashflow in the local reporting currency.

pub mod error;
pub mod settle;
pub mod summary;

pub use error::SettlementError;
pub use settle::{settle, Settlement, SettlementCalculator};
pub use summary::{MarketSummary, SummaryBuilder};

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, SettlementError>;

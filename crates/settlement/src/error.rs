//! Settlement error types

use thiserror::Error;

/// Errors that can occur while setting up settlement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettlementError {
    /// Exchange rate must be positive
    #[error("Invalid exchange rate: {0}")]
    InvalidFxRate(f64),

    /// Settlement price must be finite and non-negative
    #[error("Invalid settlement price: {0}")]
    InvalidPrice(f64),
}

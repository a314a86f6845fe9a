//! Clearing engine error types

use thiserror::Error;

/// Market parameters that make a clearing run impossible
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClearingError {
    /// price_max must exceed price_min
    #[error("Invalid price bounds: price_max ({max}) must be greater than price_min ({min})")]
    InvalidPriceBounds { min: f64, max: f64 },

    /// Candidate price step must be positive
    #[error("Invalid price step: {0}")]
    InvalidPriceStep(f64),

    /// Auction supply share must be positive
    #[error("Invalid auction supply share: {0}")]
    InvalidSupplyShare(f64),
}

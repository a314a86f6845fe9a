//! Result of a clearing run

use config::PricingRegime;
use serde::Serialize;

/// Resolved price plus the aggregates it was derived from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearingOutcome {
    pub price: f64,
    pub regime: PricingRegime,
    /// Σ net position over buyers
    pub total_demand: f64,
    /// Σ |net position| over sellers, or the auctioned volume
    pub total_supply: f64,
    pub buyer_count: usize,
    pub seller_count: usize,
    /// Candidate prices evaluated (market clearing only)
    pub evaluations: usize,
}

impl ClearingOutcome {
    /// Check if the market has anyone to clear
    pub fn has_buyers(&self) -> bool {
        self.buyer_count > 0
    }
}

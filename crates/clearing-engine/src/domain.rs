//! Domain types for the Clearing Engine

use crate::error::ClearingError;
use serde::Serialize;

// ============================================================================
// Price Bounds
// ============================================================================

/// Closed price interval `[min, max]` with `min < max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBounds {
    min: f64,
    max: f64,
}

impl PriceBounds {
    pub fn new(min: f64, max: f64) -> Result<Self, ClearingError> {
        if !(min.is_finite() && max.is_finite() && max > min) {
            return Err(ClearingError::InvalidPriceBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Clamp `price` into the interval. `NaN` maps to `min`.
    pub fn clamp(&self, price: f64) -> f64 {
        if price.is_nan() {
            self.min
        } else {
            price.clamp(self.min, self.max)
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        (self.min..=self.max).contains(&price)
    }
}

// ============================================================================
// Quote & Participant
// ============================================================================

/// Willingness to pay (bid) and to sell (ask) of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
}

/// One entity as seen by the clearing procedures
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Participant {
    /// Positive for buyers, negative for sellers
    pub net_position: f64,
    pub bid: f64,
    pub ask: f64,
}

impl Participant {
    pub fn new(net_position: f64, quote: Quote) -> Self {
        Self {
            net_position,
            bid: quote.bid,
            ask: quote.ask,
        }
    }

    pub fn is_buyer(&self) -> bool {
        self.net_position > 0.0
    }

    pub fn is_seller(&self) -> bool {
        self.net_position < 0.0
    }
}

//! Clearing Engine for OpenETS
//!
//! This crate resolves the single allowance price of a snapshot.
//!
//! # Core Components
//!
//! - [`curve`] - Per-entity bid and ask prices from the intensity gap
//! - [`clearing`] - The three pricing procedures and the engine that runs them
//! - [`domain`] - Participants and price bounds
//!
//! # Key Invariants
//!
//! - The clearing price always lies within `[price_min, price_max]`
//! - No buyers is a well-defined market state resolved to `price_min`
//! - Binary and linear market clearing search return the same price

pub mod clearing;
pub mod curve;
pub mod domain;
pub mod error;
pub mod result;

pub use clearing::{
    procedure_for, AuctionClearing, AverageComplianceCost, ClearingEngine, MarketClearing,
    PricingProcedure,
};
pub use curve::{build_curve, CurveBuilder};
pub use domain::{Participant, PriceBounds, Quote};
pub use error::ClearingError;
pub use result::ClearingOutcome;

/// Result type for clearing operations
pub type Result<T> = std::result::Result<T, ClearingError>;

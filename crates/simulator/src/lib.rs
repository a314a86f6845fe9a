//! Snapshot Simulator for OpenETS
//!
//! Runs the full single-period pipeline over a set of entity records:
//!
//! 1. Record validation (strict, or dropping invalid rows)
//! 2. Scope exclusions and the optional outlier filter
//! 3. Benchmarks per fuel group
//! 4. Allocation and net positions
//! 5. Bid/ask curves and the clearing price
//! 6. Settlement and the market summary
//!
//! A [`Simulator`] is built once from a validated configuration and can run
//! any number of independent snapshots. Runs share no mutable state, so two
//! scenarios can be evaluated in parallel with [`run_parallel`].

pub mod compare;
pub mod error;
pub mod pipeline;
pub mod snapshot;

pub use compare::{run_parallel, EntityDelta, ScenarioComparison};
pub use error::SimulationError;
pub use pipeline::Simulator;
pub use snapshot::{EntityResult, MarketSnapshot};

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimulationError>;

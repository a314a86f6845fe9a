//! Benchmark Engine for OpenETS
//!
//! This crate turns validated entities into the reference intensities that
//! drive free allocation.
//!
//! # Core Components
//!
//! - [`intensity`] - Emission intensity per entity (emissions / output)
//! - [`engine`] - Per fuel group benchmarks under the configured strategy
//! - [`filter`] - Scope exclusions and outlier removal applied before benchmarking
//!
//! # Key Invariants
//!
//! - Benchmarks are recomputed from scratch on every call
//! - Ties in intensity keep input order, so results are reproducible
//! - Every entity receives exactly one assigned benchmark (and one tier under `two_tier`)

pub mod engine;
pub mod error;
pub mod filter;
pub mod intensity;
pub mod types;

pub use engine::compute_benchmarks;
pub use error::BenchmarkError;
pub use filter::{apply_scope, filter_outliers};
pub use intensity::{intensities, intensity, try_intensity};
pub use types::{Assignment, BenchmarkTable, GroupBenchmark, Tier};

/// Result type for benchmark operations
pub type Result<T> = std::result::Result<T, BenchmarkError>;

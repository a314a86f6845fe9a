//! Simulation error types

use benchmark::BenchmarkError;
use clearing_engine::ClearingError;
use config::ConfigError;
use settlement::SettlementError;
use thiserror::Error;

/// Errors that end a simulation run. None of them is retried.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Configuration rejected before any computation
    #[error(
        "Invalid configuration: {}",
        .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
    )]
    Configuration(Vec<ConfigError>),

    /// Missing or invalid entity field
    #[error(transparent)]
    Input(#[from] common::Error),

    #[error(transparent)]
    Benchmark(#[from] BenchmarkError),

    #[error(transparent)]
    Clearing(#[from] ClearingError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    /// A parallel scenario worker panicked or was cancelled
    #[error("Worker failed: {0}")]
    Worker(String),
}

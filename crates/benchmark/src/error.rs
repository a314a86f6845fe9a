//! Benchmark engine error types

use thiserror::Error;

/// Errors that can occur while computing benchmarks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BenchmarkError {
    /// An entity lacks a field the selected strategy needs
    #[error(transparent)]
    Input(#[from] common::Error),
}

//! Prometheus metrics infrastructure
//!
//! This module provides utilities for initializing Prometheus metrics
//! and the metric set recorded by simulation runs. Without an installed
//! exporter every recording is a no-op.

use metrics::{counter, gauge, histogram, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Initialize the Prometheus metrics exporter
///
/// This starts an HTTP server on the specified port that exposes metrics
/// at the `/metrics` endpoint.
///
/// # Example
///
/// ```ignore
/// observability::metrics::init_metrics(9090)?;
/// // Metrics available at http://localhost:9090/metrics
/// ```
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Simulation run metrics
///
/// # Metrics
///
/// * `ets_simulation_runs_total{regime}` - Completed runs
/// * `ets_simulation_duration_seconds` - Run duration histogram
/// * `ets_clearing_price{regime}` - Last resolved clearing price
/// * `ets_entities_processed_total` - Entities that reached settlement
/// * `ets_entities_excluded_total{reason}` - Entities dropped before benchmarking
#[derive(Clone)]
pub struct SimulationMetrics {
    run_duration: Histogram,
    scenario: String,
}

impl SimulationMetrics {
    pub fn new(scenario: &str) -> Self {
        Self {
            run_duration: histogram!("ets_simulation_duration_seconds", "scenario" => scenario.to_string()),
            scenario: scenario.to_string(),
        }
    }

    /// Record a completed run
    pub fn record_run(&self, regime: &str, duration: Duration, clearing_price: f64) {
        counter!("ets_simulation_runs_total", "regime" => regime.to_string()).increment(1);
        gauge!("ets_clearing_price", "regime" => regime.to_string()).set(clearing_price);
        self.run_duration.record(duration.as_secs_f64());
    }

    pub fn record_processed(&self, count: usize) {
        counter!("ets_entities_processed_total", "scenario" => self.scenario.clone())
            .increment(count as u64);
    }

    pub fn record_excluded(&self, reason: &'static str) {
        counter!("ets_entities_excluded_total", "reason" => reason).increment(1);
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }
}

/// Run timer that records the run when dropped
///
/// ```ignore
/// let metrics = SimulationMetrics::new("reference");
/// {
///     let mut guard = RunMetricsGuard::new(&metrics, "market_clearing");
///     // ... run ...
///     guard.set_price(12.5);
/// } // Duration recorded here
/// ```
pub struct RunMetricsGuard<'a> {
    metrics: &'a SimulationMetrics,
    regime: &'static str,
    start: Instant,
    price: Option<f64>,
}

impl<'a> RunMetricsGuard<'a> {
    pub fn new(metrics: &'a SimulationMetrics, regime: &'static str) -> Self {
        Self {
            metrics,
            regime,
            start: Instant::now(),
            price: None,
        }
    }

    /// Mark the run as completed at `price`
    pub fn set_price(&mut self, price: f64) {
        self.price = Some(price);
    }
}

impl Drop for RunMetricsGuard<'_> {
    fn drop(&mut self) {
        // Failed runs are not counted
        if let Some(price) = self.price {
            self.metrics
                .record_run(self.regime, self.start.elapsed(), price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_metrics_without_exporter() {
        // Recording without an installed recorder must not panic
        let metrics = SimulationMetrics::new("test");
        assert_eq!(metrics.scenario(), "test");
        metrics.record_processed(3);
        metrics.record_excluded("outlier");

        let mut guard = RunMetricsGuard::new(&metrics, "market_clearing");
        guard.set_price(10.0);
    }
}

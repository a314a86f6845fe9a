use benchmark::{BenchmarkTable, Tier};
use clearing_engine::ClearingOutcome;
use common::{EntityId, Exclusion, FuelGroup};
use config::SimulationConfig;
use serde::Serialize;
use settlement::MarketSummary;

/// One output row per entity that took part in the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityResult {
    pub id: EntityId,
    pub fuel_group: FuelGroup,
    pub output: f64,
    pub emissions: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    pub intensity: f64,
    /// Benchmark the entity was measured against
    pub benchmark: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    pub allocation_intensity: f64,
    pub transitional_compensation: f64,
    pub free_allocation: f64,
    pub net_position: f64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub cost: f64,
    pub revenue: f64,
    pub net_cashflow: f64,
    pub cost_per_unit: f64,
    pub revenue_per_unit: f64,
    pub net_cashflow_per_unit: f64,
    pub net_cashflow_local_per_unit: f64,
}

/// Immutable result of one run.
///
/// Re-running with another configuration produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub scenario: String,
    pub config: SimulationConfig,
    pub benchmarks: BenchmarkTable,
    pub clearing: ClearingOutcome,
    pub rows: Vec<EntityResult>,
    pub summary: MarketSummary,
    pub excluded: Vec<Exclusion>,
}

impl MarketSnapshot {
    pub fn clearing_price(&self) -> f64 {
        self.clearing.price
    }

    pub fn row(&self, id: &str) -> Option<&EntityResult> {
        self.rows.iter().find(|r| r.id.as_str() == id)
    }
}

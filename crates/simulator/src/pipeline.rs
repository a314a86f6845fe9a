use crate::error::SimulationError;
use crate::snapshot::{EntityResult, MarketSnapshot};
use crate::Result;
use allocation::AllocationCalculator;
use benchmark::{apply_scope, compute_benchmarks, filter_outliers, try_intensity};
use clearing_engine::{ClearingEngine, CurveBuilder, Participant};
use common::{Entity, EntityRecord, Exclusion, ExclusionReason, FuelGroup};
use config::{validate_config, BenchmarkStrategy, SimulationConfig};
use observability::{RunMetricsGuard, SimulationMetrics};
use settlement::{SettlementCalculator, SummaryBuilder};
use tracing::{debug, info, instrument, warn};

/// Snapshot pipeline bound to one validated configuration
pub struct Simulator {
    config: SimulationConfig,
    strategy: BenchmarkStrategy,
    allocation: AllocationCalculator,
    curves: CurveBuilder,
    clearing: ClearingEngine,
    metrics: SimulationMetrics,
}

impl Simulator {
    /// Validate `config` and build the pipeline.
    ///
    /// Any configuration error fails here, before an entity is read.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let report = validate_config(&config);
        for warning in &report.warnings {
            warn!(field = %warning.field, "{}", warning.message);
        }
        for default in &report.defaults_applied {
            debug!(field = %default.field, value = %default.value, "Default applied");
        }
        if !report.is_valid() {
            return Err(SimulationError::Configuration(report.errors));
        }

        let clearing = ClearingEngine::new(&config.market)?;
        let curves = CurveBuilder::new(clearing.bounds(), config.curve.clone());

        Ok(Self {
            strategy: config.benchmark.strategy(),
            allocation: AllocationCalculator::new(config.allocation.clone()),
            curves,
            clearing,
            metrics: SimulationMetrics::new(&config.scenario.name),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn strategy(&self) -> BenchmarkStrategy {
        self.strategy
    }

    /// Run the pipeline over raw input records.
    ///
    /// An invalid record fails the run unless `cleaning.drop_invalid` is set,
    /// in which case it is reported as excluded.
    #[instrument(skip_all, fields(scenario = %self.config.scenario.name, records = records.len()))]
    pub fn run(&self, records: &[EntityRecord]) -> Result<MarketSnapshot> {
        let mut entities = Vec::with_capacity(records.len());
        let mut excluded = Vec::new();

        for (row, record) in records.iter().enumerate() {
            match record.clone().into_entity(row) {
                Ok(entity) => entities.push(entity),
                Err(err) if self.config.cleaning.drop_invalid => {
                    warn!(record = %record.label(row), error = %err, "Dropping invalid record");
                    excluded.push(Exclusion {
                        entity: record.label(row),
                        fuel_group: record
                            .fuel_group
                            .as_deref()
                            .map(str::trim)
                            .filter(|g| !g.is_empty())
                            .map(FuelGroup::new),
                        intensity: None,
                        reason: ExclusionReason::InvalidRecord {
                            message: err.to_string(),
                        },
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.run_with_exclusions(entities, excluded)
    }

    /// Run the pipeline over already-built entities.
    ///
    /// Entities are checked against the same rules as input records.
    pub fn run_entities(&self, entities: Vec<Entity>) -> Result<MarketSnapshot> {
        for (row, entity) in entities.iter().enumerate() {
            EntityRecord::from(entity).into_entity(row)?;
        }
        self.run_with_exclusions(entities, Vec::new())
    }

    fn run_with_exclusions(
        &self,
        entities: Vec<Entity>,
        mut excluded: Vec<Exclusion>,
    ) -> Result<MarketSnapshot> {
        let mut guard = RunMetricsGuard::new(&self.metrics, self.clearing.regime().as_str());

        let (entities, scoped_out) = apply_scope(entities, &self.config.scope);
        excluded.extend(scoped_out);
        let (entities, outliers) = filter_outliers(entities, &self.config.cleaning.outlier_filter);
        excluded.extend(outliers);

        for exclusion in &excluded {
            self.metrics.record_excluded(exclusion.reason.as_str());
        }

        let benchmarks = compute_benchmarks(&entities, self.strategy)?;

        let mut staged = Vec::with_capacity(entities.len());
        let mut participants = Vec::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            let own = try_intensity(entity.output, entity.emissions)?;
            let assignment = benchmarks.assignments[index];
            let allocation = self.allocation.allocate(entity, assignment.benchmark);
            let quote = self.curves.quote(own, assignment.benchmark);

            participants.push(Participant::new(allocation.net_position, quote));
            staged.push((own, assignment, allocation, quote));
        }

        let clearing = self.clearing.clear(&participants);
        let settlement = SettlementCalculator::new(clearing.price, self.config.reporting.fx_rate)?;

        let mut summary = SummaryBuilder::new();
        let rows: Vec<EntityResult> = entities
            .into_iter()
            .zip(staged)
            .map(|(entity, (own, assignment, allocation, quote))| {
                let settled = settlement.settle(allocation.net_position, entity.output);
                summary.add(&entity, allocation.free_allocation, allocation.net_position, &settled);

                EntityResult {
                    id: entity.id,
                    fuel_group: entity.fuel_group,
                    output: entity.output,
                    emissions: entity.emissions,
                    capacity: entity.capacity,
                    intensity: own,
                    benchmark: assignment.benchmark,
                    tier: assignment.tier,
                    allocation_intensity: allocation.allocation_intensity,
                    transitional_compensation: allocation.transitional_compensation,
                    free_allocation: allocation.free_allocation,
                    net_position: allocation.net_position,
                    bid_price: quote.bid,
                    ask_price: quote.ask,
                    cost: settled.cost,
                    revenue: settled.revenue,
                    net_cashflow: settled.net_cashflow,
                    cost_per_unit: settled.cost_per_unit,
                    revenue_per_unit: settled.revenue_per_unit,
                    net_cashflow_per_unit: settled.net_cashflow_per_unit,
                    net_cashflow_local_per_unit: settled.net_cashflow_local_per_unit,
                }
            })
            .collect();
        let summary = summary.finish(clearing.price, self.config.reporting.fx_rate);

        self.metrics.record_processed(rows.len());
        guard.set_price(clearing.price);

        info!(
            scenario = %self.config.scenario.name,
            strategy = %self.strategy,
            regime = %clearing.regime,
            price = clearing.price,
            entities = rows.len(),
            excluded = excluded.len(),
            "Snapshot computed"
        );

        Ok(MarketSnapshot {
            scenario: self.config.scenario.name.clone(),
            config: self.config.clone(),
            benchmarks,
            clearing,
            rows,
            summary,
            excluded,
        })
    }
}

//! Side-by-side evaluation of two scenarios over the same entities

use crate::error::SimulationError;
use crate::pipeline::Simulator;
use crate::snapshot::MarketSnapshot;
use crate::Result;
use common::{EntityId, EntityRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Per-entity difference between two snapshots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDelta {
    pub id: EntityId,
    /// `None` when the entity is absent from the reference snapshot
    pub reference_net_cashflow: Option<f64>,
    /// `None` when the entity is absent from the alternative snapshot
    pub alternative_net_cashflow: Option<f64>,
    /// Alternative minus reference, when present in both
    pub net_cashflow_delta: Option<f64>,
    pub net_cashflow_per_unit_delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub reference: String,
    pub alternative: String,
    pub reference_price: f64,
    pub alternative_price: f64,
    /// Alternative minus reference
    pub price_delta: f64,
    pub entities: Vec<EntityDelta>,
}

impl ScenarioComparison {
    /// Pair rows by entity id. Reference order comes first, followed by
    /// entities only present in the alternative.
    pub fn between(reference: &MarketSnapshot, alternative: &MarketSnapshot) -> Self {
        let by_id: BTreeMap<&EntityId, usize> = alternative
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (&row.id, i))
            .collect();
        let mut paired = vec![false; alternative.rows.len()];

        let mut entities = Vec::with_capacity(reference.rows.len());
        for row in &reference.rows {
            let other = by_id.get(&row.id).map(|&i| {
                paired[i] = true;
                &alternative.rows[i]
            });
            entities.push(EntityDelta {
                id: row.id.clone(),
                reference_net_cashflow: Some(row.net_cashflow),
                alternative_net_cashflow: other.map(|o| o.net_cashflow),
                net_cashflow_delta: other.map(|o| o.net_cashflow - row.net_cashflow),
                net_cashflow_per_unit_delta: other
                    .map(|o| o.net_cashflow_per_unit - row.net_cashflow_per_unit),
            });
        }

        for (row, _) in alternative.rows.iter().zip(&paired).filter(|(_, p)| !**p) {
            entities.push(EntityDelta {
                id: row.id.clone(),
                reference_net_cashflow: None,
                alternative_net_cashflow: Some(row.net_cashflow),
                net_cashflow_delta: None,
                net_cashflow_per_unit_delta: None,
            });
        }

        Self {
            reference: reference.scenario.clone(),
            alternative: alternative.scenario.clone(),
            reference_price: reference.clearing_price(),
            alternative_price: alternative.clearing_price(),
            price_delta: alternative.clearing_price() - reference.clearing_price(),
            entities,
        }
    }
}

/// Run two scenarios over the same records on separate blocking workers.
pub async fn run_parallel(
    reference: Simulator,
    alternative: Simulator,
    records: Arc<Vec<EntityRecord>>,
) -> Result<(MarketSnapshot, MarketSnapshot)> {
    let reference_records = Arc::clone(&records);
    let reference_task =
        tokio::task::spawn_blocking(move || reference.run(&reference_records));
    let alternative_task = tokio::task::spawn_blocking(move || alternative.run(&records));

    let (reference, alternative) = tokio::join!(reference_task, alternative_task);
    let reference = reference.map_err(|e| SimulationError::Worker(e.to_string()))??;
    let alternative = alternative.map_err(|e| SimulationError::Worker(e.to_string()))??;

    info!(
        reference = %reference.scenario,
        alternative = %alternative.scenario,
        price_delta = alternative.clearing_price() - reference.clearing_price(),
        "Scenarios compared"
    );

    Ok((reference, alternative))
}

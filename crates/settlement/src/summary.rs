//! Market-wide totals of a settled snapshot

use crate::settle::Settlement;
use common::{ratio_or, Entity};
use serde::Serialize;
use tracing::debug;

/// Totals over every entity that took part in the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub entity_count: usize,
    pub total_output: f64,
    /// Present only when every entity reports a capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_capacity: Option<f64>,
    pub total_emissions: f64,
    pub total_free_allocation: f64,
    pub total_net_position: f64,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub buyer_count: usize,
    pub seller_count: usize,
    pub clearing_price: f64,
    /// Output-weighted mean of the per-unit net cashflow
    pub avg_net_cashflow_per_unit: f64,
    pub avg_net_cashflow_local_per_unit: f64,
}

/// Accumulates [`MarketSummary`] totals row by row
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    entity_count: usize,
    total_output: f64,
    total_capacity: Option<f64>,
    total_emissions: f64,
    total_free_allocation: f64,
    total_net_position: f64,
    total_cost: f64,
    total_revenue: f64,
    buyer_count: usize,
    seller_count: usize,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self {
            entity_count: 0,
            total_output: 0.0,
            total_capacity: Some(0.0),
            total_emissions: 0.0,
            total_free_allocation: 0.0,
            total_net_position: 0.0,
            total_cost: 0.0,
            total_revenue: 0.0,
            buyer_count: 0,
            seller_count: 0,
        }
    }

    pub fn add(
        &mut self,
        entity: &Entity,
        free_allocation: f64,
        net_position: f64,
        settlement: &Settlement,
    ) {
        self.entity_count += 1;
        self.total_output += entity.output;
        self.total_capacity = match (self.total_capacity, entity.capacity) {
            (Some(total), Some(capacity)) => Some(total + capacity),
            _ => None,
        };
        self.total_emissions += entity.emissions;
        self.total_free_allocation += free_allocation;
        self.total_net_position += net_position;
        self.total_cost += settlement.cost;
        self.total_revenue += settlement.revenue;
        if net_position > 0.0 {
            self.buyer_count += 1;
        } else if net_position < 0.0 {
            self.seller_count += 1;
        }
    }

    pub fn finish(self, clearing_price: f64, fx_rate: f64) -> MarketSummary {
        let avg_net_cashflow_per_unit =
            ratio_or(self.total_revenue - self.total_cost, self.total_output, 0.0);

        debug!(
            entities = self.entity_count,
            net_position = self.total_net_position,
            "Market summary built"
        );

        MarketSummary {
            entity_count: self.entity_count,
            total_output: self.total_output,
            total_capacity: if self.entity_count == 0 {
                None
            } else {
                self.total_capacity
            },
            total_emissions: self.total_emissions,
            total_free_allocation: self.total_free_allocation,
            total_net_position: self.total_net_position,
            total_cost: self.total_cost,
            total_revenue: self.total_revenue,
            buyer_count: self.buyer_count,
            seller_count: self.seller_count,
            clearing_price,
            avg_net_cashflow_per_unit,
            avg_net_cashflow_local_per_unit: avg_net_cashflow_per_unit * fx_rate,
        }
    }
}

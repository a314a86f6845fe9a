use common::FuelGroup;
use config::BenchmarkStrategy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Performance tier of an entity under the two-tier strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Lowest-intensity prefix of the group
    Best,
    /// Remaining suffix of the group
    Worst,
}

/// Benchmark value(s) owned by one fuel group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupBenchmark {
    Single {
        value: f64,
    },
    Tiered {
        best: f64,
        worst: f64,
        best_count: usize,
        worst_count: usize,
    },
}

impl GroupBenchmark {
    /// Value an entity in `tier` is measured against
    pub fn for_tier(&self, tier: Option<Tier>) -> f64 {
        match (self, tier) {
            (GroupBenchmark::Single { value }, _) => *value,
            (GroupBenchmark::Tiered { worst, .. }, Some(Tier::Worst)) => *worst,
            (GroupBenchmark::Tiered { best, .. }, _) => *best,
        }
    }

    pub fn is_defined(&self) -> bool {
        match self {
            GroupBenchmark::Single { value } => value.is_finite(),
            GroupBenchmark::Tiered { best, worst, .. } => best.is_finite() && worst.is_finite(),
        }
    }
}

/// Benchmark assigned to a single entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assignment {
    pub benchmark: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

/// Output of the benchmark engine for one run.
///
/// `assignments` is index-aligned with the entity slice the table was
/// computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkTable {
    pub strategy: BenchmarkStrategy,
    pub groups: BTreeMap<FuelGroup, GroupBenchmark>,
    #[serde(skip)]
    pub assignments: Vec<Assignment>,
}

impl BenchmarkTable {
    pub fn group(&self, group: &FuelGroup) -> Option<&GroupBenchmark> {
        self.groups.get(group)
    }

    pub fn assignment(&self, index: usize) -> Option<&Assignment> {
        self.assignments.get(index)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

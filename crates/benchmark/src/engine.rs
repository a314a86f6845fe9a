use crate::intensity::intensities;
use crate::types::{Assignment, BenchmarkTable, GroupBenchmark, Tier};
use crate::Result;
use common::{safe_ratio, Entity, Error, FuelGroup, EPSILON};
use config::{BenchmarkStrategy, MAX_TOP_PCT, MIN_TOP_PCT};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Compute one benchmark per fuel group (two under `two_tier`) and assign
/// each entity its benchmark.
///
/// Fails only when `capacity_weighted` is selected and an entity has no
/// capacity. An undefined group benchmark is carried as `NaN`.
pub fn compute_benchmarks(
    entities: &[Entity],
    strategy: BenchmarkStrategy,
) -> Result<BenchmarkTable> {
    if strategy == BenchmarkStrategy::CapacityWeighted {
        ensure_capacity(entities)?;
    }

    let intensity = intensities(entities);
    let mut groups = BTreeMap::new();
    let mut assignments = vec![
        Assignment {
            benchmark: f64::NAN,
            tier: None,
        };
        entities.len()
    ];

    for (group, members) in group_indices(entities) {
        let (benchmark, tiers) = match strategy {
            BenchmarkStrategy::GenerationWeighted => (
                GroupBenchmark::Single {
                    value: generation_weighted(entities, &members),
                },
                None,
            ),
            BenchmarkStrategy::CapacityWeighted => (
                GroupBenchmark::Single {
                    value: capacity_weighted(entities, &intensity, &members),
                },
                None,
            ),
            BenchmarkStrategy::BestPlants { top_pct } => (
                GroupBenchmark::Single {
                    value: best_plants(entities, &intensity, &members, top_pct),
                },
                None,
            ),
            BenchmarkStrategy::TwoTier { best_share_pct } => {
                let (benchmark, tiers) = two_tier(entities, &intensity, &members, best_share_pct);
                (benchmark, Some(tiers))
            }
        };

        match tiers {
            Some(tiers) => {
                for (index, tier) in tiers {
                    assignments[index] = Assignment {
                        benchmark: benchmark.for_tier(Some(tier)),
                        tier: Some(tier),
                    };
                }
            }
            None => {
                for &index in &members {
                    assignments[index] = Assignment {
                        benchmark: benchmark.for_tier(None),
                        tier: None,
                    };
                }
            }
        }

        if !benchmark.is_defined() {
            warn!(group = %group, "Benchmark is undefined for fuel group");
        }
        debug!(group = %group, members = members.len(), ?benchmark, "Benchmark computed");

        groups.insert(group, benchmark);
    }

    info!(
        strategy = %strategy,
        groups = groups.len(),
        entities = entities.len(),
        "Benchmarks computed"
    );

    Ok(BenchmarkTable {
        strategy,
        groups,
        assignments,
    })
}

/// Entity indices per fuel group, input order preserved within each group
pub fn group_indices(entities: &[Entity]) -> BTreeMap<FuelGroup, Vec<usize>> {
    let mut groups: BTreeMap<FuelGroup, Vec<usize>> = BTreeMap::new();
    for (index, entity) in entities.iter().enumerate() {
        groups
            .entry(entity.fuel_group.clone())
            .or_default()
            .push(index);
    }
    groups
}

/// `members` sorted by ascending intensity; ties keep input order.
pub(crate) fn sorted_by_intensity(intensity: &[f64], members: &[usize]) -> Vec<usize> {
    let mut order = members.to_vec();
    order.sort_by_key(|&i| OrderedFloat(intensity[i]));
    order
}

fn ensure_capacity(entities: &[Entity]) -> Result<()> {
    match entities.iter().find(|e| e.capacity.is_none()) {
        Some(entity) => Err(Error::missing_field(entity.id.as_str(), "capacity").into()),
        None => Ok(()),
    }
}

/// Σemissions / Σoutput over `members`
pub fn generation_weighted(entities: &[Entity], members: &[usize]) -> f64 {
    let (emissions, output) = members.iter().fold((0.0, 0.0), |(em, out), &i| {
        (em + entities[i].emissions, out + entities[i].output)
    });
    safe_ratio(emissions, output)
}

/// Capacity-weighted mean of member intensities
pub fn capacity_weighted(entities: &[Entity], intensity: &[f64], members: &[usize]) -> f64 {
    let (weighted, capacity) = members.iter().fold((0.0, 0.0), |(sum, cap), &i| {
        let c = entities[i].capacity.unwrap_or(0.0);
        (sum + c * intensity[i], cap + c)
    });
    safe_ratio(weighted, capacity)
}

/// Generation-weighted benchmark over the cleanest members whose cumulative
/// output first reaches `top_pct` percent of the group's output.
///
/// The subset always holds at least the cleanest member.
pub fn best_plants(
    entities: &[Entity],
    intensity: &[f64],
    members: &[usize],
    top_pct: f64,
) -> f64 {
    let top_pct = top_pct.clamp(MIN_TOP_PCT, MAX_TOP_PCT);
    if top_pct >= MAX_TOP_PCT {
        return generation_weighted(entities, members);
    }

    let total_output: f64 = members.iter().map(|&i| entities[i].output).sum();
    let target = total_output * top_pct / 100.0;
    // Tolerance scales with the group so tiny members cannot be skipped.
    let tolerance = total_output * EPSILON;

    let mut subset = Vec::with_capacity(members.len());
    let mut cumulative = 0.0;
    for index in sorted_by_intensity(intensity, members) {
        subset.push(index);
        cumulative += entities[index].output;
        if cumulative >= target - tolerance {
            break;
        }
    }

    generation_weighted(entities, &subset)
}

/// Size of the best tier for a group of `count` entities.
///
/// Both tiers are non-empty whenever `count >= 2`.
pub fn best_tier_size(count: usize, best_share_pct: f64) -> usize {
    if count < 2 {
        return count;
    }
    let raw = (count as f64 * best_share_pct / 100.0).round();
    (raw as usize).clamp(1, count - 1)
}

fn two_tier(
    entities: &[Entity],
    intensity: &[f64],
    members: &[usize],
    best_share_pct: f64,
) -> (GroupBenchmark, Vec<(usize, Tier)>) {
    let order = sorted_by_intensity(intensity, members);
    let split = best_tier_size(order.len(), best_share_pct);
    let (best, worst) = order.split_at(split);

    let best_value = generation_weighted(entities, best);
    // A single-entity group has no worst tier; it is measured against itself.
    let worst_value = if worst.is_empty() {
        best_value
    } else {
        generation_weighted(entities, worst)
    };

    let tiers = best
        .iter()
        .map(|&i| (i, Tier::Best))
        .chain(worst.iter().map(|&i| (i, Tier::Worst)))
        .collect();

    (
        GroupBenchmark::Tiered {
            best: best_value,
            worst: worst_value,
            best_count: best.len(),
            worst_count: worst.len(),
        },
        tiers,
    )
}

//! Pre-benchmark filters
//!
//! Both filters work per fuel group, keep the surviving entities in input
//! order and report every removed entity as an [`Exclusion`].

use crate::engine::{generation_weighted, group_indices};
use crate::intensity::intensities;
use common::{Entity, Exclusion, ExclusionReason};
use config::{GroupScope, OutlierFilterConfig, ScopeConfig};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use tracing::{debug, info};

/// Drop the `exclusion_count` lowest or highest intensity entities of each
/// group scoped `exclude_lowest` / `exclude_highest`.
///
/// A group keeps at least one entity.
pub fn apply_scope(entities: Vec<Entity>, scope: &ScopeConfig) -> (Vec<Entity>, Vec<Exclusion>) {
    if scope.exclusion_count == 0 || scope.groups.values().all(|s| *s == GroupScope::IncludeAll) {
        return (entities, Vec::new());
    }

    let intensity = intensities(&entities);
    let mut dropped = vec![None; entities.len()];

    for (group, members) in group_indices(&entities) {
        let group_scope = scope.scope_for(group.as_str());
        let mut order = members;
        let reason = match group_scope {
            GroupScope::IncludeAll => continue,
            GroupScope::ExcludeLowest => {
                order.sort_by_key(|&i| OrderedFloat(intensity[i]));
                ExclusionReason::ScopeLowest
            }
            GroupScope::ExcludeHighest => {
                order.sort_by_key(|&i| Reverse(OrderedFloat(intensity[i])));
                ExclusionReason::ScopeHighest
            }
        };

        let count = scope.exclusion_count.min(order.len().saturating_sub(1));
        for &index in order.iter().take(count) {
            dropped[index] = Some(reason.clone());
        }
        debug!(group = %group, scope = ?group_scope, dropped = count, "Scope applied");
    }

    let (kept, excluded) = split(entities, &intensity, dropped);
    if !excluded.is_empty() {
        info!(excluded = excluded.len(), "Entities excluded by scope");
    }
    (kept, excluded)
}

/// Remove entities whose intensity lies outside
/// `[B·(1 − lower_pct), B·(1 + upper_pct)]`, B being the group's
/// generation-weighted benchmark.
///
/// Groups with an undefined benchmark are left untouched.
pub fn filter_outliers(
    entities: Vec<Entity>,
    filter: &OutlierFilterConfig,
) -> (Vec<Entity>, Vec<Exclusion>) {
    if !filter.enabled {
        return (entities, Vec::new());
    }

    let intensity = intensities(&entities);
    let mut dropped = vec![None; entities.len()];

    for (group, members) in group_indices(&entities) {
        let benchmark = generation_weighted(&entities, &members);
        if !benchmark.is_finite() {
            continue;
        }
        let lower_bound = benchmark * (1.0 - filter.lower_pct);
        let upper_bound = benchmark * (1.0 + filter.upper_pct);

        let mut removed = 0usize;
        for index in members {
            if !(lower_bound..=upper_bound).contains(&intensity[index]) {
                dropped[index] = Some(ExclusionReason::Outlier {
                    benchmark,
                    lower_bound,
                    upper_bound,
                });
                removed += 1;
            }
        }
        debug!(group = %group, benchmark, lower_bound, upper_bound, removed, "Outlier band applied");
    }

    let (kept, excluded) = split(entities, &intensity, dropped);
    if !excluded.is_empty() {
        info!(excluded = excluded.len(), "Entities excluded as outliers");
    }
    (kept, excluded)
}

fn split(
    entities: Vec<Entity>,
    intensity: &[f64],
    dropped: Vec<Option<ExclusionReason>>,
) -> (Vec<Entity>, Vec<Exclusion>) {
    let mut kept = Vec::with_capacity(entities.len());
    let mut excluded = Vec::new();

    for ((entity, reason), &value) in entities.into_iter().zip(dropped).zip(intensity) {
        match reason {
            Some(reason) => excluded.push(Exclusion {
                entity: entity.id.to_string(),
                fuel_group: Some(entity.fuel_group),
                intensity: Some(value),
                reason,
            }),
            None => kept.push(entity),
        }
    }

    (kept, excluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn fleet() -> Vec<Entity> {
        vec![
            Entity::new("L1", "lignite", 100.0, 120.0),
            Entity::new("L2", "lignite", 100.0, 100.0),
            Entity::new("L3", "lignite", 100.0, 140.0),
            Entity::new("L4", "lignite", 100.0, 100.0),
            Entity::new("G1", "gas", 100.0, 40.0),
            Entity::new("G2", "gas", 100.0, 50.0),
        ]
    }

    fn scope(count: usize, groups: &[(&str, GroupScope)]) -> ScopeConfig {
        ScopeConfig {
            exclusion_count: count,
            groups: groups
                .iter()
                .map(|(g, s)| (g.to_string(), *s))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn ids(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_include_all_is_identity() {
        let (kept, excluded) = apply_scope(fleet(), &ScopeConfig::default());
        assert_eq!(kept, fleet());
        assert!(excluded.is_empty());
    }

    #[test]
    fn test_exclude_lowest_ties_by_input_order() {
        let (kept, excluded) = apply_scope(fleet(), &scope(1, &[("lignite", GroupScope::ExcludeLowest)]));
        assert_eq!(ids(&kept), vec!["L1", "L3", "L4", "G1", "G2"]);
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].entity, "L2");
        assert_eq!(excluded[0].reason, ExclusionReason::ScopeLowest);
        assert_eq!(excluded[0].intensity, Some(1.0));
    }

    #[test]
    fn test_exclude_highest() {
        let (kept, excluded) =
            apply_scope(fleet(), &scope(2, &[("lignite", GroupScope::ExcludeHighest)]));
        assert_eq!(ids(&kept), vec!["L2", "L4", "G1", "G2"]);
        assert_eq!(
            excluded.iter().map(|e| e.entity.as_str()).collect::<Vec<_>>(),
            vec!["L1", "L3"]
        );
    }

    #[test]
    fn test_scope_never_empties_group() {
        let (kept, excluded) = apply_scope(fleet(), &scope(5, &[("gas", GroupScope::ExcludeLowest)]));
        assert_eq!(ids(&kept), vec!["L1", "L2", "L3", "L4", "G2"]);
        assert_eq!(excluded.len(), 1);
    }

    #[test]
    fn test_outlier_filter_disabled_by_default() {
        let (kept, excluded) = filter_outliers(fleet(), &OutlierFilterConfig::default());
        assert_eq!(kept.len(), 6);
        assert!(excluded.is_empty());
    }

    #[test]
    fn test_outlier_band() {
        // lignite benchmark 1.15, band [0.92, 1.38]; gas 0.45, band [0.36, 0.54]
        let filter = OutlierFilterConfig {
            enabled: true,
            lower_pct: 0.2,
            upper_pct: 0.2,
        };
        let (kept, excluded) = filter_outliers(fleet(), &filter);
        assert_eq!(ids(&kept), vec!["L1", "L2", "L4", "G1", "G2"]);
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].entity, "L3");
        match &excluded[0].reason {
            ExclusionReason::Outlier {
                benchmark,
                lower_bound,
                upper_bound,
            } => {
                assert!((benchmark - 1.15).abs() < 1e-12);
                assert!((lower_bound - 0.92).abs() < 1e-12);
                assert!((upper_bound - 1.38).abs() < 1e-12);
            }
            other => panic!("unexpected reason {:?}", other),
        }
    }
}

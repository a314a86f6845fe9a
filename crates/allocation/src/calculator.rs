use crate::types::Allocation;
use benchmark::intensity;
use common::Entity;
use config::AllocationConfig;
use tracing::warn;

/// Free allocation for one entity against its assigned benchmark.
///
/// An undefined (non-finite) benchmark leaves the entity at its own
/// intensity, as if smoothing were 0.
pub fn allocate(
    entity: &Entity,
    benchmark: f64,
    smoothing: f64,
    transitional_factor: f64,
    free_share: f64,
) -> Allocation {
    let own = intensity(entity.output, entity.emissions);
    let benchmark = if benchmark.is_finite() {
        benchmark
    } else {
        warn!(entity = %entity.id, "Undefined benchmark, allocating at own intensity");
        own
    };

    let allocation_intensity = own + smoothing * (benchmark - own);
    let base_free_allocation = entity.output * allocation_intensity * free_share;
    let transitional_compensation =
        (own - benchmark).max(0.0) * entity.output * transitional_factor;
    let free_allocation = base_free_allocation + transitional_compensation;

    Allocation {
        allocation_intensity,
        base_free_allocation,
        transitional_compensation,
        free_allocation,
        net_position: entity.emissions - free_allocation,
    }
}

pub struct AllocationCalculator {
    config: AllocationConfig,
}

impl AllocationCalculator {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    pub fn allocate(&self, entity: &Entity, benchmark: f64) -> Allocation {
        allocate(
            entity,
            benchmark,
            self.config.smoothing,
            self.config.transitional_factor,
            self.config.free_share,
        )
    }

    /// Allocations aligned with `entities` and `benchmarks`
    pub fn allocate_all(&self, entities: &[Entity], benchmarks: &[f64]) -> Vec<Allocation> {
        entities
            .iter()
            .zip(benchmarks)
            .map(|(entity, &benchmark)| self.allocate(entity, benchmark))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    const TOLERANCE: f64 = 1e-9;

    fn calculator(smoothing: f64, free_share: f64, transitional_factor: f64) -> AllocationCalculator {
        AllocationCalculator::new(AllocationConfig {
            smoothing,
            free_share,
            transitional_factor,
        })
    }

    #[test]
    fn test_full_smoothing_uses_benchmark() {
        let calc = calculator(1.0, 1.0, 0.0);
        let a = calc.allocate(&Entity::new("A", "coal", 100.0, 50.0), 0.4);
        let b = calc.allocate(&Entity::new("B", "coal", 100.0, 30.0), 0.4);

        assert!((a.allocation_intensity - 0.4).abs() < TOLERANCE);
        assert!((a.free_allocation - 40.0).abs() < TOLERANCE);
        assert!((a.net_position - 10.0).abs() < TOLERANCE);
        assert_eq!(a.side(), Side::Buyer);

        assert!((b.free_allocation - 40.0).abs() < TOLERANCE);
        assert!((b.net_position + 10.0).abs() < TOLERANCE);
        assert_eq!(b.side(), Side::Seller);
    }

    #[test]
    fn test_zero_smoothing_keeps_own_intensity() {
        let entity = Entity::new("A", "coal", 100.0, 50.0);
        let allocation = calculator(0.0, 1.0, 0.0).allocate(&entity, 0.4);
        assert_eq!(allocation.allocation_intensity, 0.5);
        assert_eq!(allocation.net_position, 0.0);
        assert_eq!(allocation.side(), Side::Flat);
    }

    #[test]
    fn test_smoothing_moves_monotonically_toward_benchmark() {
        let entity = Entity::new("A", "lignite", 250.0, 300.0);
        let benchmark = 0.9;
        let mut previous = f64::INFINITY;
        for step in 0..=20 {
            let smoothing = step as f64 / 20.0;
            let allocation = allocate(&entity, benchmark, smoothing, 0.0, 1.0);
            let distance = (allocation.allocation_intensity - benchmark).abs();
            assert!(distance <= previous + TOLERANCE, "smoothing {}", smoothing);
            previous = distance;
        }
        assert!(previous < TOLERANCE);
    }

    #[test]
    fn test_free_share_scales_base_allocation() {
        let entity = Entity::new("A", "gas", 200.0, 80.0);
        let allocation = allocate(&entity, 0.5, 1.0, 0.0, 0.5);
        assert!((allocation.base_free_allocation - 50.0).abs() < TOLERANCE);
        assert!((allocation.net_position - 30.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_transitional_compensation_only_above_benchmark() {
        let dirty = Entity::new("D", "coal", 100.0, 60.0);
        let clean = Entity::new("C", "coal", 100.0, 20.0);

        let d = allocate(&dirty, 0.4, 1.0, 0.5, 1.0);
        assert!((d.transitional_compensation - 10.0).abs() < TOLERANCE);
        assert!((d.free_allocation - 50.0).abs() < TOLERANCE);

        let c = allocate(&clean, 0.4, 1.0, 0.5, 1.0);
        assert_eq!(c.transitional_compensation, 0.0);
        assert!((c.free_allocation - 40.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_undefined_benchmark_falls_back_to_own_intensity() {
        let entity = Entity::new("A", "coal", 100.0, 50.0);
        let allocation = allocate(&entity, f64::NAN, 1.0, 0.3, 1.0);
        assert_eq!(allocation.allocation_intensity, 0.5);
        assert_eq!(allocation.transitional_compensation, 0.0);
        assert_eq!(allocation.net_position, 0.0);
    }

    #[test]
    fn test_allocate_all_alignment() {
        let entities = vec![
            Entity::new("A", "coal", 100.0, 50.0),
            Entity::new("B", "coal", 100.0, 30.0),
        ];
        let allocations = calculator(1.0, 1.0, 0.0).allocate_all(&entities, &[0.4, 0.4]);
        let total: f64 = allocations.iter().map(|a| a.net_position).sum();
        assert_eq!(allocations.len(), 2);
        assert!(total.abs() < TOLERANCE);
    }
}

//! Intensity Calculator

use common::{safe_ratio, Entity, Error};

/// Emission intensity, or `NaN` when `output` is not positive.
///
/// Aggregates keep running over an undefined intensity instead of failing
/// half way; callers that need a hard failure use [`try_intensity`].
pub fn intensity(output: f64, emissions: f64) -> f64 {
    safe_ratio(emissions, output)
}

/// Emission intensity, failing with [`Error::Division`] when `output <= 0`.
pub fn try_intensity(output: f64, emissions: f64) -> common::Result<f64> {
    if output.is_nan() || output <= 0.0 {
        return Err(Error::Division {
            numerator: emissions,
            denominator: output,
        });
    }
    Ok(emissions / output)
}

/// Intensities aligned with `entities`
pub fn intensities(entities: &[Entity]) -> Vec<f64> {
    entities
        .iter()
        .map(|e| intensity(e.output, e.emissions))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_intensity_is_exact_ratio() {
        assert_eq!(intensity(100.0, 50.0), 0.5);
        assert_eq!(intensity(3.0, 1.0), 1.0 / 3.0);
        assert_eq!(intensity(7.0, 0.0), 0.0);
    }

    #[test]
    fn test_undefined_intensity_is_nan() {
        assert!(intensity(0.0, 10.0).is_nan());
        assert!(intensity(-5.0, 10.0).is_nan());
    }

    #[test]
    fn test_try_intensity_division_error() {
        assert_eq!(try_intensity(200.0, 80.0), Ok(0.4));
        assert_matches!(try_intensity(0.0, 1.0), Err(Error::Division { .. }));
    }

    #[test]
    fn test_intensities_align_with_entities() {
        let entities = vec![
            Entity::new("A", "coal", 100.0, 50.0),
            Entity::new("B", "coal", 100.0, 30.0),
        ];
        assert_eq!(intensities(&entities), vec![0.5, 0.3]);
    }
}

//! Curve Builder
//!
//! Maps the gap between an entity's intensity and its benchmark onto a bid
//! and an ask price. Entities dirtier than their benchmark bid higher;
//! cleaner entities ask lower.

use crate::domain::{PriceBounds, Quote};
use common::non_zero;
use config::{CurveConfig, CurveShape};

/// Bid and ask for an intensity gap `delta = intensity − benchmark`.
///
/// A non-finite `delta` is treated as no gap.
pub fn build_curve(delta: f64, bounds: PriceBounds, curve: &CurveConfig) -> Quote {
    let delta = if delta.is_finite() { delta } else { 0.0 };
    let bid_gap = delta.max(0.0);
    let ask_gap = (-delta).max(0.0);
    let half_spread = curve.spread / 2.0;

    let (bid, ask) = match curve.shape {
        CurveShape::Saturating => {
            let range = bounds.range();
            (
                bounds.min() + range * saturation(bid_gap, curve.bid_slope, range) + half_spread,
                bounds.max() - range * saturation(ask_gap, curve.ask_slope, range) - half_spread,
            )
        }
        CurveShape::Linear => (
            bounds.min() + curve.bid_slope * bid_gap + half_spread,
            bounds.max() - curve.ask_slope * ask_gap - half_spread,
        ),
    };

    Quote {
        bid: bounds.clamp(bid),
        ask: bounds.clamp(ask),
    }
}

/// `1 − e^(−k·z)` with `k = slope / range`, in `[0, 1)` for `z ≥ 0`
fn saturation(gap: f64, slope: f64, range: f64) -> f64 {
    let k = slope / non_zero(range);
    1.0 - (-k * gap).exp()
}

/// Curve parameters bound to a price interval
#[derive(Debug, Clone)]
pub struct CurveBuilder {
    bounds: PriceBounds,
    curve: CurveConfig,
}

impl CurveBuilder {
    pub fn new(bounds: PriceBounds, curve: CurveConfig) -> Self {
        Self { bounds, curve }
    }

    pub fn bounds(&self) -> PriceBounds {
        self.bounds
    }

    /// Quote for an entity of `intensity` measured against `benchmark`
    pub fn quote(&self, intensity: f64, benchmark: f64) -> Quote {
        build_curve(intensity - benchmark, self.bounds, &self.curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn bounds() -> PriceBounds {
        PriceBounds::new(5.0, 20.0).unwrap()
    }

    fn curve(shape: CurveShape, spread: f64) -> CurveConfig {
        CurveConfig {
            bid_slope: 150.0,
            ask_slope: 150.0,
            spread,
            shape,
        }
    }

    #[test]
    fn test_no_gap_quotes_spread_around_bounds() {
        let quote = build_curve(0.0, bounds(), &curve(CurveShape::Saturating, 1.0));
        assert!((quote.bid - 5.5).abs() < TOLERANCE);
        assert!((quote.ask - 19.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_saturating_bid_rises_with_gap() {
        let config = curve(CurveShape::Saturating, 0.0);
        let small = build_curve(0.01, bounds(), &config);
        let large = build_curve(0.1, bounds(), &config);
        // k = 150 / 15 = 10
        let expected = 5.0 + 15.0 * (1.0 - (-0.1_f64).exp());
        assert!((small.bid - expected).abs() < TOLERANCE);
        assert!(large.bid > small.bid);
        assert_eq!(small.ask, 20.0);
    }

    #[test]
    fn test_saturating_ask_falls_for_clean_entities() {
        let config = curve(CurveShape::Saturating, 0.0);
        let quote = build_curve(-0.1, bounds(), &config);
        let expected = 20.0 - 15.0 * (1.0 - (-1.0_f64).exp());
        assert!((quote.ask - expected).abs() < TOLERANCE);
        assert_eq!(quote.bid, 5.0);
    }

    #[test]
    fn test_quotes_stay_in_bounds() {
        for shape in [CurveShape::Saturating, CurveShape::Linear] {
            for spread in [0.0, 1.0, 40.0] {
                for delta in [-10.0, -0.5, 0.0, 0.2, 3.0, 1e6] {
                    let quote = build_curve(delta, bounds(), &curve(shape, spread));
                    assert!(bounds().contains(quote.bid), "{:?} {} {}", shape, spread, delta);
                    assert!(bounds().contains(quote.ask), "{:?} {} {}", shape, spread, delta);
                }
            }
        }
    }

    #[test]
    fn test_linear_shape_clips() {
        let config = curve(CurveShape::Linear, 0.0);
        let quote = build_curve(0.05, bounds(), &config);
        assert!((quote.bid - 12.5).abs() < TOLERANCE);
        assert_eq!(build_curve(1.0, bounds(), &config).bid, 20.0);
    }

    #[test]
    fn test_undefined_gap_is_neutral() {
        let config = curve(CurveShape::Saturating, 0.0);
        let quote = CurveBuilder::new(bounds(), config).quote(0.5, f64::NAN);
        assert_eq!(quote.bid, 5.0);
        assert_eq!(quote.ask, 20.0);
    }
}

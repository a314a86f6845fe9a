use crate::*;
use thiserror::Error;

/// A configuration value that makes the run impossible.
///
/// Any of these stops the simulator before computation begins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid price bounds: price_max ({max}) must be greater than price_min ({min})")]
    InvalidPriceBounds { min: f64, max: f64 },

    #[error("{field} must be a finite non-negative number, got {value}")]
    InvalidNonNegative { field: String, value: f64 },

    #[error("{field} must be a positive number, got {value}")]
    InvalidPositive { field: String, value: f64 },

    #[error("{field} must be between 0 and 1, got {value}")]
    InvalidUnitRange { field: String, value: f64 },

    #[error("{field} must be strictly between 0 and 100, got {value}")]
    InvalidPercentageRange { field: String, value: f64 },

    #[error("{field} must be a finite number, got {value}")]
    NonFiniteValue { field: String, value: f64 },

    #[error("Linear price search over {candidates} candidates exceeds the limit of {limit}")]
    TooManyCandidates { candidates: f64, limit: f64 },

    #[error("Scenario name is required")]
    MissingScenarioName,
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Above this a linear scan of the clearing candidates is refused.
const MAX_LINEAR_CANDIDATES: f64 = 10_000_000.0;

pub fn validate_config(config: &SimulationConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    if config.scenario.name.trim().is_empty() {
        report.add_error(ConfigError::MissingScenarioName);
    }

    validate_market(&config.market, &mut report);
    validate_benchmark(&config.benchmark, &mut report);
    validate_allocation(&config.allocation, &mut report);
    validate_curve(&config.curve, &config.market, &mut report);
    validate_cleaning(&config.cleaning, &config.scope, &mut report);
    validate_reporting(&config.reporting, &mut report);

    report
}

fn check_non_negative(field: &str, value: f64, report: &mut ValidationReport) {
    if !value.is_finite() || value < 0.0 {
        report.add_error(ConfigError::InvalidNonNegative {
            field: field.to_string(),
            value,
        });
    }
}

fn check_positive(field: &str, value: f64, report: &mut ValidationReport) {
    if !value.is_finite() || value <= 0.0 {
        report.add_error(ConfigError::InvalidPositive {
            field: field.to_string(),
            value,
        });
    }
}

fn check_unit_range(field: &str, value: f64, report: &mut ValidationReport) {
    if !(0.0..=1.0).contains(&value) {
        report.add_error(ConfigError::InvalidUnitRange {
            field: field.to_string(),
            value,
        });
    }
}

fn validate_market(market: &MarketConfig, report: &mut ValidationReport) {
    check_non_negative("market.price_min", market.price_min, report);
    check_non_negative("market.price_max", market.price_max, report);

    if market.price_max.is_finite()
        && market.price_min.is_finite()
        && market.price_max <= market.price_min
    {
        report.add_error(ConfigError::InvalidPriceBounds {
            min: market.price_min,
            max: market.price_max,
        });
    }

    check_positive("market.price_step", market.price_step, report);

    if market.pricing_regime == PricingRegime::AuctionClearing {
        check_positive("market.auction_supply_share", market.auction_supply_share, report);
    }

    let range = market.price_max - market.price_min;
    if market.price_step.is_finite() && market.price_step > 0.0 && range > 0.0 {
        let candidates = range / market.price_step;
        if candidates > MAX_LINEAR_CANDIDATES {
            if market.pricing_regime == PricingRegime::MarketClearing
                && market.search == PriceSearch::Linear
            {
                report.add_error(ConfigError::TooManyCandidates {
                    candidates,
                    limit: MAX_LINEAR_CANDIDATES,
                });
            } else {
                report.add_warning(
                    "market.price_step",
                    "Price step yields more than 10 million candidate prices",
                );
            }
        }
    }
}

fn validate_benchmark(benchmark: &BenchmarkConfig, report: &mut ValidationReport) {
    if let Some(param) = benchmark.param.filter(|p| !p.is_finite()) {
        report.add_error(ConfigError::NonFiniteValue {
            field: "benchmark.param".to_string(),
            value: param,
        });
        return;
    }

    let Some(strategy) = BenchmarkStrategy::from_method(&benchmark.method, benchmark.param) else {
        report.add_warning(
            "benchmark.method",
            &format!(
                "Unknown method '{}', falling back to generation_weighted (expected one of: {})",
                benchmark.method,
                BenchmarkStrategy::KEYS.join(", ")
            ),
        );
        return;
    };

    match (strategy, benchmark.param) {
        (BenchmarkStrategy::BestPlants { top_pct }, Some(param)) if param != top_pct => {
            report.add_warning(
                "benchmark.param",
                &format!("top_pct {} is outside [10, 100], clamped to {}", param, top_pct),
            );
        }
        (BenchmarkStrategy::BestPlants { top_pct }, None) => {
            report.add_default("benchmark.param", &top_pct.to_string());
        }
        (BenchmarkStrategy::TwoTier { best_share_pct }, param) => {
            if param.is_none() {
                report.add_default("benchmark.param", &best_share_pct.to_string());
            }
            if !(best_share_pct > 0.0 && best_share_pct < 100.0) {
                report.add_error(ConfigError::InvalidPercentageRange {
                    field: "benchmark.param".to_string(),
                    value: best_share_pct,
                });
            }
        }
        (BenchmarkStrategy::GenerationWeighted | BenchmarkStrategy::CapacityWeighted, Some(_)) => {
            report.add_warning(
                "benchmark.param",
                &format!("Parameter is ignored by the {} method", strategy.key()),
            );
        }
        _ => {}
    }
}

fn validate_allocation(allocation: &AllocationConfig, report: &mut ValidationReport) {
    check_unit_range("allocation.smoothing", allocation.smoothing, report);
    check_unit_range("allocation.free_share", allocation.free_share, report);
    check_unit_range(
        "allocation.transitional_factor",
        allocation.transitional_factor,
        report,
    );
}

fn validate_curve(curve: &CurveConfig, market: &MarketConfig, report: &mut ValidationReport) {
    check_positive("curve.bid_slope", curve.bid_slope, report);
    check_positive("curve.ask_slope", curve.ask_slope, report);
    check_non_negative("curve.spread", curve.spread, report);

    let range = market.price_max - market.price_min;
    if range > 0.0 && curve.spread >= range {
        report.add_warning(
            "curve.spread",
            "Spread covers the whole price range; every bid and ask collapses onto a bound",
        );
    }
}

fn validate_cleaning(cleaning: &CleaningConfig, scope: &ScopeConfig, report: &mut ValidationReport) {
    let filter = &cleaning.outlier_filter;
    if filter.enabled {
        check_non_negative("cleaning.outlier_filter.lower_pct", filter.lower_pct, report);
        check_non_negative("cleaning.outlier_filter.upper_pct", filter.upper_pct, report);
    }

    let scoped = scope
        .groups
        .values()
        .any(|s| *s != GroupScope::IncludeAll);
    if scoped && scope.exclusion_count == 0 {
        report.add_warning(
            "scope.exclusion_count",
            "Group exclusions are configured but exclusion_count is 0",
        );
    }
}

fn validate_reporting(reporting: &ReportingConfig, report: &mut ValidationReport) {
    check_positive("reporting.fx_rate", reporting.fx_rate, report);
}

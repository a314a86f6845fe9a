use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

// ==================================================================================
// SCENARIO CONFIG
// ==================================================================================

/// Complete, explicit configuration for one simulation run.
///
/// Every section has defaults, so a scenario file only needs to name what it
/// changes. The pipeline receives this value by reference and never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub scenario: ScenarioConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub curve: CurveConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_scenario_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: default_scenario_name(),
            description: String::new(),
        }
    }
}

// ==================================================================================
// MARKET CONFIG
// ==================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketConfig {
    /// Price floor (currency per allowance)
    #[serde(default = "default_price_min")]
    pub price_min: f64,
    /// Price ceiling (currency per allowance)
    #[serde(default = "default_price_max")]
    pub price_max: f64,
    #[serde(default)]
    pub pricing_regime: PricingRegime,
    /// Auction supply as a fraction of compliance demand (1.0 = 100%)
    #[serde(default = "default_auction_supply_share")]
    pub auction_supply_share: f64,
    /// Distance between candidate prices in the market clearing search
    #[serde(default = "default_price_step")]
    pub price_step: f64,
    #[serde(default)]
    pub search: PriceSearch,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            price_min: default_price_min(),
            price_max: default_price_max(),
            pricing_regime: PricingRegime::default(),
            auction_supply_share: default_auction_supply_share(),
            price_step: default_price_step(),
            search: PriceSearch::default(),
        }
    }
}

/// Procedure used to resolve the single clearing price
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingRegime {
    #[default]
    #[serde(alias = "Market Clearing")]
    MarketClearing,
    #[serde(alias = "Average Compliance Cost")]
    AverageComplianceCost,
    #[serde(alias = "Auction Clearing")]
    AuctionClearing,
}

impl PricingRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingRegime::MarketClearing => "market_clearing",
            PricingRegime::AverageComplianceCost => "average_compliance_cost",
            PricingRegime::AuctionClearing => "auction_clearing",
        }
    }
}

impl fmt::Display for PricingRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the market clearing candidate prices are searched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSearch {
    #[default]
    Binary,
    Linear,
}

// ==================================================================================
// BENCHMARK CONFIG
// ==================================================================================

/// Benchmark method as written in the scenario file.
///
/// The method is kept as a string so that an unknown key can be reported as a
/// warning and resolved to [`BenchmarkStrategy::GenerationWeighted`] instead of
/// failing to parse.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_benchmark_method")]
    pub method: String,
    /// top_pct for best_plants, best_share_pct for two_tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<f64>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            method: default_benchmark_method(),
            param: None,
        }
    }
}

impl BenchmarkConfig {
    pub fn from_strategy(strategy: BenchmarkStrategy) -> Self {
        let param = match strategy {
            BenchmarkStrategy::GenerationWeighted | BenchmarkStrategy::CapacityWeighted => None,
            BenchmarkStrategy::BestPlants { top_pct } => Some(top_pct),
            BenchmarkStrategy::TwoTier { best_share_pct } => Some(best_share_pct),
        };
        Self {
            method: strategy.key().to_string(),
            param,
        }
    }

    /// Resolve the configured method, falling back to generation weighting
    pub fn strategy(&self) -> BenchmarkStrategy {
        match BenchmarkStrategy::from_method(&self.method, self.param) {
            Some(strategy) => strategy,
            None => {
                tracing::warn!(
                    method = %self.method,
                    "Unknown benchmark method, falling back to generation_weighted"
                );
                BenchmarkStrategy::GenerationWeighted
            }
        }
    }
}

/// Closed set of benchmark strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum BenchmarkStrategy {
    /// Σemissions / Σoutput per group
    GenerationWeighted,
    /// Capacity-weighted mean of entity intensities
    CapacityWeighted,
    /// Generation-weighted over the cleanest entities covering `top_pct` of output
    BestPlants { top_pct: f64 },
    /// Separate benchmarks for the cleanest `best_share_pct` of entities and the rest
    TwoTier { best_share_pct: f64 },
}

impl BenchmarkStrategy {
    pub const KEYS: [&'static str; 4] = [
        "generation_weighted",
        "capacity_weighted",
        "best_plants",
        "two_tier",
    ];

    /// Map a method key to a strategy. Returns `None` for unknown keys.
    ///
    /// `top_pct` is clamped to [10, 100].
    pub fn from_method(method: &str, param: Option<f64>) -> Option<Self> {
        match method.trim().to_lowercase().as_str() {
            "generation_weighted" => Some(Self::GenerationWeighted),
            "capacity_weighted" => Some(Self::CapacityWeighted),
            "best_plants" => Some(Self::BestPlants {
                top_pct: param
                    .unwrap_or_else(default_top_pct)
                    .clamp(MIN_TOP_PCT, MAX_TOP_PCT),
            }),
            "two_tier" => Some(Self::TwoTier {
                best_share_pct: param.unwrap_or_else(default_best_share_pct),
            }),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::GenerationWeighted => "generation_weighted",
            Self::CapacityWeighted => "capacity_weighted",
            Self::BestPlants { .. } => "best_plants",
            Self::TwoTier { .. } => "two_tier",
        }
    }
}

impl fmt::Display for BenchmarkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestPlants { top_pct } => write!(f, "best_plants({})", top_pct),
            Self::TwoTier { best_share_pct } => write!(f, "two_tier({})", best_share_pct),
            other => f.write_str(other.key()),
        }
    }
}

// ==================================================================================
// ALLOCATION & CURVE CONFIG
// ==================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AllocationConfig {
    /// Blend between own intensity (0) and benchmark (1)
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    /// Share of the blended allocation handed out for free
    #[serde(default = "default_free_share")]
    pub free_share: f64,
    /// Compensation share of the above-benchmark gap
    #[serde(default)]
    pub transitional_factor: f64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            smoothing: default_smoothing(),
            free_share: default_free_share(),
            transitional_factor: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CurveConfig {
    #[serde(default = "default_slope")]
    pub bid_slope: f64,
    #[serde(default = "default_slope")]
    pub ask_slope: f64,
    #[serde(default = "default_spread")]
    pub spread: f64,
    #[serde(default)]
    pub shape: CurveShape,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            bid_slope: default_slope(),
            ask_slope: default_slope(),
            spread: default_spread(),
            shape: CurveShape::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveShape {
    /// 1 − e^(−k·z), bounded by construction
    #[default]
    Saturating,
    /// Legacy straight line, hard clipped at the bounds
    Linear,
}

// ==================================================================================
// SCOPE & CLEANING CONFIG
// ==================================================================================

/// Per fuel group exclusions applied before benchmarking
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScopeConfig {
    #[serde(default = "default_exclusion_count")]
    pub exclusion_count: usize,
    /// Scope keyed by fuel group label; groups not listed include all entities
    #[serde(default)]
    pub groups: BTreeMap<String, GroupScope>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            exclusion_count: default_exclusion_count(),
            groups: BTreeMap::new(),
        }
    }
}

impl ScopeConfig {
    pub fn scope_for(&self, group: &str) -> GroupScope {
        self.groups.get(group).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupScope {
    #[default]
    IncludeAll,
    ExcludeLowest,
    ExcludeHighest,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CleaningConfig {
    /// Drop invalid records instead of failing the run
    #[serde(default)]
    pub drop_invalid: bool,
    #[serde(default)]
    pub outlier_filter: OutlierFilterConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutlierFilterConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Band below the group benchmark, as a fraction (1.0 = down to zero)
    #[serde(default = "default_outlier_lower_pct")]
    pub lower_pct: f64,
    /// Band above the group benchmark, as a fraction (2.0 = up to 3×B)
    #[serde(default = "default_outlier_upper_pct")]
    pub upper_pct: f64,
}

impl Default for OutlierFilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            lower_pct: default_outlier_lower_pct(),
            upper_pct: default_outlier_upper_pct(),
        }
    }
}

// ==================================================================================
// REPORTING CONFIG
// ==================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReportingConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_local_currency")]
    pub local_currency: String,
    /// Local currency units per unit of `currency`
    #[serde(default = "default_fx_rate")]
    pub fx_rate: f64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            local_currency: default_local_currency(),
            fx_rate: default_fx_rate(),
        }
    }
}

/// Lower clamp for the best_plants output share (percent)
pub const MIN_TOP_PCT: f64 = 10.0;

/// Upper clamp for the best_plants output share (percent)
pub const MAX_TOP_PCT: f64 = 100.0;

pub fn default_scenario_name() -> String {
    "reference".to_string()
}

pub fn default_price_min() -> f64 {
    5.0
}

pub fn default_price_max() -> f64 {
    20.0
}

pub fn default_auction_supply_share() -> f64 {
    1.0
}

pub fn default_price_step() -> f64 {
    0.01
}

pub fn default_benchmark_method() -> String {
    "generation_weighted".to_string()
}

pub fn default_top_pct() -> f64 {
    100.0
}

pub fn default_best_share_pct() -> f64 {
    50.0
}

pub fn default_smoothing() -> f64 {
    1.0
}

pub fn default_free_share() -> f64 {
    1.0
}

pub fn default_slope() -> f64 {
    150.0
}

pub fn default_spread() -> f64 {
    1.0
}

pub fn default_exclusion_count() -> usize {
    5
}

pub fn default_outlier_lower_pct() -> f64 {
    1.0
}

pub fn default_outlier_upper_pct() -> f64 {
    2.0
}

pub fn default_currency() -> String {
    "EUR".to_string()
}

pub fn default_local_currency() -> String {
    "TRY".to_string()
}

pub fn default_fx_rate() -> f64 {
    50.0
}

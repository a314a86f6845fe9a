use crate::*;
use anyhow::{Context, Result};
use common::EntityRecord;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
    let path = path.as_ref();
    info!("Loading scenario configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    parse_config(&content)
}

/// Parse a scenario document after environment variable substitution
pub fn parse_config(content: &str) -> Result<SimulationConfig> {
    let substituted = substitution::substitute_env_vars(content)?;
    if has_unresolved_env_vars(&substituted) {
        warn!("Configuration still contains unresolved environment variables");
    }

    let config: SimulationConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!(scenario = %config.scenario.name, "Configuration loaded successfully");
    Ok(config)
}

/// Load entity records from a JSON (`.json`) or YAML file.
///
/// Records are returned unvalidated; the simulator decides whether an invalid
/// record fails the run or is dropped.
#[instrument(skip(path))]
pub fn load_entities<P: AsRef<Path>>(path: P) -> Result<Vec<EntityRecord>> {
    let path = path.as_ref();
    info!("Loading entity records from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entity file: {:?}", path))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let records: Vec<EntityRecord> = if is_json {
        serde_json::from_str(&content).with_context(|| "Failed to parse JSON entity records")?
    } else {
        serde_yaml::from_str(&content).with_context(|| "Failed to parse YAML entity records")?
    };

    info!(count = records.len(), "Entity records loaded");
    Ok(records)
}

#[instrument]
pub fn generate_default_config() -> SimulationConfig {
    SimulationConfig {
        scenario: ScenarioConfig {
            name: default_scenario_name(),
            description: "Single-period cap-and-trade snapshot".to_string(),
        },
        market: MarketConfig::default(),
        benchmark: BenchmarkConfig::from_strategy(BenchmarkStrategy::GenerationWeighted),
        allocation: AllocationConfig::default(),
        curve: CurveConfig::default(),
        scope: ScopeConfig::default(),
        cleaning: CleaningConfig::default(),
        reporting: ReportingConfig::default(),
    }
}

#[instrument(skip(config))]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &SimulationConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_config_is_valid() {
        let config = generate_default_config();
        assert_eq!(config.scenario.name, "reference");
        assert_eq!(config.benchmark.method, "generation_weighted");
        assert!(validate_config(&config).is_valid());
    }

    #[test]
    fn test_default_config_survives_yaml() {
        let config = generate_default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = parse_config(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_config_substitutes_env() {
        std::env::set_var("OPENETS_TEST_SMOOTHING", "0.25");
        let config = parse_config("allocation:\n  smoothing: ${OPENETS_TEST_SMOOTHING}\n").unwrap();
        assert_eq!(config.allocation.smoothing, 0.25);
    }

    #[test]
    fn test_parse_config_rejects_unresolved_numeric() {
        let result = parse_config("market:\n  price_max: ${OPENETS_TEST_NEVER_SET}\n");
        assert!(result.is_err());
    }

    fn scratch_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("etsx-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_entities_picks_format_from_extension() {
        let json = scratch_file(
            "plants.JSON",
            r#"[{"id": "A", "fuel_group": "gas", "output": 10.0, "emissions": 4.0}]"#,
        );
        let records = load_entities(&json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("A"));
        assert_eq!(records[0].emissions, Some(4.0));

        let yaml = scratch_file(
            "plants.yaml",
            "- id: B\n  fuel_group: lignite\n  output: 20.0\n  emissions: 24.0\n  capacity: 5.0\n",
        );
        let records = load_entities(&yaml).unwrap();
        assert_eq!(records[0].fuel_group.as_deref(), Some("lignite"));
        assert_eq!(records[0].capacity, Some(5.0));

        fs::remove_file(json).ok();
        fs::remove_file(yaml).ok();
    }

    #[test]
    fn test_load_entities_json_extension_requires_json() {
        let path = scratch_file("yaml-body.json", "- id: A\n  output: 1.0\n");
        let err = load_entities(&path).unwrap_err();
        assert!(err.to_string().contains("JSON"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_entities_missing_file() {
        let path = std::env::temp_dir().join("etsx-never-written.yaml");
        assert!(load_entities(path).is_err());
    }

    #[test]
    fn test_sample_plants_parse() {
        let yaml = include_str!("../../../scenarios/plants.yaml");
        let records: Vec<EntityRecord> = serde_yaml::from_str(yaml).unwrap();
        assert!(records.len() >= 6);
        for (row, record) in records.into_iter().enumerate() {
            assert!(record.into_entity(row).is_ok());
        }
    }
}

//! OpenETS CLI Binary
//!
//! This is the main entry point for the OpenETS simulator. It provides
//! commands for initializing and validating scenario files, running a
//! scenario over a set of plants, and comparing two scenarios.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cli::{Cli, Commands, OutputFormat};
use config::{generate_default_config, load_config, load_entities, save_config, validate_config};
use observability::{init_logging, init_metrics, LogFormat};
use serde::Serialize;
use simulator::{run_parallel, MarketSnapshot, ScenarioComparison, Simulator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Output wrapper identifying one invocation
#[derive(Debug, Serialize)]
struct RunEnvelope<T> {
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    version: &'static str,
    result: T,
}

impl<T: Serialize> RunEnvelope<T> {
    fn new(result: T) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            result,
        }
    }
}

#[derive(Debug, Serialize)]
struct ComparisonReport {
    comparison: ScenarioComparison,
    reference: MarketSnapshot,
    alternative: MarketSnapshot,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let log_format = LogFormat::parse(cli.log_format.as_str()).unwrap_or_default();
    init_logging("etsx", log_format)?;
    debug!(?cli, "CLI arguments parsed");

    if let Some(port) = cli.metrics_port {
        init_metrics(port)?;
    }

    match cli.command {
        Commands::Run {
            config,
            entities,
            output,
            format,
        } => {
            info!("Executing 'run' command");
            run_command(config, entities, output, format).await
        }
        Commands::Validate { config } => {
            info!("Executing 'validate' command");
            validate_command(config).await
        }
        Commands::Init { output } => {
            info!("Executing 'init' command");
            init_command(output).await
        }
        Commands::Compare {
            reference,
            alternative,
            entities,
            output,
            format,
        } => {
            info!("Executing 'compare' command");
            compare_command(reference, alternative, entities, output, format).await
        }
    }
}

fn build_simulator(config_path: &Path) -> Result<Simulator> {
    let config = load_config(config_path)?;
    Simulator::new(config)
        .with_context(|| format!("Cannot run scenario {:?}", config_path))
}

async fn run_command(
    config_path: PathBuf,
    entities_path: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let simulator = build_simulator(&config_path)?;
    let records = load_entities(&entities_path)?;

    let snapshot = tokio::task::spawn_blocking(move || simulator.run(&records))
        .await
        .context("Simulation worker failed")??;

    info!(
        scenario = %snapshot.scenario,
        price = snapshot.clearing_price(),
        entities = snapshot.rows.len(),
        "Run complete"
    );

    write_output(&RunEnvelope::new(snapshot), format, output.as_deref())
}

async fn compare_command(
    reference_path: PathBuf,
    alternative_path: PathBuf,
    entities_path: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let reference = build_simulator(&reference_path)?;
    let alternative = build_simulator(&alternative_path)?;
    let records = Arc::new(load_entities(&entities_path)?);

    let (reference, alternative) = run_parallel(reference, alternative, records).await?;
    let comparison = ScenarioComparison::between(&reference, &alternative);

    info!(
        reference = %comparison.reference,
        alternative = %comparison.alternative,
        price_delta = comparison.price_delta,
        "Comparison complete"
    );

    let report = ComparisonReport {
        comparison,
        reference,
        alternative,
    };
    write_output(&RunEnvelope::new(report), format, output.as_deref())
}

fn write_output<T: Serialize>(value: &T, format: OutputFormat, path: Option<&Path>) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize results to JSON")?
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).context("Failed to serialize results to YAML")?
        }
    };

    match path {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write results: {:?}", path))?;
            info!(?path, "Results written");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    // Print summary
    println!("\n=== Scenario Validation Report ===\n");

    // Defaults
    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    // Warnings
    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    // Errors
    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Scenario: {}", config.scenario.name);
    println!(
        "Price Bounds: {} - {} {}",
        config.market.price_min, config.market.price_max, config.reporting.currency
    );
    println!("Pricing Regime: {}", config.market.pricing_regime);
    println!("Benchmark: {}", config.benchmark.strategy());
    println!(
        "Smoothing: {}, Free Share: {}, Transitional Factor: {}",
        config.allocation.smoothing,
        config.allocation.free_share,
        config.allocation.transitional_factor
    );

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new scenario file");

    // Generate default config
    let config = generate_default_config();

    // Ensure parent directory exists
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    // Save config
    save_config(&config, output_path)?;

    println!("[ok] Scenario file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("This scenario includes:");
    println!("  - Market bounds and pricing regime (market clearing, 5 - 20)");
    println!("  - Generation-weighted benchmarks with full smoothing");
    println!("  - Saturating bid/ask curves");
    println!();
    println!("Next steps:");
    println!("  1. Edit the scenario file to customize parameters");
    println!(
        "  2. Run 'etsx validate --config {:?}' to check the scenario",
        output_path
    );
    println!(
        "  3. Run 'etsx run --config {:?} --entities <plants.yaml>' to simulate",
        output_path
    );

    Ok(())
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "etsx")]
#[command(about = "OpenETS - Single-period cap-and-trade market simulator")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Log output format (logs are written to stderr)
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Expose Prometheus metrics on this port while running
    #[arg(long, global = true, env = "ETSX_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one scenario over a set of entities
    Run {
        /// Path to the scenario configuration file
        #[arg(short, long, default_value = "scenarios/reference.yaml")]
        config: PathBuf,

        /// Path to the entity records (JSON or YAML)
        #[arg(short, long)]
        entities: PathBuf,

        /// Write results to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Result format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Validate a scenario configuration without running it
    Validate {
        /// Path to the scenario configuration file
        #[arg(short, long, default_value = "scenarios/reference.yaml")]
        config: PathBuf,
    },

    /// Initialize a new scenario file with all defaults
    Init {
        /// Output path for the new scenario file
        #[arg(short, long, default_value = "scenario.yaml")]
        output: PathBuf,
    },

    /// Run a reference and an alternative scenario side by side
    Compare {
        /// Reference scenario configuration
        #[arg(short, long)]
        reference: PathBuf,

        /// Alternative scenario configuration
        #[arg(short, long)]
        alternative: PathBuf,

        /// Path to the entity records (JSON or YAML)
        #[arg(short, long)]
        entities: PathBuf,

        /// Write results to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Result format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable with colors
    Pretty,
    /// One JSON object per line
    Json,
    /// Single-line human-readable
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

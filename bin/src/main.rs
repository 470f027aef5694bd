//! macrocorr CLI binary.
//!
//! Provides a command-line interface over the macrocorr pipeline.

mod cmd;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use macrocorr::api::ApiClient;
use macrocorr::combine::{DEFAULT_INDEX_ALPHA, DriverRange};
use macrocorr::pipeline::{Orchestrator, PipelineConfig};
use macrocorr::series::InterpolationMode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cmd::OutputFormat;

#[derive(Parser)]
#[command(name = "macrocorr")]
#[command(about = "Rolling rank correlation between crypto and macro factors", long_about = None)]
#[command(version)]
struct Cli {
    /// Backend base URL (defaults to MACROCORR_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Pipeline configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Gap interpolation for low-frequency series.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Interpolation {
    /// Straight line across the gap
    Proportional,
    /// Historical first-step weighting
    FirstStep,
}

impl From<Interpolation> for InterpolationMode {
    fn from(value: Interpolation) -> Self {
        match value {
            Interpolation::Proportional => Self::Proportional,
            Interpolation::FirstStep => Self::FirstStepWeight,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Group correlations between the asset and macro factors
    Corr {
        /// Asset symbol
        #[arg(short, long)]
        asset: Option<String>,

        /// Rolling window in days
        #[arg(short, long)]
        window: Option<usize>,

        /// Days of raw history to correlate
        #[arg(long)]
        days: Option<usize>,

        /// Groups with data required before falling back to the server
        #[arg(long)]
        min_groups: Option<usize>,

        /// Gap interpolation for low-frequency series
        #[arg(long, value_enum)]
        interpolation: Option<Interpolation>,

        /// Also print per-factor correlations
        #[arg(short, long)]
        verbose: bool,
    },

    /// Driver Index over a range
    Driver {
        /// Range: 7D, 30D or 90D
        #[arg(short, long, default_value = "30D", value_parser = parse_range)]
        range: DriverRange,
    },

    /// Composite long/short factor index
    Index {
        /// Periods of history
        #[arg(short, long, default_value = "90")]
        days: usize,

        /// EWMA smoothing factor
        #[arg(long, default_value_t = DEFAULT_INDEX_ALPHA)]
        alpha: f64,
    },

    /// List registered factors and groups
    Factors {
        /// Show aliases and transforms
        #[arg(short, long)]
        verbose: bool,
    },
}

fn parse_range(raw: &str) -> Result<DriverRange, String> {
    DriverRange::parse(raw).ok_or_else(|| format!("unknown range '{raw}', expected 7D, 30D or 90D"))
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

fn client(api_url: Option<String>) -> Result<ApiClient> {
    match api_url {
        Some(url) => Ok(ApiClient::new(url)),
        None => ApiClient::from_env().context("set --api-url or MACROCORR_API_URL"),
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    let format = cli.format;
    debug!(?config, ?format, "loaded configuration");

    match cli.command {
        Commands::Factors { verbose } => {
            cmd::factors::list_factors(verbose, format)?;
        }
        Commands::Corr {
            asset,
            window,
            days,
            min_groups,
            interpolation,
            verbose,
        } => {
            if let Some(asset) = asset {
                config.asset = asset;
            }
            if let Some(window) = window {
                config.window = window;
            }
            if let Some(days) = days {
                config.history_days = days;
            }
            if let Some(min_groups) = min_groups {
                config.min_groups = min_groups;
            }
            if let Some(mode) = interpolation {
                config.interpolation = mode.into();
            }
            let orchestrator = Orchestrator::new(client(cli.api_url)?, config);
            cmd::corr::show_correlations(&orchestrator, verbose, format).await?;
        }
        Commands::Driver { range } => {
            let orchestrator = Orchestrator::new(client(cli.api_url)?, config);
            cmd::driver::show_driver_index(&orchestrator, range, format).await?;
        }
        Commands::Index { days, alpha } => {
            let orchestrator = Orchestrator::new(client(cli.api_url)?, config);
            cmd::index::show_factor_index(&orchestrator, days, alpha, format).await?;
        }
    }

    Ok(())
}

//! Crime Rate Predictor CLI
//!
//! Predicts crime-prone areas and forecasts crime counts from five inputs,
//! using a pre-trained classifier, regressor and feature scaler.

mod commands;
mod config;
mod input;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{codes, interactive, predict};
use predictor_lib::predictor::Pipeline;
use predictor_lib::{ModelStore, PipelineMetrics, RawInput, StructuredLogger};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crime Rate Predictor CLI
#[derive(Parser)]
#[command(name = "crime")]
#[command(author, version, about = "Crime Rate Predictor: classify crime-prone areas and forecast crime rates", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, env = "CRIME_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Classifier model path (ONNX)
    #[arg(long, env = "CRIME_CLASSIFIER", global = true)]
    pub classifier: Option<PathBuf>,

    /// Regressor model path (ONNX)
    #[arg(long, env = "CRIME_REGRESSOR", global = true)]
    pub regressor: Option<PathBuf>,

    /// Feature scaler path (JSON)
    #[arg(long, env = "CRIME_SCALER", global = true)]
    pub scaler: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict whether an area is crime-prone
    Predict(input::InputArgs),

    /// Forecast the crime count
    Forecast(input::InputArgs),

    /// Show city, crime and police deployment reference tables
    Codes,

    /// Start an interactive prediction session
    Interactive,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Predict(_) => "predict",
            Commands::Forecast(_) => "forecast",
            Commands::Codes => "codes",
            Commands::Interactive => "interactive",
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    // Reference tables need no models.
    if let Commands::Codes = cli.command {
        codes::show_codes(cli.format);
        return Ok(());
    }

    let overrides = config::Overrides {
        config_file: cli.config.clone(),
        classifier: cli.classifier.clone(),
        regressor: cli.regressor.clone(),
        scaler: cli.scaler.clone(),
    };
    let config = config::AppConfig::load(&overrides)?;
    info!(
        classifier = %config.artifacts.classifier.display(),
        regressor = %config.artifacts.regressor.display(),
        scaler = %config.artifacts.scaler.display(),
        "Configuration loaded"
    );

    // Fail fast: no interaction starts without a complete store.
    let store = ModelStore::load_verified(&config.artifact_paths(), &config.artifacts.checksums)
        .context("Failed to load model artifacts")?;
    let metrics = PipelineMetrics::new();
    metrics.set_store_loaded(true);

    let logger = StructuredLogger::new(cli.command.name());
    logger.log_startup(VERSION);
    let pipeline = Pipeline::new(&store, logger.clone()).with_policy(config.forecast.negative);

    match cli.command {
        Commands::Predict(args) => {
            predict::predict_crime_prone(&pipeline, &RawInput::from(args), cli.format)?;
        }
        Commands::Forecast(args) => {
            predict::forecast_crime_rate(&pipeline, &RawInput::from(args), cli.format)?;
        }
        Commands::Interactive => {
            let summary = interactive::run(&pipeline, cli.format)?;
            info!(
                requests = summary.requests,
                failures = summary.failures,
                "Interactive session finished"
            );
            logger.log_shutdown("session ended");
        }
        Commands::Codes => codes::show_codes(cli.format),
    }

    Ok(())
}

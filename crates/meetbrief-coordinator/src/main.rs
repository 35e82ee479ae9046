//! `MeetBrief` coordinator service binary
//!
//! Builds an explicit coordinator instance at process start, wires it to
//! the record store, artifact directory and analysis pipeline, and runs
//! the poll loop until shutdown.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Parser, Subcommand};
use meetbrief_analysis::{AnalysisPipeline, DeepSeekClient};
use meetbrief_coordinator::{CoordinatorConfig, CoordinatorService, Result, TaskCoordinator};
use meetbrief_database::Database;
use meetbrief_store::{ArtifactStore, CoordinationStore, MeetingStore, MemoryCoordinationStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

/// Command line interface for the `MeetBrief` coordinator service
#[derive(Parser)]
#[command(
    name = "meetbrief-coordinator",
    version = env!("CARGO_PKG_VERSION"),
    about = "Task coordination service for MeetBrief",
    long_about = "Polls worker results, merges transcript and speaker segmentations, \
                  persists outcomes and runs the meeting analysis pipeline."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Start the coordinator service
    Start,

    /// Validate configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration values
        #[arg(short, long)]
        validate: bool,
    },
}

/// Main entry point for the coordinator service
///
/// # Errors
///
/// Returns an error if service initialization or execution fails
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();
    init_logging(&cli);

    let config = load_config(cli.config.as_deref()).await?;

    match cli.command {
        Some(Commands::Config { show, validate }) => handle_config_command(&config, show, validate),
        Some(Commands::Start) | None => start_service(config).await,
    }
}

/// Initialize logging system
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = cli.log_level,
        "MeetBrief coordinator starting"
    );
}

/// Load configuration from file or environment
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read or parsed
async fn load_config(config_path: Option<&std::path::Path>) -> Result<CoordinatorConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());

        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            meetbrief_coordinator::CoordinatorError::configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        toml::from_str(&contents).map_err(|e| {
            meetbrief_coordinator::CoordinatorError::configuration(format!(
                "Failed to parse config file: {e}"
            ))
        })
    } else {
        info!("Loading default configuration");
        CoordinatorConfig::load()
            .map_err(|e| meetbrief_coordinator::CoordinatorError::configuration(e.to_string()))
    }
}

/// Build the coordinator and run the service until shutdown
async fn start_service(config: CoordinatorConfig) -> Result<()> {
    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("database ready");

    let artifacts = Arc::new(ArtifactStore::new(&config.storage.results_directory));
    artifacts.ensure_dir().await?;

    // Single-node deployment: workers publish into the in-process store.
    // Multi-process setups implement CoordinationStore over a shared
    // key-value service instead.
    let coordination: Arc<dyn CoordinationStore> = Arc::new(MemoryCoordinationStore::new());
    let meetings: Arc<dyn MeetingStore> = Arc::new(database);

    let chat_client = DeepSeekClient::new(config.llm.clone()).map_err(|e| {
        meetbrief_coordinator::CoordinatorError::configuration(e.to_string())
    })?;
    let pipeline = Arc::new(AnalysisPipeline::full(Arc::new(chat_client)));

    let coordinator = Arc::new(TaskCoordinator::new(
        coordination,
        meetings,
        artifacts,
        pipeline,
    ));

    let service = CoordinatorService::new(
        coordinator,
        config.poll.clone(),
        config.service.clone(),
    );

    service.start()?;
    info!("Coordinator service is running. Press Ctrl+C to stop.");

    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    } else {
        info!("Received Ctrl+C, shutting down gracefully");
    }

    service.stop().await;
    info!("Service stopped successfully");
    Ok(())
}

/// Handle configuration commands
///
/// # Errors
///
/// Returns an error if configuration cannot be serialized
fn handle_config_command(config: &CoordinatorConfig, show: bool, validate: bool) -> Result<()> {
    if validate {
        validate_config(config);
    }

    if show {
        let rendered = toml::to_string_pretty(config).map_err(|e| {
            meetbrief_coordinator::CoordinatorError::configuration(format!(
                "Failed to serialize configuration: {e}"
            ))
        })?;
        println!("{rendered}");
    }

    Ok(())
}

/// Validate configuration values
fn validate_config(config: &CoordinatorConfig) {
    info!("Validating configuration...");

    if config.llm.api_key.is_empty() {
        warn!("llm.api_key is not set; analysis jobs will fail at startup");
    }
    if !config.storage.results_directory.exists() {
        warn!(
            "Results directory does not exist yet: {}",
            config.storage.results_directory.display()
        );
    }
    if config.poll.poll_interval_seconds == 0 {
        warn!("poll.poll_interval_seconds is 0; the loop will spin without sleeping");
    }

    info!("Configuration validation completed");
}

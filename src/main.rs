//! AlgeSpace - Study Backend Entry Point
//!
//! This is the main entry point for the AlgeSpace study backend, which serves
//! the exercise catalog and the session tracking contract over HTTP.

use algespace::api::StudyServer;
use algespace::config::{default_data_dir, Settings};
use algespace::storage::ExerciseStore;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

/// Default config file location under the platform config dir
fn default_config_path() -> PathBuf {
    dirs::config_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("algespace")
        .join("algespace.toml")
}

/// Get the config path from CLI arg, env var, or default
fn get_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    cli_path
        .or_else(|| std::env::var("ALGESPACE_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(default_config_path)
}

#[derive(Parser)]
#[command(name = "algespace")]
#[command(about = "Study backend for algebra learning exercises", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Config file path (overrides ALGESPACE_CONFIG env var and default)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP study server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Create the databases and load the built-in exercise catalog
    Seed {
        /// Exercise database path (overrides the config file)
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

/// Load settings and run the study server until shutdown
async fn run_server(config_path: &Path, addr_override: Option<String>) -> Result<()> {
    let mut settings = Settings::load(config_path)?;
    if let Some(addr) = addr_override {
        settings.server.addr = addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", addr, e))?;
    }

    let server = StudyServer::new(settings).await?;
    server.serve().await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Use the specified level for algespace, but WARN for noisy dependencies
    let filter = EnvFilter::new(format!(
        "algespace={},tower_http=warn,hyper=warn",
        level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("AlgeSpace v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = get_config_path(cli.config);

    match cli.command {
        // Bare `algespace` serves with the configured address
        None => run_server(&config_path, None).await,
        Some(Commands::Serve { addr }) => run_server(&config_path, addr).await,
        Some(Commands::Init { force }) => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    config_path.display()
                );
            }

            let settings = Settings::default();
            settings.save(&config_path)?;

            println!("✓ Config written: {}", config_path.display());
            println!("  Data directory: {}", default_data_dir().display());
            Ok(())
        }
        Some(Commands::Seed { database }) => {
            debug!("Seeding exercise catalog...");

            let mut settings = Settings::load(&config_path)?;
            if let Some(path) = database {
                settings.database.exercises_path = path;
            }

            let store = ExerciseStore::open(&settings.database.exercises_path).await?;
            let study_id = store.seed_defaults().await?;

            println!(
                "✓ Catalog seeded: study {} in {}",
                study_id,
                settings.database.exercises_path.display()
            );
            Ok(())
        }
    }
}

//! Logtide - Apache access-log ingest and export service
//!
//! # Usage
//!
//! ```bash
//! # Run the server (default)
//! logtide
//! logtide --config configs/logtide.toml
//!
//! # Create the database and log table
//! logtide init
//!
//! # Ingest a log file without going through HTTP
//! logtide import access.log
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logtide_config::Config;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logtide - Apache access-log ingest and export service
#[derive(Parser, Debug)]
#[command(name = "logtide")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    // Global args that apply to serve when no subcommand given
    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the server
    Serve(cmd::serve::ServeArgs),

    /// Ingest an access log file into the store
    Import(cmd::import::ImportArgs),

    /// Create the database and log table
    Init(cmd::init::InitArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Explicit subcommand
        Some(Command::Serve(mut args)) => {
            // CLI global --config overrides subcommand config if both specified
            if args.config.is_none() && cli.config.is_some() {
                args.config = cli.config;
            }
            let log_level = resolve_log_level(cli.log_level.as_deref(), args.config.as_deref());
            init_logging(&log_level)?;
            cmd::serve::run(args).await
        }
        Some(Command::Import(mut args)) => {
            if args.config.is_none() && cli.config.is_some() {
                args.config = cli.config;
            }
            let log_level = resolve_log_level(cli.log_level.as_deref(), args.config.as_deref());
            init_logging(&log_level)?;
            cmd::import::run(args).await
        }
        Some(Command::Init(mut args)) => {
            if args.config.is_none() && cli.config.is_some() {
                args.config = cli.config;
            }
            // Init just prints the outcome to stdout
            cmd::init::run(args).await
        }
        // No subcommand = run server (default behavior)
        None => {
            let log_level = resolve_log_level(cli.log_level.as_deref(), cli.config.as_deref());
            init_logging(&log_level)?;
            let args = cmd::serve::ServeArgs { config: cli.config };
            cmd::serve::run(args).await
        }
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config_path: Option<&std::path::Path>) -> String {
    // CLI flag takes precedence
    if let Some(level) = cli_level {
        return level.to_string();
    }

    // Try to load from config file if specified
    if let Some(path) = config_path
        && path.exists()
        && let Ok(config) = Config::from_file(path)
    {
        return config.log.level.as_str().to_string();
    }

    // Default
    "info".to_string()
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}

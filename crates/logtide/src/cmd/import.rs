//! Import command - Ingest an access log file from the CLI
//!
//! Runs the same pipeline as `POST /api/import/apache_log`, reading
//! from a local file instead of an HTTP body.
//!
//! # Usage
//!
//! ```bash
//! logtide import access.log
//! logtide import access.log --config configs/logtide.toml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use owo_colors::OwoColorize;

use logtide_ingest::{IngestCoordinator, IngestOptions};
use logtide_store::LogStore;

use crate::cmd::{load_config, store_config};

/// Import command arguments
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Access log file to ingest
    pub file: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the import command
pub async fn run(args: ImportArgs) -> Result<()> {
    if !args.file.exists() {
        bail!("log file not found: {}", args.file.display());
    }

    let config = load_config(args.config)?;
    let store = LogStore::new(&store_config(&config)).context("failed to open log store")?;

    let ingest = IngestCoordinator::new(
        store,
        IngestOptions {
            poll_interval: config.ingest.poll_interval,
            poll_timeout: config.ingest.poll_timeout,
        },
    );

    println!("Importing {}...", args.file.display());
    let report = ingest
        .ingest_file(&args.file)
        .await
        .context("import failed")?;

    println!();
    println!("Lines read      {}", report.lines_read);
    println!(
        "Rows inserted   {}",
        report.rows_inserted.to_string().green()
    );
    if report.rows_skipped > 0 {
        println!(
            "Rows skipped    {}",
            report.rows_skipped.to_string().yellow()
        );
    }

    Ok(())
}

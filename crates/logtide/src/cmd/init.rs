//! Init command - Create the database and log table
//!
//! Both statements are idempotent, so re-running against an existing
//! schema is harmless.
//!
//! # Usage
//!
//! ```bash
//! logtide init
//! logtide init --config configs/logtide.toml
//! logtide init --url http://clickhouse:8123 --database weblogs
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use logtide_store::ensure_schema;

use crate::cmd::{load_config, store_config};

/// Init command arguments
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// ClickHouse HTTP URL (overrides the config file)
    #[arg(long)]
    pub url: Option<String>,

    /// Database to create (overrides the config file)
    #[arg(long)]
    pub database: Option<String>,
}

/// Run the init command
pub async fn run(args: InitArgs) -> Result<()> {
    let config = load_config(args.config)?;
    let mut store = store_config(&config);
    if let Some(url) = args.url {
        store = store.with_url(url);
    }
    if let Some(database) = args.database {
        store = store.with_database(database);
    }

    print!(
        "Creating '{}.{}' at {}... ",
        store.database, store.table, store.url
    );
    ensure_schema(&store).await?;
    println!("{}", "✓".green());

    Ok(())
}

//! Command implementations for the Logtide CLI

pub mod import;
pub mod init;
pub mod serve;

use anyhow::{Context, Result};
use logtide_config::Config;
use logtide_store::ClickHouseConfig;
use std::path::PathBuf;
use tracing::info;

/// Load configuration, trying default paths when none is given
pub(crate) fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            // User explicitly provided config path - must exist
            if !path.exists() {
                return Err(anyhow::anyhow!(
                    "config file not found: {}",
                    path.display()
                ));
            }
            Config::from_file(&path).context("failed to load configuration")
        }
        None => {
            // No config provided - try default paths, fall back to defaults
            let default_paths = [
                PathBuf::from("configs/logtide.toml"),
                PathBuf::from("logtide.toml"),
            ];

            for path in &default_paths {
                if path.exists() {
                    info!(config = %path.display(), "using config file");
                    return Config::from_file(path).context("failed to load configuration");
                }
            }

            info!("no config file found, using defaults (ClickHouse on localhost:8123)");
            Ok(Config::default())
        }
    }
}

/// Map the store section of the config onto connection settings
pub(crate) fn store_config(config: &Config) -> ClickHouseConfig {
    let mut store = ClickHouseConfig::default()
        .with_url(&config.store.url)
        .with_database(&config.store.database)
        .with_table(&config.store.table);

    if !config.store.user.is_empty() {
        store = store.with_credentials(&config.store.user, &config.store.password);
    }

    store
}

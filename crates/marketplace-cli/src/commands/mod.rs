//! Command implementations. Each command prints to stdout and returns
//! errors to `main` for reporting.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod wardrobe;

use anyhow::Result;
use tracing::debug;

use marketplace_core::{ApiClient, Config};

/// Loaded configuration plus the API client built from it
pub struct Context {
    pub config: Config,
    pub api: ApiClient,
}

impl Context {
    pub fn load() -> Result<Self> {
        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(api_base_url = %config.api_base_url, backend = ?config.token_backend, "Config loaded");

        let api = ApiClient::from_config(&config)?;
        Ok(Self { config, api })
    }
}

/// Render an optional value for a table cell
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

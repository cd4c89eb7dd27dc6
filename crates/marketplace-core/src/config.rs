//! Client configuration management.
//!
//! This module handles loading and saving the client configuration:
//! backend URL, request timeout, token storage backend and the credential
//! scheme used by each group of endpoints.
//!
//! Configuration is stored at `~/.config/marketplace/config.json`.
//! `MARKETPLACE_API_URL` and `MARKETPLACE_TOKEN_BACKEND` override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::CredentialScheme;

/// Application name used for config/data directory paths
const APP_NAME: &str = "marketplace";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Local development backend
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// HTTP request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "MARKETPLACE_API_URL";
pub const ENV_TOKEN_BACKEND: &str = "MARKETPLACE_TOKEN_BACKEND";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl std::str::FromStr for TokenBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(TokenBackend::File),
            "keyring" => Ok(TokenBackend::Keyring),
            "memory" => Ok(TokenBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown token backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub token_backend: TokenBackend,
    /// Scheme for accounts, orders and catalog endpoints
    pub primary_scheme: CredentialScheme,
    /// Scheme for closet, events and recommendation endpoints
    pub wardrobe_scheme: CredentialScheme,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_backend: TokenBackend::default(),
            primary_scheme: CredentialScheme::Bearer,
            wardrobe_scheme: CredentialScheme::Token,
            last_username: None,
        }
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(backend) = var(ENV_TOKEN_BACKEND) {
            match backend.parse::<TokenBackend>() {
                Ok(parsed) => self.token_backend = parsed,
                Err(e) => warn!(error = %e, "Ignoring token backend override"),
            }
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the token file
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.primary_scheme, CredentialScheme::Bearer);
        assert_eq!(config.wardrobe_scheme, CredentialScheme::Token);
        assert_eq!(config.token_backend, TokenBackend::File);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_base_url": "https://shop.example.com/"}"#).unwrap();
        assert_eq!(config.base_url(), "https://shop.example.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.wardrobe_scheme, CredentialScheme::Token);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_API_URL => Some(" http://10.0.0.2:9000 ".to_string()),
            ENV_TOKEN_BACKEND => Some("Keyring".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://10.0.0.2:9000");
        assert_eq!(config.token_backend, TokenBackend::Keyring);
    }

    #[test]
    fn test_invalid_backend_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| (key == ENV_TOKEN_BACKEND).then(|| "cloud".to_string()));
        assert_eq!(config.token_backend, TokenBackend::File);
    }
}

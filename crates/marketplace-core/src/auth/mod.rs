//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `TokenStore`: persistent storage for access and refresh tokens
//! - `KeyringTokenStore`: OS keychain backend via keyring
//! - `Session`: the shared session context passed through the API layer
//!
//! Tokens are opaque. Their validity is only ever discovered from the
//! server's response.

pub mod credentials;
pub mod session;
pub mod token_store;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{Config, TokenBackend};

pub use credentials::KeyringTokenStore;
pub use session::{CredentialScheme, Realm, Session};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenKey, TokenStore};

/// Open the token store selected in the configuration
pub fn open_token_store(config: &Config) -> Result<Arc<dyn TokenStore>> {
    let store: Arc<dyn TokenStore> = match config.token_backend {
        TokenBackend::File => Arc::new(FileTokenStore::new(config.data_dir()?)),
        TokenBackend::Keyring => Arc::new(KeyringTokenStore::default()),
        TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
    };
    tracing::debug!(backend = ?config.token_backend, "Token store opened");
    Ok(store)
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use keyring::Entry;

use super::token_store::{TokenKey, TokenStore};

const SERVICE_NAME: &str = "marketplace-client";

/// Token store backed by the OS keychain.
/// Each token key is a separate keychain entry under one service name.
pub struct KeyringTokenStore {
    service: String,
    /// Entries are created once per key and reused
    entries: Mutex<HashMap<TokenKey, Arc<Entry>>>,
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl KeyringTokenStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, key: TokenKey) -> Result<Arc<Entry>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get(&key) {
            return Ok(entry.clone());
        }
        let entry = Arc::new(
            Entry::new(&self.service, key.as_str()).context("Failed to create keyring entry")?,
        );
        entries.insert(key, entry.clone());
        Ok(entry)
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn clear(&self, keys: &[TokenKey]) -> Result<()> {
        for key in keys {
            match self.entry(*key)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(e).context("Failed to delete token from keychain"),
            }
        }
        Ok(())
    }
}

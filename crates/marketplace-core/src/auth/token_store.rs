//! Persistent key/value storage for session tokens.
//!
//! Tokens are opaque strings. Stores never inspect or validate them; the
//! session layer decides what counts as a usable token.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// Storage keys used by the marketplace client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKey {
    /// Short-lived bearer credential
    Access,
    /// Credential exchanged for a new access token
    Refresh,
    /// Access token as read by the wardrobe endpoints
    Legacy,
}

impl TokenKey {
    pub const ALL: [TokenKey; 3] = [TokenKey::Access, TokenKey::Refresh, TokenKey::Legacy];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKey::Access => "access_token",
            TokenKey::Refresh => "refresh_token",
            TokenKey::Legacy => "token",
        }
    }
}

impl std::fmt::Display for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait TokenStore: Send + Sync {
    fn get(&self, key: TokenKey) -> Result<Option<String>>;

    fn set(&self, key: TokenKey, value: &str) -> Result<()>;

    /// Remove the given keys. Missing keys are not an error.
    fn clear(&self, keys: &[TokenKey]) -> Result<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<TokenKey, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<TokenKey, String>> {
        // A poisoned map still holds valid strings
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>> {
        Ok(self.entries().get(&key).cloned())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        self.entries().insert(key, value.to_string());
        Ok(())
    }

    fn clear(&self, keys: &[TokenKey]) -> Result<()> {
        let mut entries = self.entries();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(default)]
    tokens: BTreeMap<String, String>,
    updated_at: Option<DateTime<Utc>>,
}

/// Stores tokens as JSON in the user's data directory.
pub struct FileTokenStore {
    data_dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE)
    }

    fn read(path: &Path) -> Result<TokenFile> {
        if !path.exists() {
            return Ok(TokenFile::default());
        }
        let contents = std::fs::read_to_string(path).context("Failed to read token file")?;
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn write(path: &Path, file: &TokenFile) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create token directory")?;
        }
        let contents = serde_json::to_string_pretty(file)?;
        std::fs::write(path, contents).context("Failed to write token file")?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.path();
        let mut file = Self::read(&path)?;
        f(&mut file.tokens);

        if file.tokens.is_empty() {
            if path.exists() {
                std::fs::remove_file(&path).context("Failed to remove token file")?;
            }
            return Ok(());
        }

        file.updated_at = Some(Utc::now());
        Self::write(&path, &file)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>> {
        let file = Self::read(&self.path())?;
        Ok(file.tokens.get(key.as_str()).cloned())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        self.modify(|tokens| {
            tokens.insert(key.as_str().to_string(), value.to_string());
        })
    }

    fn clear(&self, keys: &[TokenKey]) -> Result<()> {
        self.modify(|tokens| {
            for key in keys {
                tokens.remove(key.as_str());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);

        store.set(TokenKey::Access, "abc").unwrap();
        store.set(TokenKey::Refresh, "def").unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("abc"));

        store.clear(&[TokenKey::Access]).unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("def"));
    }

    #[test]
    fn test_memory_store_keeps_values_opaque() {
        let store = MemoryTokenStore::new();
        store.set(TokenKey::Access, "  undefined ").unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("  undefined "));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(TokenKey::Access, "access-1").unwrap();
        store.set(TokenKey::Refresh, "refresh-1").unwrap();

        let reopened = FileTokenStore::new(dir.path().to_path_buf());
        assert_eq!(reopened.get(TokenKey::Access).unwrap().as_deref(), Some("access-1"));
        assert_eq!(reopened.get(TokenKey::Refresh).unwrap().as_deref(), Some("refresh-1"));
        assert_eq!(reopened.get(TokenKey::Legacy).unwrap(), None);
    }

    #[test]
    fn test_file_store_clear_removes_file_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested"));

        store.set(TokenKey::Legacy, "tok").unwrap();
        assert!(store.path().exists());

        store.clear(&TokenKey::ALL).unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.get(TokenKey::Legacy).unwrap(), None);
    }

    #[test]
    fn test_file_store_uses_browser_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(TokenKey::Access, "a").unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["tokens"]["access_token"], "a");
    }
}

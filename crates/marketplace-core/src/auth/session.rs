use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use super::token_store::{TokenKey, TokenStore};
use crate::models::TokenPair;

/// Stored values the browser client wrote for "no token"
const ABSENT_TOKEN_LITERALS: [&str; 2] = ["undefined", "null"];

/// How a token is formatted into the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CredentialScheme {
    #[default]
    Bearer,
    Token,
}

impl CredentialScheme {
    pub fn prefix(&self) -> &'static str {
        match self {
            CredentialScheme::Bearer => "Bearer",
            CredentialScheme::Token => "Token",
        }
    }

    /// Header value for a token. The token is trimmed first.
    pub fn header_value(&self, token: &str) -> String {
        format!("{} {}", self.prefix(), token.trim())
    }
}

/// A group of endpoints sharing one credential scheme and token key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Realm {
    pub scheme: CredentialScheme,
    pub access_key: TokenKey,
    /// None when the realm cannot refresh its token
    pub refresh_key: Option<TokenKey>,
}

impl Realm {
    /// Accounts, orders and catalog endpoints
    pub fn accounts(scheme: CredentialScheme) -> Self {
        Self {
            scheme,
            access_key: TokenKey::Access,
            refresh_key: Some(TokenKey::Refresh),
        }
    }

    /// Closet, events, recommendations and wardrobe profile endpoints.
    /// Refreshes through the same refresh token; a refresh rewrites `token`.
    pub fn wardrobe(scheme: CredentialScheme) -> Self {
        Self {
            scheme,
            access_key: TokenKey::Legacy,
            refresh_key: Some(TokenKey::Refresh),
        }
    }
}

/// Normalize a stored token: trimmed, and None for empty or literal
/// "undefined"/"null" values.
pub fn usable_token(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || ABSENT_TOKEN_LITERALS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Explicit session context shared by every API client.
///
/// Clone is cheap; clones share the same store and refresh lock.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    refresh_lock: Arc<Mutex<()>>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read a token, treating unusable values as absent
    pub fn token(&self, key: TokenKey) -> Result<Option<String>> {
        Ok(usable_token(self.store.get(key)?))
    }

    /// Access token for a realm, if one is usable
    pub fn access_token(&self, realm: &Realm) -> Result<Option<String>> {
        self.token(realm.access_key)
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token(TokenKey::Access)?.is_some())
    }

    /// Store the tokens returned by login, signup or google login
    pub fn establish(&self, tokens: &TokenPair) -> Result<()> {
        self.store.set(TokenKey::Access, tokens.access.trim())?;
        self.store.set(TokenKey::Legacy, tokens.access.trim())?;
        match tokens.refresh.as_deref() {
            Some(refresh) => self.store.set(TokenKey::Refresh, refresh.trim())?,
            None => self.store.clear(&[TokenKey::Refresh])?,
        }
        info!("Session established");
        Ok(())
    }

    /// Overwrite the access token after a successful refresh.
    /// A rotated refresh token replaces the old one; otherwise it is kept.
    pub fn replace_access(&self, tokens: &TokenPair) -> Result<()> {
        self.store.set(TokenKey::Access, tokens.access.trim())?;
        self.store.set(TokenKey::Legacy, tokens.access.trim())?;
        if let Some(refresh) = tokens.refresh.as_deref() {
            self.store.set(TokenKey::Refresh, refresh.trim())?;
        }
        Ok(())
    }

    /// Delete every stored token
    pub fn clear(&self) -> Result<()> {
        self.store.clear(&TokenKey::ALL)?;
        info!("Session cleared");
        Ok(())
    }

    /// Serializes refresh attempts across every clone of this session
    pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_lock.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn session() -> (Arc<MemoryTokenStore>, Session) {
        let store = Arc::new(MemoryTokenStore::new());
        let session = Session::new(store.clone());
        (store, session)
    }

    #[test]
    fn test_usable_token_rejects_placeholders() {
        assert_eq!(usable_token(None), None);
        assert_eq!(usable_token(Some("".to_string())), None);
        assert_eq!(usable_token(Some("   ".to_string())), None);
        assert_eq!(usable_token(Some("undefined".to_string())), None);
        assert_eq!(usable_token(Some(" null ".to_string())), None);
        assert_eq!(usable_token(Some(" abc \n".to_string())).as_deref(), Some("abc"));
    }

    #[test]
    fn test_header_value_trims_token() {
        assert_eq!(CredentialScheme::Bearer.header_value("  abc "), "Bearer abc");
        assert_eq!(CredentialScheme::Token.header_value("xyz\n"), "Token xyz");
    }

    #[test]
    fn test_establish_writes_all_keys() {
        let (store, session) = session();
        session
            .establish(&TokenPair::new("acc", Some("ref")))
            .unwrap();

        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("acc"));
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("ref"));
        assert_eq!(store.get(TokenKey::Legacy).unwrap().as_deref(), Some("acc"));
        assert!(session.is_authenticated().unwrap());
    }

    #[test]
    fn test_placeholder_access_token_is_not_authenticated() {
        let (store, session) = session();
        store.set(TokenKey::Access, "undefined").unwrap();
        assert!(!session.is_authenticated().unwrap());
        assert_eq!(session.access_token(&Realm::accounts(CredentialScheme::Bearer)).unwrap(), None);
    }

    #[test]
    fn test_replace_access_keeps_refresh_unless_rotated() {
        let (store, session) = session();
        session.establish(&TokenPair::new("a1", Some("r1"))).unwrap();

        session.replace_access(&TokenPair::new("a2", None)).unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("a2"));
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("r1"));

        session.replace_access(&TokenPair::new("a3", Some("r2"))).unwrap();
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("r2"));
        assert_eq!(store.get(TokenKey::Legacy).unwrap().as_deref(), Some("a3"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let (store, session) = session();
        session.establish(&TokenPair::new("a", Some("r"))).unwrap();
        session.clear().unwrap();

        for key in TokenKey::ALL {
            assert_eq!(store.get(key).unwrap(), None);
        }
    }

    #[test]
    fn test_realms() {
        let accounts = Realm::accounts(CredentialScheme::Bearer);
        assert_eq!(accounts.access_key, TokenKey::Access);
        assert_eq!(accounts.refresh_key, Some(TokenKey::Refresh));

        let wardrobe = Realm::wardrobe(CredentialScheme::Token);
        assert_eq!(wardrobe.access_key, TokenKey::Legacy);
        assert_eq!(wardrobe.refresh_key, Some(TokenKey::Refresh));
    }
}

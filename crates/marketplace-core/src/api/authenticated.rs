//! Authenticated request wrapper with a single-attempt token refresh.
//!
//! A request is sent with the realm's stored access token. When the server
//! answers 401, the refresh token is exchanged for a new access token and
//! the request is retried exactly once. Refreshes are single-flight: a
//! caller that finds the token already replaced by a concurrent refresh
//! reuses it instead of refreshing again.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::transport::{send_public, HttpRequest, HttpResponse, RequestDescriptor, Transport};
use super::ApiError;
use crate::auth::{Realm, Session};
use crate::models::{RefreshRequest, TokenPair};

pub const TOKEN_REFRESH_PATH: &str = "/api/accounts/token/refresh/";

const UNAUTHORIZED: u16 = 401;

#[derive(Clone)]
pub struct AuthenticatedClient<T> {
    transport: T,
    session: Session,
    realm: Realm,
}

impl<T: Transport> AuthenticatedClient<T> {
    pub fn new(transport: T, session: Session, realm: Realm) -> Self {
        Self {
            transport,
            session,
            realm,
        }
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// Send an authenticated request.
    ///
    /// Fails with `SessionMissing` before touching the network when no
    /// usable access token is stored, and with `SessionExpired` when the
    /// token cannot be refreshed.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<HttpResponse, ApiError> {
        let token = self
            .session
            .access_token(&self.realm)?
            .ok_or(ApiError::SessionMissing)?;

        let response = self.send_with_token(&descriptor, &token).await?;
        if response.status != UNAUTHORIZED {
            return response.error_for_status();
        }

        debug!(path = %descriptor.path, "Request unauthorized, refreshing access token");
        let fresh = self.refresh_access_token(&token).await?;

        let retried = self.send_with_token(&descriptor, &fresh).await?;
        if retried.status == UNAUTHORIZED {
            warn!(path = %descriptor.path, "Refreshed token rejected, clearing session");
            self.session.clear()?;
            return Err(ApiError::SessionExpired);
        }
        retried.error_for_status()
    }

    /// Send an authenticated request and decode the JSON body
    pub async fn request_json<R: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<R, ApiError> {
        self.request(descriptor).await?.json()
    }

    async fn send_with_token(
        &self,
        descriptor: &RequestDescriptor,
        token: &str,
    ) -> Result<HttpResponse, ApiError> {
        self.transport
            .send(HttpRequest {
                descriptor: descriptor.clone(),
                authorization: Some(self.realm.scheme.header_value(token)),
            })
            .await
    }

    /// Replace a rejected access token, returning the one to retry with.
    async fn refresh_access_token(&self, rejected: &str) -> Result<String, ApiError> {
        let _guard = self.session.lock_refresh().await;

        // Another caller refreshed while this one waited for the lock
        if let Some(current) = self.session.access_token(&self.realm)? {
            if current != rejected {
                debug!("Access token already refreshed");
                return Ok(current);
            }
        }

        let refresh_token = match self.realm.refresh_key {
            Some(key) => self.session.token(key)?,
            None => None,
        };
        let Some(refresh_token) = refresh_token else {
            info!("No refresh token available, clearing session");
            self.session.clear()?;
            return Err(ApiError::SessionExpired);
        };

        match exchange_refresh_token(&self.transport, &refresh_token).await {
            Ok(tokens) => {
                self.session.replace_access(&tokens)?;
                info!("Access token refreshed");
                Ok(tokens.access.trim().to_string())
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.session.clear()?;
                Err(ApiError::SessionExpired)
            }
        }
    }
}

/// Exchange a refresh token for a new access token
pub async fn exchange_refresh_token<T: Transport>(
    transport: &T,
    refresh_token: &str,
) -> Result<TokenPair, ApiError> {
    let descriptor = RequestDescriptor::post(
        TOKEN_REFRESH_PATH,
        &RefreshRequest {
            refresh: refresh_token,
        },
    )?;
    send_public(transport, descriptor).await?.json()
}

// Token manager
// Owns fetching, caching, and expiry-checking of the access token

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::AccessTokenResponse;
use super::ACCESS_TOKEN_ENDPOINT;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::store::SessionStore;
use crate::DEFAULT_EXPIRES_IN;

/// Safety margin in seconds: a cached token is not used once it has less
/// remaining lifetime than this, to avoid expiring mid-flight.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Access-token lifecycle for one client instance.
///
/// The token string lives in the credential store; `expires_at` lives only
/// here, in memory. The store TTL is a secondary safety net for backends
/// that enforce it, while this timestamp is the authoritative check for
/// proactive refresh. A process restart therefore loses expiry tracking
/// even when the token string survives in persistent storage.
pub struct TokenManager {
    config: Arc<ClientConfig>,
    store: Arc<dyn SessionStore>,

    /// HTTP client for exchange requests, injected by the owning client
    client: Client,

    /// In-memory expiry of the cached token; `None` means the token was
    /// externally supplied and is trusted indefinitely
    expires_at: RwLock<Option<DateTime<Utc>>>,
}

impl TokenManager {
    pub fn new(config: Arc<ClientConfig>, store: Arc<dyn SessionStore>, client: Client) -> Self {
        Self {
            config,
            store,
            client,
            expires_at: RwLock::new(None),
        }
    }

    /// Store key for the cached token, scoped so that multiple client
    /// instances sharing one store cannot collide.
    pub fn token_key(&self) -> String {
        format!(
            "{}_{}_access_token",
            self.config.client_id, self.config.username
        )
    }

    /// Seed an externally supplied token. No expiry is recorded, so the
    /// token is trusted until the server rejects it.
    pub fn seed_token(&self, token: &str) {
        self.store
            .set(&self.token_key(), Value::String(token.to_string()), None);
    }

    fn cached_token(&self) -> Option<String> {
        self.store
            .get(&self.token_key())
            .and_then(|v| v.as_str().map(str::to_owned))
    }

    /// Return a valid access token, fetching a fresh one when the cache is
    /// empty or the cached token is within the expiry margin.
    pub async fn current_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token() {
            match *self.expires_at.read().await {
                // Externally supplied token, no expiry to check
                None => return Ok(token),
                Some(expires_at)
                    if expires_at - Utc::now() > Duration::seconds(EXPIRY_MARGIN_SECS) =>
                {
                    return Ok(token)
                }
                _ => {}
            }
        }
        tracing::debug!("no usable cached access token, fetching a new one");
        self.fetch_token().await
    }

    /// Exchange username/password for a fresh token, bypassing the cache
    /// check, and cache the result.
    pub async fn fetch_token(&self) -> Result<String> {
        let url = format!("{}{}", self.config.base_url, ACCESS_TOKEN_ENDPOINT);
        tracing::info!("fetching access token");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::transport(&url, e))?
            .error_for_status()
            .map_err(|e| Error::transport(&url, e))?;

        let body: Value = response.json().await.map_err(|e| Error::transport(&url, e))?;

        let envelope: AccessTokenResponse = serde_json::from_value(body.clone())
            .map_err(|_| Error::malformed(&url, "data.access_token", body.clone()))?;

        if let Some(code) = envelope.errcode.filter(|c| *c != 0) {
            return Err(Error::CredentialExchange {
                url,
                code,
                description: envelope.description.unwrap_or_default(),
            });
        }

        let data = envelope
            .data
            .ok_or_else(|| Error::malformed(&url, "data", body))?;

        let expires_in = data.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        self.store.set(
            &self.token_key(),
            Value::String(data.access_token.clone()),
            Some(std::time::Duration::from_secs(expires_in.max(0) as u64)),
        );
        *self.expires_at.write().await = Some(Utc::now() + Duration::seconds(expires_in));

        tracing::info!(expires_in, "access token refreshed");
        Ok(data.access_token)
    }

    #[cfg(test)]
    pub(crate) async fn set_expires_at(&self, expires_at: Option<DateTime<Utc>>) {
        *self.expires_at.write().await = expires_at;
    }
}

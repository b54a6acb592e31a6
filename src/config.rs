// Client configuration
// Immutable after construction; the builder is the only way in

use std::sync::Arc;
use std::time::Duration;

use crate::client::JdyClient;
use crate::error::{Error, Result};
use crate::store::{MemoryStore, SessionStore};
use crate::API_BASE_URL;

/// Tenant and credential configuration for one [`JdyClient`].
///
/// `account_id` and `db_id` are opaque tenant identifiers; they are passed
/// through unchanged on every resource call.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub account_id: String,
    pub db_id: String,
    pub base_url: String,
    /// Retry once on an invalid-credential response (code 4010).
    pub auto_retry: bool,
    /// Request timeout applied to the transport; `None` leaves the transport
    /// default in place. The core imposes no additional deadline.
    pub timeout: Option<Duration>,
}

/// Builder for [`JdyClient`].
///
/// Obtained via [`JdyClient::builder`]. Credentials and tenant scoping are
/// required up front; everything else has a default.
pub struct ClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn SessionStore>>,
    access_token: Option<String>,
}

impl ClientBuilder {
    pub(crate) fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        account_id: impl Into<String>,
        db_id: impl Into<String>,
    ) -> Self {
        Self {
            config: ClientConfig {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                username: username.into(),
                password: password.into(),
                account_id: account_id.into(),
                db_id: db_id.into(),
                base_url: API_BASE_URL.to_string(),
                auto_retry: true,
                timeout: None,
            },
            store: None,
            access_token: None,
        }
    }

    /// Override the API base URL (production by default).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let url: String = base_url.into();
        // A trailing slash would produce `//` when endpoints are joined
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Use a custom credential store instead of the in-memory default.
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Pre-seed a known-valid access token, skipping the first exchange.
    ///
    /// A seeded token carries no expiry information, so it is trusted
    /// indefinitely: the client will only replace it after the server
    /// rejects it with an invalid-credential response.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Request timeout handed to the HTTP transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable (or re-enable) the single automatic refresh-and-retry on an
    /// invalid-credential response.
    pub fn auto_retry(mut self, auto_retry: bool) -> Self {
        self.config.auto_retry = auto_retry;
        self
    }

    /// Construct the client.
    pub fn build(self) -> Result<JdyClient> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::transport(&self.config.base_url, e))?;

        let store: Arc<dyn SessionStore> =
            self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));

        Ok(JdyClient::from_parts(
            Arc::new(self.config),
            store,
            http,
            self.access_token,
        ))
    }
}

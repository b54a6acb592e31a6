// JDY client
// Request executor plus the thin resource-fetch surface

use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::TokenManager;
use crate::config::{ClientBuilder, ClientConfig};
use crate::error::{Error, Result};
use crate::store::SessionStore;
use crate::INVALID_CREDENTIAL;

/// Chart-of-accounts listing endpoint.
pub const ACCOUNTS_ENDPOINT: &str = "/jdyaccouting/account";

/// Voucher listing endpoint.
pub const VOUCHERS_ENDPOINT: &str = "/jdyaccouting/voucherlist";

/// Client for the JDY accounting API.
///
/// Owns one HTTP transport, shared with its [`TokenManager`]. Every resource
/// call goes through [`JdyClient::request`], which attaches a valid access
/// token and recovers exactly once from an invalid-credential response by
/// refreshing the token and re-issuing the call.
pub struct JdyClient {
    config: Arc<ClientConfig>,
    http: Client,
    auth: TokenManager,
}

impl JdyClient {
    /// Start building a client. Credentials and tenant scoping are required;
    /// see [`ClientBuilder`] for the optional knobs.
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        account_id: impl Into<String>,
        db_id: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(client_id, client_secret, username, password, account_id, db_id)
    }

    pub(crate) fn from_parts(
        config: Arc<ClientConfig>,
        store: Arc<dyn SessionStore>,
        http: Client,
        access_token: Option<String>,
    ) -> Self {
        let auth = TokenManager::new(config.clone(), store, http.clone());
        if let Some(token) = access_token {
            auth.seed_token(&token);
        }
        Self { config, http, auth }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Token manager for this client, exposed for callers that want to
    /// inspect or force the token lifecycle themselves.
    pub fn token_manager(&self) -> &TokenManager {
        &self.auth
    }

    fn resolve_url(&self, url_or_endpoint: &str) -> String {
        if url_or_endpoint.starts_with("http://") || url_or_endpoint.starts_with("https://") {
            url_or_endpoint.to_string()
        } else {
            format!("{}{}", self.config.base_url, url_or_endpoint)
        }
    }

    fn tenant_params(&self) -> [(&str, &str); 2] {
        [
            ("sid", self.config.account_id.as_str()),
            ("dbId", self.config.db_id.as_str()),
        ]
    }

    /// Issue an API call and interpret the response envelope.
    ///
    /// Absolute URLs pass through unchanged; bare endpoints are joined with
    /// the configured base URL. The current access token is injected as a
    /// query parameter unless the caller already supplied one.
    ///
    /// On `code == 4010` the token is force-refreshed and the call re-issued
    /// exactly once (when auto-retry is enabled); every other failure
    /// propagates immediately.
    pub async fn request(
        &self,
        method: Method,
        url_or_endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.resolve_url(url_or_endpoint);

        let mut params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if !params.iter().any(|(k, _)| k == "access_token") {
            let token = self.auth.current_token().await?;
            params.push(("access_token".to_string(), token));
        }

        let mut retry_allowed = self.config.auto_retry;
        loop {
            tracing::debug!(%method, %url, "dispatching request");

            let mut request = self.http.request(method.clone(), &url).query(&params);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::transport(&url, e))?
                .error_for_status()
                .map_err(|e| Error::transport(&url, e))?;

            let payload: Value = response
                .json()
                .await
                .map_err(|e| Error::transport(&url, e))?;

            let code = envelope_code(&payload)
                .ok_or_else(|| Error::malformed(&url, "code", payload.clone()))?;

            if code == 0 {
                return Ok(payload);
            }

            if code == INVALID_CREDENTIAL && retry_allowed {
                // At most one retry per logical call; a second rejection
                // falls through to the Api error below
                retry_allowed = false;
                tracing::info!("access token rejected, fetching a new one and retrying");

                let token = self.auth.fetch_token().await?;
                match params.iter_mut().find(|(k, _)| k == "access_token") {
                    Some(slot) => slot.1 = token,
                    None => params.push(("access_token".to_string(), token)),
                }
                continue;
            }

            // The server usually sends `msg` as a string, but whatever it
            // sent is surfaced rather than discarded
            let message = payload.get("msg").map(|m| match m {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
            return Err(Error::Api {
                url,
                code,
                message,
                body: payload,
            });
        }
    }

    /// Like [`JdyClient::request`], but pass the success payload through a
    /// caller-supplied transform.
    pub async fn request_with<T, F>(
        &self,
        method: Method,
        url_or_endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
        processor: F,
    ) -> Result<T>
    where
        F: FnOnce(Value) -> T,
    {
        self.request(method, url_or_endpoint, params, body)
            .await
            .map(processor)
    }

    /// Fetch the chart of accounts for the configured tenant.
    pub async fn accounts(&self) -> Result<Value> {
        self.request(Method::GET, ACCOUNTS_ENDPOINT, &self.tenant_params(), None)
            .await
    }

    /// Fetch the voucher list for an accounting-period range.
    pub async fn voucher_list(&self, from_period: &str, to_period: &str) -> Result<Value> {
        let body = json!({
            "fromPeriod": from_period,
            "toPeriod": to_period,
        });
        self.request(
            Method::POST,
            VOUCHERS_ENDPOINT,
            &self.tenant_params(),
            Some(&body),
        )
        .await
    }
}

/// Extract the envelope status code. The server is not consistent about the
/// JSON type, so numeric strings are accepted alongside integers.
fn envelope_code(payload: &Value) -> Option<i64> {
    match payload.get("code")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

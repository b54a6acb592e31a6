// Credential-exchange envelope types
//
// The auth endpoint speaks `errcode`/`description`, distinct from the
// `code`/`msg` envelope of the resource endpoints. The two must not be
// conflated.

use serde::Deserialize;

/// Response envelope of `GET /auth/user/access_token`.
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// Zero on success; non-zero codes come with a `description`.
    pub errcode: Option<i64>,
    pub description: Option<String>,
    pub data: Option<AccessTokenData>,
}

/// Token payload of a successful exchange.
#[derive(Debug, Deserialize)]
pub struct AccessTokenData {
    pub access_token: String,
    /// Lifetime in seconds; the server may omit it.
    pub expires_in: Option<i64>,
}

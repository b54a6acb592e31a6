// Authentication module
// Manages access-token lifecycle against the credential-exchange endpoint

mod manager;
mod types;

pub use manager::TokenManager;
pub use types::{AccessTokenData, AccessTokenResponse};

/// Credential-exchange endpoint, relative to the configured base URL.
pub const ACCESS_TOKEN_ENDPOINT: &str = "/auth/user/access_token";

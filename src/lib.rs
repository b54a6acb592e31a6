// JDY Client - Kingdee JDY accounting platform API client

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod store;

pub use client::JdyClient;
pub use config::{ClientBuilder, ClientConfig};
pub use error::{Error, Result};
pub use store::{MemoryStore, SessionStore};

/// Server code signalling that the access token must be refreshed.
pub const INVALID_CREDENTIAL: i64 = 4010;

/// Lifetime assumed for a token when the exchange response omits `expires_in`.
pub const DEFAULT_EXPIRES_IN: i64 = 7200;

/// Production API base URL.
pub const API_BASE_URL: &str = "https://api.kingdee.com";

// Error handling module
// Defines the failure taxonomy surfaced to callers

use serde_json::Value;
use thiserror::Error;

/// Failures that can occur during a client call.
///
/// Only an invalid-credential resource response (code 4010) is ever recovered
/// locally, by a single refresh-and-retry inside the request executor. Every
/// variant below propagates to the caller unmodified.
#[derive(Error, Debug)]
pub enum Error {
    /// Network failure or non-2xx HTTP status, before the response envelope
    /// could be read. Never retried.
    #[error("transport failure calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body parsed as JSON but lacked an expected envelope field.
    /// Never retried. Carries the offending body for diagnostics.
    #[error("malformed response from {url}: missing `{field}` field")]
    MalformedResponse {
        url: String,
        field: &'static str,
        body: Value,
    },

    /// The credential-exchange endpoint returned a non-zero `errcode`.
    /// Propagates immediately; no recursive re-fetch is attempted.
    #[error("credential exchange failed calling {url}: code {code}: {description}")]
    CredentialExchange {
        url: String,
        code: i64,
        description: String,
    },

    /// A resource call returned a non-zero `code` after the retry policy was
    /// exhausted or did not apply.
    #[error("api error from {url}: code {code}, message: {}", .message.as_deref().unwrap_or("<none>"))]
    Api {
        url: String,
        code: i64,
        message: Option<String>,
        body: Value,
    },
}

impl Error {
    pub(crate) fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Error::Transport {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn malformed(url: impl Into<String>, field: &'static str, body: Value) -> Self {
        Error::MalformedResponse {
            url: url.into(),
            field,
            body,
        }
    }

    /// Server code carried by the error, when the server supplied one.
    /// `Transport` and `MalformedResponse` failures have no code.
    pub fn code(&self) -> Option<i64> {
        match self {
            Error::Transport { .. } | Error::MalformedResponse { .. } => None,
            Error::CredentialExchange { code, .. } | Error::Api { code, .. } => Some(*code),
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

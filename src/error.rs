//! Error types.
//!
//! Two layers:
//!
//! - [`GatewayError`] is a per-request failure. It never escapes a handler:
//!   it is rendered into the error [`Envelope`](crate::Envelope) with a 4xx or
//!   5xx status and the server keeps going.
//! - [`Error`] is an infrastructure failure: binding a port, loading
//!   configuration, building an HTTP client. These stop the process at startup.

use http::StatusCode;
use thiserror::Error;

/// Infrastructure failure surfaced by startup and [`Server`](crate::Server).
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] config::ConfigError),

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid url `{url}`: {reason}")]
    Url { url: String, reason: String },
}

/// Failure of a single document-store round trip.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection refused, DNS failure, timeout.
    #[error("{0}")]
    Transport(String),

    /// The store answered with a non-success status, e.g. a query syntax
    /// error or a missing index.
    #[error("store returned {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The store answered 2xx but the body was not a search response.
    #[error("malformed store response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(error_chain(&e))
    }
}

/// Failure of a single upstream API call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure or non-success upstream status.
    #[error("Failed to fetch data from API: {0}")]
    Fetch(String),

    /// Anything else, e.g. a body that is not JSON.
    #[error("{0}")]
    Decode(String),
}

/// A request-scoped failure, rendered as the error envelope.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl GatewayError {
    /// HTTP status the error envelope is sent with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `err` and every `source()` below it, joined with `": "`.
///
/// reqwest's own message only names the URL; the cause (`Connection
/// refused`, `operation timed out`) sits further down the chain. Sources
/// whose text is already part of the message are skipped.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

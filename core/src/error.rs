//! Error types for the Cipherguard API client.
//!
//! # Design
//! A single `ApiError` covers every way an operation can fail. Format errors
//! are raised before any I/O and get their own variant so callers can tell
//! "bad input" apart from "the server or network said no". `NotFound` stays
//! separate from `Status` because callers frequently branch on it.

use thiserror::Error;

/// Errors returned by `Client` and the resource operations built on it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// An identifier did not have the expected shape. Raised before any
    /// network call.
    #[error("checking ID format: {0}")]
    InvalidId(String),

    /// The transport failed to complete the round-trip (connection refused,
    /// TLS, DNS, ...).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server returned 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The server answered 2xx but the envelope reports an error.
    #[error("API error: {0}")]
    Api(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request context was cancelled.
    #[error("request cancelled")]
    Cancelled,

    /// The request context deadline passed before the response arrived.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn is_format_error(&self) -> bool {
        matches!(self, ApiError::InvalidId(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Wrap any transport-level error, keeping it reachable through `source()`.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::Transport(Box::new(err))
    }
}

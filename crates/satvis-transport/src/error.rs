//! Transport error types.

use satvis_core::CoreError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// No response within the timeout; the in-flight call was dropped.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Response received with a non-2xx status.
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// Connection refused, DNS failure, reset, ...
    #[error("network error: {0}")]
    Network(String),

    /// Unknown category, bad parameter or method not accepted by the route.
    #[error("{0}")]
    MalformedRequest(String),

    /// 2xx response whose body is not JSON.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl TransportError {
    /// Short label used for metrics.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "timeout",
            TransportError::Http { .. } => "http",
            TransportError::Network(_) => "network",
            TransportError::MalformedRequest(_) => "malformed",
            TransportError::InvalidResponse(_) => "invalid_response",
            TransportError::InvalidConfig(_) | TransportError::ClientBuild(_) => "client",
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::MalformedRequest(err.to_string())
        } else if err.is_decode() {
            TransportError::InvalidResponse(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl From<CoreError> for TransportError {
    fn from(err: CoreError) -> Self {
        TransportError::MalformedRequest(err.to_string())
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

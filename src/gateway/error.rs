//! Gateway error types

use thiserror::Error;

/// Errors that can occur when calling a data gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    /// Failure raised by a non-HTTP gateway (fixtures, tests, adapters)
    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    pub fn other(message: impl Into<String>) -> Self {
        GatewayError::Other(message.into())
    }

    /// Map a transport error onto the coarse kinds callers care about
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else if e.is_connect() {
            GatewayError::Unavailable
        } else {
            GatewayError::Request(e)
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Unavailable | GatewayError::Timeout => true,
            GatewayError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Result type alias for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

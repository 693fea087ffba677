//! Error types for client operations
//!
//! `ApiError` covers every failure a request can hit: the transport could not
//! complete the exchange, the server answered with a non-2xx status, the body
//! was not the JSON we expected, or the caller asked for something that needs
//! client state that is missing (for example no table selected).

use thiserror::Error;

/// Errors that can occur while talking to the table API
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The transport failed before a response arrived (DNS, connect, timeout)
    #[error("{0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Required client-side state is missing; no request was sent
    #[error("{0}")]
    MissingState(String),

    /// An argument was rejected before any request was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error was raised locally, without any network traffic
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::MissingState(_) | ApiError::InvalidArgument(_) | ApiError::Config(_)
        )
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<crate::transport::TransportError> for ApiError {
    fn from(err: crate::transport::TransportError) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
